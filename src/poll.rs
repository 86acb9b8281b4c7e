//! Fixed-interval polling of the order read model.
//!
//! The poller is a plain schedule driven by the caller's clock: the UI loop
//! asks [`Poller::poll_due`] on every tick, the `watch` command sleeps until
//! [`Poller::next_due`]. Disabling clears the schedule, so nothing fires after
//! `disable` returns.
//!
//! A poll handed to a worker carries a [`PollTicket`]. Every enable or disable
//! starts a new generation, and a ticket from an older generation is stale:
//! the worker drops it instead of querying.

use crate::actions::query_order_view_call;
use crate::error::Result;
use crate::executor::{ExecutionRequest, Executor};
use crate::store::lock_store;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

pub const POLL_LABEL: &str = "Poll Query Order View";

#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    next_due: Option<Instant>,
    generation: Arc<AtomicU64>,
}

/// Permission for one queued poll, valid until polling is next switched
#[derive(Debug, Clone)]
pub struct PollTicket {
    issued: u64,
    current: Arc<AtomicU64>,
}

impl PollTicket {
    /// False once polling was disabled or restarted after this ticket was issued
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.issued
    }
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start polling; the first poll is one interval from `now`
    pub fn enable(&mut self, now: Instant) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.next_due = Some(now + self.interval);
    }

    /// Clear the schedule and invalidate every outstanding ticket
    pub fn disable(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.next_due = None;
    }

    /// Ticket for a poll about to be queued
    pub fn ticket(&self) -> PollTicket {
        PollTicket {
            issued: self.generation.load(Ordering::SeqCst),
            current: self.generation.clone(),
        }
    }

    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_enabled() {
            self.disable();
        } else {
            self.enable(now);
        }
        self.is_enabled()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// True at most once per interval while enabled
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// The poll request for the current order, if there is one
pub fn poll_request(order_id: &str) -> Option<ExecutionRequest> {
    if order_id.is_empty() {
        return None;
    }
    Some(ExecutionRequest::new(POLL_LABEL, query_order_view_call(order_id)))
}

/// Issue one poll; `Ok(None)` when there is no order to poll
pub fn poll_once(executor: &Executor) -> Result<Option<Value>> {
    let order_id = lock_store(executor.store())?.drafts().order_id.clone();
    match poll_request(&order_id) {
        Some(request) => executor.execute(request).map(Some),
        None => {
            debug!("No order id to poll");
            Ok(None)
        }
    }
}
