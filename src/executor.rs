//! Execution engine: wraps the HTTP client and records every completed call.
//!
//! # Ordering
//!
//! History and the result projection are committed *before* the outcome is
//! returned, so a caller that inspects history after `execute` returns (Ok
//! or Err) always finds its own entry at the head.
//!
//! # Failure Modes
//!
//! - Request never completed: `ConsoleError::Network`, nothing recorded
//! - Non-2xx status: recorded, then `ConsoleError::Http` with the status code
//!   and a string rendering of the body
//! - Malformed JSON body: not an error, the raw text becomes the data

use crate::actions::CreatedOrder;
use crate::client::{ApiCall, ApiCallResult, ApiClient, render_body};
use crate::drafts::DraftState;
use crate::error::{ConsoleError, Result};
use crate::history::HistoryEntry;
use crate::store::{ResultView, SharedStore, lock_store};
use serde_json::Value;
use tracing::{debug, warn};

/// What to do with the response data of a successful request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessHook {
    /// Copy the created order's `OrderID` into `drafts.order_id`
    CaptureOrderId,
}

impl SuccessHook {
    /// Apply the hook; shapes that do not match are ignored
    pub fn apply(&self, data: &Value, drafts: &mut DraftState) {
        match self {
            Self::CaptureOrderId => match CreatedOrder::from_response(data) {
                Some(created) => drafts.order_id = created.order_id,
                None => debug!("Create-order response carried no OrderID"),
            },
        }
    }
}

/// A request as issued by the console. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub label: String,
    pub call: ApiCall,
    pub on_success: Option<SuccessHook>,
}

impl ExecutionRequest {
    pub fn new(label: impl Into<String>, call: ApiCall) -> Self {
        Self {
            label: label.into(),
            call,
            on_success: None,
        }
    }

    pub fn with_hook(mut self, hook: SuccessHook) -> Self {
        self.on_success = Some(hook);
        self
    }
}

/// Runs [`ExecutionRequest`]s and keeps history and the result projection current
#[derive(Clone)]
pub struct Executor {
    client: ApiClient,
    store: SharedStore,
}

impl Executor {
    pub fn new(client: ApiClient, store: SharedStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Execute one request; see the module docs for the ordering contract
    pub fn execute(&self, request: ExecutionRequest) -> Result<Value> {
        let response = self.client.request(&request.call)?;
        self.record(&request, &response)?;

        if !response.ok {
            warn!(
                "{} failed with HTTP {} ({} {})",
                request.label, response.status, request.call.method, request.call.path
            );
            return Err(ConsoleError::http(response.status, render_body(&response.data)));
        }

        if let Some(hook) = request.on_success {
            let mut store = lock_store(&self.store)?;
            store.update_drafts(|drafts| hook.apply(&response.data, drafts));
        }
        Ok(response.data)
    }

    /// Re-issue a recorded request under a replay label
    pub fn replay(&self, entry: &HistoryEntry) -> Result<Value> {
        self.execute(entry.replay_request())
    }

    fn record(&self, request: &ExecutionRequest, response: &ApiCallResult) -> Result<()> {
        let entry = HistoryEntry::record(&request.label, &request.call, response);
        let mut store = lock_store(&self.store)?;
        store.set_result(ResultView {
            title: request.label.clone(),
            data: response.data.clone(),
            status: Some(response.status),
            duration_ms: Some(response.duration_ms),
        });
        store.record_history(entry);
        Ok(())
    }
}
