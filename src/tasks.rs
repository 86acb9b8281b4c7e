//! Background task worker.
//!
//! UI handlers never call the executor directly. They submit a [`Task`]; a
//! single worker thread runs tasks one after another and sends exactly one
//! [`TaskReport`] per task back on one channel, which the UI loop drains.
//! Dropping the runner closes the queue; a task already in flight is
//! abandoned, not cancelled.

use crate::actions::Action;
use crate::error::{ConsoleError, Result};
use crate::executor::Executor;
use crate::health::{self, HealthBoard, ServiceHealth};
use crate::history::HistoryEntry;
use crate::poll::{self, PollTicket};
use crate::store::lock_store;
use crate::types::ServiceKey;
use crate::workflow::{self, FlowOutcome};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// Work the UI can submit
#[derive(Debug, Clone)]
pub enum Task {
    Action(Action),
    Replay(Box<HistoryEntry>),
    OrderFlow,
    InventoryFlow,
    HealthCheck(ServiceKey),
    HealthSweep,
    Poll(PollTicket),
}

impl Task {
    /// Short description for the status line
    pub fn describe(&self) -> String {
        match self {
            Self::Action(action) => action.label(),
            Self::Replay(entry) => format!("Replay {}", entry.label),
            Self::OrderFlow => "Order Flow".to_string(),
            Self::InventoryFlow => "Inventory Flow".to_string(),
            Self::HealthCheck(service) => format!("{} /healthz", service.label()),
            Self::HealthSweep => "Health Sweep".to_string(),
            Self::Poll(_) => poll::POLL_LABEL.to_string(),
        }
    }
}

/// What a successful task produced
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Data(Value),
    Flow(FlowOutcome),
    Health(ServiceHealth),
    Board(HealthBoard),
    /// Poll skipped because no order id is set
    Skipped,
    /// Poll dropped because polling stopped while it was queued
    Stale,
}

/// Outcome of one task, success or failure
#[derive(Debug)]
pub struct TaskReport {
    pub task: String,
    pub outcome: Result<TaskOutput>,
}

impl TaskReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// One-line summary for the status line
    pub fn summary(&self) -> String {
        match &self.outcome {
            Ok(TaskOutput::Flow(FlowOutcome::Aborted { after })) => {
                format!("{} stopped after {}", self.task, after)
            }
            Ok(TaskOutput::Health(health)) => format!("{}: {}", self.task, health),
            Ok(TaskOutput::Board(board)) => format!("{}: {}", self.task, board.overall()),
            Ok(TaskOutput::Skipped) => format!("{} skipped: no order id", self.task),
            Ok(TaskOutput::Stale) => format!("{} dropped: polling stopped", self.task),
            Ok(_) => format!("{} ok", self.task),
            Err(e) => format!("{} failed: {}", self.task, e),
        }
    }
}

/// Run one task to completion on the current thread
pub fn run_task(executor: &Executor, task: &Task) -> Result<TaskOutput> {
    match task {
        Task::Action(action) => {
            let drafts = lock_store(executor.store())?.drafts().clone();
            executor.execute(action.build(&drafts)).map(TaskOutput::Data)
        }
        Task::Replay(entry) => executor.replay(entry).map(TaskOutput::Data),
        Task::OrderFlow => workflow::run_order_flow(executor).map(TaskOutput::Flow),
        Task::InventoryFlow => workflow::run_inventory_flow(executor).map(TaskOutput::Flow),
        Task::HealthCheck(service) => health::check(executor, *service).map(TaskOutput::Health),
        Task::HealthSweep => health::sweep(executor).map(TaskOutput::Board),
        Task::Poll(ticket) if !ticket.is_current() => {
            debug!("Dropping stale poll");
            Ok(TaskOutput::Stale)
        }
        Task::Poll(_) => Ok(poll::poll_once(executor)?.map_or(TaskOutput::Skipped, TaskOutput::Data)),
    }
}

/// Owns the worker thread and both ends of the task plumbing
pub struct TaskRunner {
    task_tx: Option<Sender<Task>>,
    report_rx: Receiver<TaskReport>,
    pending: usize,
    worker: Option<JoinHandle<()>>,
}

impl TaskRunner {
    pub fn spawn(executor: Executor) -> Self {
        let (task_tx, task_rx) = mpsc::channel::<Task>();
        let (report_tx, report_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            for task in task_rx {
                let name = task.describe();
                debug!("Running task: {}", name);
                let outcome = run_task(&executor, &task);
                if report_tx.send(TaskReport { task: name, outcome }).is_err() {
                    break;
                }
            }
            debug!("Task worker exiting");
        });

        Self {
            task_tx: Some(task_tx),
            report_rx,
            pending: 0,
            worker: Some(worker),
        }
    }

    pub fn submit(&mut self, task: Task) -> Result<()> {
        info!("Submitting task: {}", task.describe());
        self.task_tx
            .as_ref()
            .ok_or_else(|| ConsoleError::state("task worker is shut down"))?
            .send(task)
            .map_err(|_| ConsoleError::state("task worker is gone"))?;
        self.pending += 1;
        Ok(())
    }

    /// Tasks submitted but not yet reported
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// Drain every report that is ready without blocking
    pub fn drain(&mut self) -> Vec<TaskReport> {
        let reports: Vec<TaskReport> = self.report_rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(reports.len());
        reports
    }

    /// Block until the next report arrives
    pub fn recv(&mut self) -> Result<TaskReport> {
        let report = self
            .report_rx
            .recv()
            .map_err(|_| ConsoleError::state("task worker is gone"))?;
        self.pending = self.pending.saturating_sub(1);
        Ok(report)
    }

    /// Close the queue and wait for queued tasks to finish
    pub fn shutdown(mut self) {
        self.task_tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
