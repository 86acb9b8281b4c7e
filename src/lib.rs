//! Ticketing Console Library
//!
//! Request execution, history and replay for the ticketing backend services,
//! plus the terminal console and headless CLI built on top of them.

pub mod actions;
pub mod app;
pub mod cli;
pub mod client;
pub mod components;
pub mod config;
pub mod drafts;
pub mod error;
pub mod executor;
pub mod health;
pub mod history;
pub mod poll;
pub mod session;
pub mod store;
pub mod tasks;
pub mod theme;
pub mod types;
pub mod ui;
pub mod workflow;

// Re-export main types for convenience
pub use actions::{Action, ActionGroup, CreatedOrder};
pub use client::{ApiCall, ApiCallResult, ApiClient, HttpTransport, TransportResponse, UreqTransport};
pub use config::ConsoleConfig;
pub use drafts::{DraftField, DraftState};
pub use error::{ConsoleError, Result};
pub use executor::{ExecutionRequest, Executor, SuccessHook};
pub use health::{HealthBoard, OverallHealth, ServiceHealth};
pub use history::{HISTORY_CAPACITY, HistoryEntry, HistoryLog};
pub use poll::{PollTicket, Poller};
pub use session::Session;
pub use store::{
    ConsoleState, ConsoleStore, FileBackend, MemoryBackend, ResultView, SharedStore, StateBackend,
    StateChange, StoreListener, lock_store,
};
pub use tasks::{Task, TaskOutput, TaskReport, TaskRunner};
pub use types::{HttpMethod, ServiceKey};
pub use workflow::{Flow, FlowOutcome};

/// Milliseconds since the Unix epoch, used for tokens, ids and flow keys
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
