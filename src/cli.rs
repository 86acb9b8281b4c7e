use crate::actions::Action;
use crate::drafts::DraftField;
use crate::types::{HttpMethod, ServiceKey};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Ticketing Console - exercise, inspect and replay ticketing backend calls
#[derive(Parser)]
#[command(name = "ticketing-console")]
#[command(about = "A terminal console for the ticketing backend services")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted session, drafts and history
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Keep all state in memory: nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive terminal console (default)
    Tui,
    /// Start a mock session
    Login {
        #[arg(short, long, default_value = "demo-user")]
        username: String,
        #[arg(short, long, default_value = "123456")]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the current session
    Whoami,
    /// Issue an arbitrary request to one service
    Exec {
        #[arg(short, long)]
        service: ServiceKey,
        #[arg(short, long, default_value = "GET")]
        method: HttpMethod,
        /// Path plus query string, e.g. /orders/get?order_id=abc
        #[arg(short, long)]
        path: String,
        /// JSON request body (POST only)
        #[arg(short, long)]
        body: Option<String>,
        /// Label recorded in history
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Order service actions
    Order {
        #[command(subcommand)]
        action: OrderCommands,
    },
    /// Inventory service actions
    Inventory {
        #[command(subcommand)]
        action: InventoryCommands,
    },
    /// Read-model queries
    Query {
        #[command(subcommand)]
        target: QueryCommands,
    },
    /// Run a multi-step scenario
    Flow {
        #[command(subcommand)]
        flow: FlowCommands,
    },
    /// Check service health (all services when none is given)
    Health { service: Option<ServiceKey> },
    /// Inspect, clear or replay request history
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
    /// Show or edit the draft form fields
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Poll the order read model until interrupted
    Watch {
        /// Stop after this many polls
        #[arg(short, long)]
        count: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create an order; the returned OrderID becomes the draft order id
    Create {
        #[arg(long)]
        idempotency_key: Option<String>,
        #[arg(long)]
        amount_cents: Option<i64>,
    },
    /// Reserve an order
    Reserve {
        #[arg(long)]
        order_id: Option<String>,
    },
    /// Send a payment callback
    Pay {
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        txn_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Fetch an order from the order service
    Get {
        #[arg(long)]
        order_id: Option<String>,
    },
}

#[derive(Args, Default)]
pub struct HoldArgs {
    #[arg(long)]
    pub partition_key: Option<String>,
    #[arg(long)]
    pub hold_id: Option<String>,
}

#[derive(Subcommand)]
pub enum InventoryCommands {
    /// Place a temporary hold
    TryHold {
        #[command(flatten)]
        hold: HoldArgs,
        #[arg(long)]
        qty: Option<i64>,
        #[arg(long)]
        capacity: Option<i64>,
    },
    /// Release a hold
    Release {
        #[command(flatten)]
        hold: HoldArgs,
    },
    /// Confirm a hold
    Confirm {
        #[command(flatten)]
        hold: HoldArgs,
    },
    /// Show availability for a partition
    Availability {
        #[arg(long)]
        partition_key: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Query the order read model
    Order {
        #[arg(long)]
        order_id: Option<String>,
        /// Query the current draft order id
        #[arg(long, conflicts_with = "order_id")]
        use_current: bool,
    },
}

#[derive(Subcommand)]
pub enum FlowCommands {
    /// create -> reserve -> pay -> query
    Order,
    /// try-hold -> confirm-hold -> availability
    Inventory,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List entries, newest first
    List {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one entry by id or 1-based position
    Show { reference: String },
    /// Delete all entries
    Clear,
    /// Re-issue one entry by id or 1-based position
    Replay { reference: String },
}

#[derive(Subcommand)]
pub enum DraftCommands {
    /// Print every draft field
    Show,
    /// Set one draft field
    Set { field: DraftField, value: String },
}

/// Draft edits requested on the command line, applied before the action runs
pub type DraftOverrides = Vec<(DraftField, String)>;

fn push<T: ToString>(overrides: &mut DraftOverrides, field: DraftField, value: &Option<T>) {
    if let Some(value) = value {
        overrides.push((field, value.to_string()));
    }
}

impl HoldArgs {
    fn overrides(&self, out: &mut DraftOverrides) {
        push(out, DraftField::PartitionKey, &self.partition_key);
        push(out, DraftField::HoldId, &self.hold_id);
    }
}

impl OrderCommands {
    pub fn plan(&self) -> (Action, DraftOverrides) {
        let mut overrides = Vec::new();
        let action = match self {
            Self::Create {
                idempotency_key,
                amount_cents,
            } => {
                push(&mut overrides, DraftField::IdempotencyKey, idempotency_key);
                push(&mut overrides, DraftField::AmountCents, amount_cents);
                Action::CreateOrder
            }
            Self::Reserve { order_id } => {
                push(&mut overrides, DraftField::OrderId, order_id);
                Action::ReserveOrder
            }
            Self::Pay {
                order_id,
                txn_id,
                status,
            } => {
                push(&mut overrides, DraftField::OrderId, order_id);
                push(&mut overrides, DraftField::ProviderTxnId, txn_id);
                push(&mut overrides, DraftField::PaymentStatus, status);
                Action::PaymentCallback
            }
            Self::Get { order_id } => {
                push(&mut overrides, DraftField::OrderId, order_id);
                Action::GetOrder
            }
        };
        (action, overrides)
    }
}

impl InventoryCommands {
    pub fn plan(&self) -> (Action, DraftOverrides) {
        let mut overrides = Vec::new();
        let action = match self {
            Self::TryHold {
                hold,
                qty,
                capacity,
            } => {
                hold.overrides(&mut overrides);
                push(&mut overrides, DraftField::Qty, qty);
                push(&mut overrides, DraftField::Capacity, capacity);
                Action::TryHold
            }
            Self::Release { hold } => {
                hold.overrides(&mut overrides);
                Action::ReleaseHold
            }
            Self::Confirm { hold } => {
                hold.overrides(&mut overrides);
                Action::ConfirmHold
            }
            Self::Availability { partition_key } => {
                push(&mut overrides, DraftField::PartitionKey, partition_key);
                Action::GetAvailability
            }
        };
        (action, overrides)
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
