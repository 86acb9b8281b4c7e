//! Fixed multi-step business scenarios run through the executor.
//!
//! Steps run strictly in order; the first error aborts the rest of the chain
//! and propagates. Nothing already executed is compensated.

use crate::actions::{
    Action, CreatedOrder, create_order_body, payment_callback_call, query_order_view_call,
    reserve_order_call,
};
use crate::client::ApiCall;
use crate::error::Result;
use crate::executor::{ExecutionRequest, Executor};
use crate::store::lock_store;
use crate::types::ServiceKey;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{info, warn};

/// The scenarios the console can run in one go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Flow {
    /// create, reserve, pay, query read model
    #[strum(to_string = "Order Flow")]
    Order,
    /// try-hold, confirm-hold, availability
    #[strum(to_string = "Inventory Flow")]
    Inventory,
}

impl Flow {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn run(&self, executor: &Executor) -> Result<FlowOutcome> {
        match self {
            Self::Order => run_order_flow(executor),
            Self::Inventory => run_inventory_flow(executor),
        }
    }
}

/// How a flow ended when no step raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed { steps: usize, order_id: Option<String> },
    /// An early response lacked a field later steps need; the chain stopped quietly
    Aborted { after: String },
}

/// Create an order under a fresh idempotency key, then reserve, pay and query it.
///
/// If the create response carries no `OrderID` the flow stops with
/// [`FlowOutcome::Aborted`] instead of an error.
pub fn run_order_flow(executor: &Executor) -> Result<FlowOutcome> {
    let drafts = lock_store(executor.store())?.drafts().clone();
    let stamp = crate::unix_millis();
    let flow_key = format!("{}-{}", drafts.idempotency_key, stamp);
    let txn_id = format!("{}-{}", drafts.provider_txn_id, stamp);

    let create_label = "Flow/Create Order";
    let created = executor.execute(ExecutionRequest::new(
        create_label,
        ApiCall::post(
            ServiceKey::Order,
            "/orders",
            create_order_body(&flow_key, drafts.amount_cents),
        ),
    ))?;

    // an empty id counts as missing
    let created_order = CreatedOrder::from_response(&created).filter(|c| !c.order_id.is_empty());
    let Some(CreatedOrder { order_id }) = created_order else {
        warn!("{} returned no OrderID, stopping order flow", create_label);
        return Ok(FlowOutcome::Aborted {
            after: create_label.to_string(),
        });
    };

    lock_store(executor.store())?.update_drafts(|d| d.order_id = order_id.clone());

    executor.execute(ExecutionRequest::new(
        "Flow/Reserve Order",
        reserve_order_call(&order_id),
    ))?;
    executor.execute(ExecutionRequest::new(
        "Flow/Payment Callback",
        payment_callback_call(&order_id, &txn_id, &drafts.payment_status),
    ))?;
    executor.execute(ExecutionRequest::new(
        "Flow/Query Order View",
        query_order_view_call(&order_id),
    ))?;

    info!("Order flow completed for {}", order_id);
    Ok(FlowOutcome::Completed {
        steps: 4,
        order_id: Some(order_id),
    })
}

/// Hold inventory, confirm the hold and read back availability
pub fn run_inventory_flow(executor: &Executor) -> Result<FlowOutcome> {
    let drafts = lock_store(executor.store())?.drafts().clone();

    for (label, action) in [
        ("Flow/Try Hold", Action::TryHold),
        ("Flow/Confirm Hold", Action::ConfirmHold),
        ("Flow/Get Availability", Action::GetAvailability),
    ] {
        executor.execute(ExecutionRequest::new(label, action.call(&drafts)))?;
    }

    info!("Inventory flow completed for {}", drafts.partition_key);
    Ok(FlowOutcome::Completed {
        steps: 3,
        order_id: None,
    })
}
