//! Manual console actions and the typed response shapes they depend on.

use crate::client::{ApiCall, encode_component};
use crate::drafts::DraftState;
use crate::executor::{ExecutionRequest, SuccessHook};
use crate::types::ServiceKey;
use serde_json::{Value, json};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Every single-request operation the console can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Action {
    #[strum(to_string = "Create Order")]
    CreateOrder,
    #[strum(to_string = "Reserve Order")]
    ReserveOrder,
    #[strum(to_string = "Payment Callback")]
    PaymentCallback,
    #[strum(to_string = "Get Order")]
    GetOrder,
    #[strum(to_string = "Query Order View")]
    QueryOrderView,
    #[strum(to_string = "Try Hold")]
    TryHold,
    #[strum(to_string = "Release Hold")]
    ReleaseHold,
    #[strum(to_string = "Confirm Hold")]
    ConfirmHold,
    #[strum(to_string = "Get Availability")]
    GetAvailability,
    #[strum(to_string = "Health Check")]
    Healthz(ServiceKey),
}

/// Grouping used by the terminal views
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ActionGroup {
    Orders,
    Inventory,
    Query,
}

impl ActionGroup {
    pub fn actions(&self) -> Vec<Action> {
        match self {
            Self::Orders => vec![
                Action::CreateOrder,
                Action::ReserveOrder,
                Action::PaymentCallback,
                Action::GetOrder,
            ],
            Self::Inventory => vec![
                Action::TryHold,
                Action::ReleaseHold,
                Action::ConfirmHold,
                Action::GetAvailability,
            ],
            Self::Query => vec![Action::QueryOrderView],
        }
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl Action {
    /// Label recorded in history and shown as the result title
    pub fn label(&self) -> String {
        match self {
            Self::Healthz(service) => format!("{} /healthz", service.label()),
            other => other.to_string(),
        }
    }

    /// The call this action makes, built from the current drafts
    pub fn call(&self, drafts: &DraftState) -> ApiCall {
        match self {
            Self::CreateOrder => ApiCall::post(
                ServiceKey::Order,
                "/orders",
                create_order_body(&drafts.idempotency_key, drafts.amount_cents),
            ),
            Self::ReserveOrder => reserve_order_call(&drafts.order_id),
            Self::PaymentCallback => payment_callback_call(
                &drafts.order_id,
                &drafts.provider_txn_id,
                &drafts.payment_status,
            ),
            Self::GetOrder => ApiCall::get(
                ServiceKey::Order,
                format!("/orders/get?order_id={}", encode_component(&drafts.order_id)),
            ),
            Self::QueryOrderView => query_order_view_call(&drafts.query_order_id),
            Self::TryHold => ApiCall::post(
                ServiceKey::Inventory,
                "/inventory/try-hold",
                json!({
                    "partition_key": drafts.partition_key,
                    "hold_id": drafts.hold_id,
                    "qty": drafts.qty,
                    "capacity": drafts.capacity,
                }),
            ),
            Self::ReleaseHold => hold_call("/inventory/release-hold", drafts),
            Self::ConfirmHold => hold_call("/inventory/confirm-hold", drafts),
            Self::GetAvailability => availability_call(&drafts.partition_key),
            Self::Healthz(service) => ApiCall::get(*service, "/healthz"),
        }
    }

    /// Full execution request, including the success hook where one applies
    pub fn build(&self, drafts: &DraftState) -> ExecutionRequest {
        let request = ExecutionRequest::new(self.label(), self.call(drafts));
        match self {
            Self::CreateOrder => request.with_hook(SuccessHook::CaptureOrderId),
            _ => request,
        }
    }
}

pub(crate) fn create_order_body(idempotency_key: &str, amount_cents: i64) -> Value {
    json!({
        "idempotency_key": idempotency_key,
        "amount_cents": amount_cents,
    })
}

pub(crate) fn reserve_order_call(order_id: &str) -> ApiCall {
    ApiCall::post(ServiceKey::Order, "/orders/reserve", json!({ "order_id": order_id }))
}

pub(crate) fn payment_callback_call(order_id: &str, provider_txn_id: &str, status: &str) -> ApiCall {
    ApiCall::post(
        ServiceKey::Order,
        "/payments/callback",
        json!({
            "order_id": order_id,
            "provider_txn_id": provider_txn_id,
            "status": status,
        }),
    )
}

/// Read-model lookup for one order
pub fn query_order_view_call(order_id: &str) -> ApiCall {
    ApiCall::get(
        ServiceKey::Query,
        format!("/query/orders?order_id={}", encode_component(order_id)),
    )
}

fn availability_call(partition_key: &str) -> ApiCall {
    ApiCall::get(
        ServiceKey::Inventory,
        format!(
            "/inventory/availability?partition_key={}",
            encode_component(partition_key)
        ),
    )
}

fn hold_call(path: &str, drafts: &DraftState) -> ApiCall {
    ApiCall::post(
        ServiceKey::Inventory,
        path,
        json!({
            "partition_key": drafts.partition_key,
            "hold_id": drafts.hold_id,
        }),
    )
}

/// Typed view of a create-order response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order_id: String,
}

impl CreatedOrder {
    /// Extract the generated order id, if the response has one.
    ///
    /// Non-string ids are rendered as text.
    pub fn from_response(data: &Value) -> Option<Self> {
        let order_id = match data.as_object()?.get("OrderID")? {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        Some(Self { order_id })
    }
}
