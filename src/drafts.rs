//! Editable form fields shared by the order, inventory and booking views.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Free-form draft values; last write wins, persisted on every change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftState {
    pub order_id: String,
    pub idempotency_key: String,
    pub amount_cents: i64,
    pub provider_txn_id: String,
    pub payment_status: String,
    pub query_order_id: String,
    pub partition_key: String,
    pub hold_id: String,
    pub qty: i64,
    pub capacity: i64,
}

impl Default for DraftState {
    fn default() -> Self {
        Self {
            order_id: String::new(),
            idempotency_key: "demo-key-1".to_string(),
            amount_cents: 10000,
            provider_txn_id: "txn-demo-1".to_string(),
            payment_status: "SUCCESS".to_string(),
            query_order_id: String::new(),
            partition_key: "G123|2026-02-11|2nd".to_string(),
            hold_id: "hold-demo-1".to_string(),
            qty: 1,
            capacity: 200,
        }
    }
}

/// Addressable draft fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DraftField {
    OrderId,
    IdempotencyKey,
    AmountCents,
    ProviderTxnId,
    PaymentStatus,
    QueryOrderId,
    PartitionKey,
    HoldId,
    Qty,
    Capacity,
}

impl DraftField {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::AmountCents | Self::Qty | Self::Capacity)
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl DraftState {
    /// Render a field for display or editing
    pub fn get_field(&self, field: DraftField) -> String {
        match field {
            DraftField::OrderId => self.order_id.clone(),
            DraftField::IdempotencyKey => self.idempotency_key.clone(),
            DraftField::AmountCents => self.amount_cents.to_string(),
            DraftField::ProviderTxnId => self.provider_txn_id.clone(),
            DraftField::PaymentStatus => self.payment_status.clone(),
            DraftField::QueryOrderId => self.query_order_id.clone(),
            DraftField::PartitionKey => self.partition_key.clone(),
            DraftField::HoldId => self.hold_id.clone(),
            DraftField::Qty => self.qty.to_string(),
            DraftField::Capacity => self.capacity.to_string(),
        }
    }

    /// Set a field from user text. Numeric fields must parse as integers.
    pub fn set_field(&mut self, field: DraftField, value: &str) -> Result<()> {
        match field {
            DraftField::OrderId => self.order_id = value.to_string(),
            DraftField::IdempotencyKey => self.idempotency_key = value.to_string(),
            DraftField::AmountCents => self.amount_cents = parse_number(field, value)?,
            DraftField::ProviderTxnId => self.provider_txn_id = value.to_string(),
            DraftField::PaymentStatus => self.payment_status = value.to_string(),
            DraftField::QueryOrderId => self.query_order_id = value.to_string(),
            DraftField::PartitionKey => self.partition_key = value.to_string(),
            DraftField::HoldId => self.hold_id = value.to_string(),
            DraftField::Qty => self.qty = parse_number(field, value)?,
            DraftField::Capacity => self.capacity = parse_number(field, value)?,
        }
        Ok(())
    }

    /// Copy the working order id into the read-model query field
    pub fn use_current_order_id(&mut self) {
        self.query_order_id = self.order_id.clone();
    }
}

fn parse_number(field: DraftField, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        ConsoleError::validation(format!("{} must be a whole number, got '{}'", field, value))
    })
}
