//! Property-Based Tests for the ticketing console
//!
//! These tests verify:
//! - History stays bounded and newest-first under any insertion count
//! - Query value encoding only ever emits the unreserved alphabet and escapes
//! - Draft field text survives a set/get round trip

use proptest::prelude::*;
use serde_json::json;
use ticketing_console::client::encode_component;
use ticketing_console::{
    ApiCall, ApiCallResult, DraftField, DraftState, HISTORY_CAPACITY, HistoryEntry, HistoryLog,
    ServiceKey,
};

fn entry(n: usize) -> HistoryEntry {
    let call = ApiCall::get(ServiceKey::Order, format!("/orders/get?order_id={}", n));
    let result = ApiCallResult {
        ok: true,
        status: 200,
        duration_ms: n as u64,
        data: json!({}),
    };
    HistoryEntry::record(&format!("call-{}", n), &call, &result)
}

// =============================================================================
// History
// =============================================================================

proptest! {
    /// History never exceeds capacity and keeps the newest entries first
    #[test]
    fn history_is_bounded_and_newest_first(count in 0usize..250) {
        let mut log = HistoryLog::default();
        for n in 0..count {
            log.record(entry(n));
        }

        prop_assert_eq!(log.len(), count.min(HISTORY_CAPACITY));
        if count > 0 {
            let latest = format!("call-{}", count - 1);
            prop_assert_eq!(&log.latest().unwrap().label, &latest);
        }
        for pair in log.entries().windows(2) {
            prop_assert!(pair[0].duration_ms > pair[1].duration_ms);
        }
    }

    /// A persisted list longer than capacity is cut on load
    #[test]
    fn history_from_entries_truncates(count in 0usize..250) {
        let entries: Vec<HistoryEntry> = (0..count).rev().map(entry).collect();
        let log = HistoryLog::from_entries(entries);
        prop_assert_eq!(log.len(), count.min(HISTORY_CAPACITY));
    }
}

// =============================================================================
// Encoding
// =============================================================================

proptest! {
    /// Output uses only unreserved characters and uppercase escapes
    #[test]
    fn encoding_alphabet(s in "\\PC*") {
        let encoded = encode_component(&s);
        let mut chars = encoded.chars();
        while let Some(c) = chars.next() {
            if c == '%' {
                let hi = chars.next().unwrap();
                let lo = chars.next().unwrap();
                prop_assert!(hi.is_ascii_hexdigit() && !hi.is_ascii_lowercase());
                prop_assert!(lo.is_ascii_hexdigit() && !lo.is_ascii_lowercase());
            } else {
                prop_assert!(
                    c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c),
                    "unexpected {:?} in {:?}", c, encoded
                );
            }
        }
    }
}

// =============================================================================
// Drafts
// =============================================================================

fn text_field() -> impl Strategy<Value = DraftField> {
    prop_oneof![
        Just(DraftField::OrderId),
        Just(DraftField::IdempotencyKey),
        Just(DraftField::ProviderTxnId),
        Just(DraftField::PaymentStatus),
        Just(DraftField::QueryOrderId),
        Just(DraftField::PartitionKey),
        Just(DraftField::HoldId),
    ]
}

proptest! {
    #[test]
    fn text_fields_store_any_text(field in text_field(), value in "\\PC*") {
        let mut drafts = DraftState::default();
        drafts.set_field(field, &value).unwrap();
        prop_assert_eq!(drafts.get_field(field), value);
    }

    #[test]
    fn numeric_fields_accept_integers(n in any::<i64>()) {
        let mut drafts = DraftState::default();
        drafts.set_field(DraftField::AmountCents, &n.to_string()).unwrap();
        prop_assert_eq!(drafts.amount_cents, n);
    }
}
