//! Per-record charges and the live running total.

use serde::{Deserialize, Serialize};

use super::PricingPlan;
use crate::types::{BillingRecord, BillingSummary, UnixSeconds};

/// Format cents as a dollar string, e.g. `134` -> `"$1.34"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Charge of a single record as shown to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "cents", rename_all = "snake_case")]
pub enum RecordCharge {
    /// Closed window; amount persisted by the authority.
    Settled(i64),
    /// Open window; client-side estimate at the given `now`.
    Accruing(i64),
}

impl RecordCharge {
    pub fn cents(&self) -> i64 {
        match self {
            Self::Settled(c) | Self::Accruing(c) => *c,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, Self::Accruing(_))
    }
}

pub fn record_charge(
    record: &BillingRecord,
    user_created_at: UnixSeconds,
    now: UnixSeconds,
    plan: &PricingPlan,
) -> RecordCharge {
    if record.is_open() {
        RecordCharge::Accruing(plan.estimate_open_window_charge(
            record.started_at,
            user_created_at,
            now,
        ))
    } else {
        RecordCharge::Settled(record.amount_cents)
    }
}

/// Settled total plus the estimated charge of every open window.
pub fn running_total(
    summary: &BillingSummary,
    user_created_at: UnixSeconds,
    now: UnixSeconds,
    plan: &PricingPlan,
) -> i64 {
    let accruing: i64 = summary
        .open_records()
        .map(|r| plan.estimate_open_window_charge(r.started_at, user_created_at, now))
        .sum();
    summary.total_cents.saturating_add(accruing)
}
