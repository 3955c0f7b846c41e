//! Pay-as-you-go charge estimation.
//!
//! Pure functions only: nothing here reads the clock or performs I/O.
//! Callers pass `now` explicitly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod charge;
pub mod pricing;

pub use charge::{RecordCharge, format_cents, record_charge, running_total};
pub use pricing::{
    DEFAULT_HOURLY_RATE_CENTS, DEFAULT_PROMO_DISCOUNT_PERCENT, DEFAULT_PROMO_DURATION_SECS,
    PricingPlan, PricingPlanBuilder, reference_plan,
};

use crate::types::UnixSeconds;

pub(crate) const SECONDS_PER_HOUR: Decimal = dec!(3600);
pub(crate) const PERCENT: Decimal = dec!(100);

/// Running charge in cents for an open window under the reference plan.
///
/// See [`PricingPlan::estimate_open_window_charge`].
pub fn estimate_open_window_charge(
    window_start: UnixSeconds,
    user_created_at: UnixSeconds,
    now: UnixSeconds,
) -> i64 {
    reference_plan().estimate_open_window_charge(window_start, user_created_at, now)
}
