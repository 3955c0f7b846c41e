//! Hourly pricing with a time-bounded promotion for new users.
//!
//! Both rounding points (hours to cents, cents to discounted cents) round
//! half away from zero, which is half-up for the non-negative amounts
//! produced here.

use std::sync::LazyLock;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{PERCENT, SECONDS_PER_HOUR};
use crate::types::UnixSeconds;

/// $0.48 per active instance-hour.
pub const DEFAULT_HOURLY_RATE_CENTS: u32 = 48;
pub const DEFAULT_PROMO_DISCOUNT_PERCENT: u8 = 30;
/// Two 30-day months.
pub const DEFAULT_PROMO_DURATION_SECS: i64 = 2 * 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub hourly_rate_cents: u32,
    /// Discount applied to windows that start inside the promotion period.
    pub promo_discount_percent: u8,
    /// Length of the promotion period measured from user registration.
    pub promo_duration_secs: i64,
}

impl PricingPlan {
    pub const fn new(
        hourly_rate_cents: u32,
        promo_discount_percent: u8,
        promo_duration_secs: i64,
    ) -> Self {
        Self {
            hourly_rate_cents,
            promo_discount_percent,
            promo_duration_secs,
        }
    }

    pub fn builder() -> PricingPlanBuilder {
        PricingPlanBuilder::new()
    }

    /// Whether a window starting at `window_start` gets the promotional
    /// discount.
    ///
    /// Eligibility is fixed by the window's start, not by `now`: a window
    /// opened inside the promotion keeps the discount while it stays open.
    pub fn is_promotional(&self, window_start: UnixSeconds, user_created_at: UnixSeconds) -> bool {
        window_start.saturating_sub(user_created_at) <= self.promo_duration_secs
    }

    /// Undiscounted charge in cents for `elapsed_secs` of activity.
    /// Negative durations count as zero.
    pub fn base_charge(&self, elapsed_secs: i64) -> i64 {
        let elapsed = Decimal::from(elapsed_secs.max(0));
        let cents = elapsed * Decimal::from(self.hourly_rate_cents) / SECONDS_PER_HOUR;
        round_cents(cents)
    }

    pub fn apply_discount(&self, cents: i64) -> i64 {
        let keep = PERCENT - Decimal::from(self.promo_discount_percent.min(100));
        round_cents(Decimal::from(cents) * keep / PERCENT)
    }

    /// Running charge in cents for a window opened at `window_start` and
    /// still open at `now`. Never negative, even when `now` precedes the
    /// window start.
    pub fn estimate_open_window_charge(
        &self,
        window_start: UnixSeconds,
        user_created_at: UnixSeconds,
        now: UnixSeconds,
    ) -> i64 {
        let base = self.base_charge(now.saturating_sub(window_start));
        if self.is_promotional(window_start, user_created_at) {
            self.apply_discount(base)
        } else {
            base
        }
    }
}

impl Default for PricingPlan {
    fn default() -> Self {
        *reference_plan()
    }
}

fn round_cents(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

#[derive(Debug, Default)]
pub struct PricingPlanBuilder {
    hourly_rate_cents: Option<u32>,
    promo_discount_percent: Option<u8>,
    promo_duration_secs: Option<i64>,
}

impl PricingPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hourly_rate_cents(mut self, cents: u32) -> Self {
        self.hourly_rate_cents = Some(cents);
        self
    }

    /// Values above 100 are clamped.
    pub fn promo_discount_percent(mut self, percent: u8) -> Self {
        self.promo_discount_percent = Some(percent.min(100));
        self
    }

    pub fn promo_duration_secs(mut self, secs: i64) -> Self {
        self.promo_duration_secs = Some(secs);
        self
    }

    /// Disable the promotion entirely.
    pub fn no_promotion(mut self) -> Self {
        self.promo_discount_percent = Some(0);
        self
    }

    pub fn build(self) -> PricingPlan {
        PricingPlan {
            hourly_rate_cents: self.hourly_rate_cents.unwrap_or(DEFAULT_HOURLY_RATE_CENTS),
            promo_discount_percent: self
                .promo_discount_percent
                .unwrap_or(DEFAULT_PROMO_DISCOUNT_PERCENT),
            promo_duration_secs: self
                .promo_duration_secs
                .unwrap_or(DEFAULT_PROMO_DURATION_SECS),
        }
    }
}

static REFERENCE_PLAN: LazyLock<PricingPlan> = LazyLock::new(|| PricingPlanBuilder::new().build());

/// The published reference pricing: 48 cents/hour, 30% off for windows
/// opened within two months of registration.
pub fn reference_plan() -> &'static PricingPlan {
    &REFERENCE_PLAN
}
