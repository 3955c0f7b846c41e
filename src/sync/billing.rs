//! Billing-summary-for-user collection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use super::{Reconciler, Snapshot, Source};
use crate::Result;
use crate::billing::{PricingPlan, RecordCharge, record_charge, running_total};
use crate::client::RemoteApi;
use crate::observability::SyncMetrics;
use crate::types::{BillingRecord, BillingSummary, UnixSeconds, User, UserId};

struct BillingSource {
    api: Arc<dyn RemoteApi>,
    user_id: UserId,
}

#[async_trait]
impl Source for BillingSource {
    type Output = BillingSummary;

    fn name(&self) -> &str {
        "billing"
    }

    async fn fetch(&self) -> Result<BillingSummary> {
        self.api.billing_summary(self.user_id).await
    }
}

/// Cached billing summary of one user with live charge estimates.
///
/// Estimates take `now` as a parameter; nothing here reads the clock.
pub struct BillingSync {
    user_id: UserId,
    plan: PricingPlan,
    reconciler: Reconciler<BillingSummary>,
}

impl std::fmt::Debug for BillingSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingSync")
            .field("user_id", &self.user_id)
            .field("plan", &self.plan)
            .field("reconciler", &self.reconciler)
            .finish()
    }
}

impl BillingSync {
    pub fn start(api: Arc<dyn RemoteApi>, user_id: UserId, interval: Duration) -> Self {
        let source = BillingSource { api, user_id };
        Self {
            user_id,
            plan: PricingPlan::default(),
            reconciler: Reconciler::start(source, interval),
        }
    }

    /// Price open windows with `plan` instead of the reference plan.
    pub fn with_pricing(mut self, plan: PricingPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn pricing(&self) -> &PricingPlan {
        &self.plan
    }

    /// Cached summary, `None` until the first successful fetch.
    pub fn summary(&self) -> Option<Arc<BillingSummary>> {
        self.reconciler.snapshot().shared_data()
    }

    pub fn snapshot(&self) -> Snapshot<BillingSummary> {
        self.reconciler.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<BillingSummary>> {
        self.reconciler.subscribe()
    }

    /// Settled total plus the estimate of every open window at `now`.
    pub fn running_total(&self, user_created_at: UnixSeconds, now: UnixSeconds) -> Option<i64> {
        let summary = self.summary()?;
        Some(running_total(&summary, user_created_at, now, &self.plan))
    }

    pub fn running_total_for(&self, user: &User, now: UnixSeconds) -> Option<i64> {
        self.running_total(user.created_at, now)
    }

    /// Every cached record with its settled or accruing charge at `now`.
    pub fn record_charges(
        &self,
        user_created_at: UnixSeconds,
        now: UnixSeconds,
    ) -> Option<Vec<(BillingRecord, RecordCharge)>> {
        let summary = self.summary()?;
        let charges = summary
            .records
            .iter()
            .map(|r| {
                let charge = record_charge(r, user_created_at, now, &self.plan);
                (r.clone(), charge)
            })
            .collect();
        Some(charges)
    }

    pub async fn refresh(&self) -> Result<Snapshot<BillingSummary>> {
        self.reconciler.refresh().await
    }

    pub fn metrics(&self) -> &SyncMetrics {
        self.reconciler.metrics()
    }

    pub fn reconciler(&self) -> &Reconciler<BillingSummary> {
        &self.reconciler
    }

    pub fn stop(&self) {
        self.reconciler.stop();
    }

    pub async fn shutdown(&self) {
        self.reconciler.shutdown().await;
    }
}
