//! Remote authority trait.

use async_trait::async_trait;

use crate::Result;
use crate::types::{BillingSummary, Instance, InstanceId, NewInstance, UserId};

/// Typed operations against the remote authority.
///
/// Implemented over HTTP by [`Client`](super::Client); the synchronizers
/// depend only on this trait.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn list_instances(&self, user_id: UserId) -> Result<Vec<Instance>>;

    async fn create_instance(&self, request: &NewInstance) -> Result<Instance>;

    async fn set_instance_active(&self, id: InstanceId, active: bool) -> Result<()>;

    async fn billing_summary(&self, user_id: UserId) -> Result<BillingSummary>;
}
