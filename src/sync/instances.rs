//! Instances-for-user collection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use super::{Reconciler, Snapshot, Source};
use crate::Result;
use crate::client::RemoteApi;
use crate::observability::SyncMetrics;
use crate::types::{Instance, InstanceId, NewInstance, UserId};

struct InstanceSource {
    api: Arc<dyn RemoteApi>,
    user_id: UserId,
}

#[async_trait]
impl Source for InstanceSource {
    type Output = Vec<Instance>;

    fn name(&self) -> &str {
        "instances"
    }

    async fn fetch(&self) -> Result<Vec<Instance>> {
        self.api.list_instances(self.user_id).await
    }
}

/// Cached instance list of one user plus write-through mutations.
pub struct InstanceSync {
    api: Arc<dyn RemoteApi>,
    user_id: UserId,
    reconciler: Reconciler<Vec<Instance>>,
}

impl std::fmt::Debug for InstanceSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceSync")
            .field("user_id", &self.user_id)
            .field("reconciler", &self.reconciler)
            .finish()
    }
}

impl InstanceSync {
    /// Start polling `user_id`'s instances every `interval`.
    pub fn start(api: Arc<dyn RemoteApi>, user_id: UserId, interval: Duration) -> Self {
        let source = InstanceSource {
            api: Arc::clone(&api),
            user_id,
        };
        Self {
            api,
            user_id,
            reconciler: Reconciler::start(source, interval),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Cached instances, `None` until the first successful fetch.
    pub fn instances(&self) -> Option<Arc<Vec<Instance>>> {
        self.reconciler.snapshot().shared_data()
    }

    pub fn instance(&self, id: InstanceId) -> Option<Instance> {
        self.instances()?.iter().find(|i| i.id == id).cloned()
    }

    pub fn snapshot(&self) -> Snapshot<Vec<Instance>> {
        self.reconciler.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Vec<Instance>>> {
        self.reconciler.subscribe()
    }

    /// Provision a new instance. On success the cache is resynced before
    /// this returns; on failure nothing is refreshed.
    pub async fn create(
        &self,
        country_code: impl AsRef<str>,
        phone_number: impl Into<String>,
    ) -> Result<Instance> {
        let request = NewInstance::new(self.user_id, country_code, phone_number);
        let instance = self.api.create_instance(&request).await?;
        self.resync("create").await;
        Ok(instance)
    }

    pub async fn activate(&self, id: InstanceId) -> Result<()> {
        self.api.set_instance_active(id, true).await?;
        self.resync("activate").await;
        Ok(())
    }

    pub async fn deactivate(&self, id: InstanceId) -> Result<()> {
        self.api.set_instance_active(id, false).await?;
        self.resync("deactivate").await;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<Snapshot<Vec<Instance>>> {
        self.reconciler.refresh().await
    }

    pub fn metrics(&self) -> &SyncMetrics {
        self.reconciler.metrics()
    }

    pub fn reconciler(&self) -> &Reconciler<Vec<Instance>> {
        &self.reconciler
    }

    pub fn stop(&self) {
        self.reconciler.stop();
    }

    pub async fn shutdown(&self) {
        self.reconciler.shutdown().await;
    }

    // Refresh errors are logged, never returned to the mutation caller.
    async fn resync(&self, action: &'static str) {
        if let Err(e) = self.reconciler.refresh().await {
            tracing::debug!(
                user_id = self.user_id,
                action,
                error = %e,
                "Post-mutation refresh skipped"
            );
        }
    }
}
