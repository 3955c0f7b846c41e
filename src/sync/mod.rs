//! Reconciliation of cached collections with the remote authority.
//!
//! Each tracked collection gets its own [`Reconciler`]: a tokio task that
//! owns the collection's [`Snapshot`] and is its only writer. Consumers
//! read snapshots or subscribe to changes; mutations go through the
//! collection's synchronizer and force an immediate resync.

mod billing;
mod instances;
mod reconciler;
mod snapshot;

pub use billing::BillingSync;
pub use instances::InstanceSync;
pub use reconciler::{MIN_POLL_INTERVAL, Reconciler, Source};
pub use snapshot::{RefreshFailure, Snapshot, SyncPhase};
