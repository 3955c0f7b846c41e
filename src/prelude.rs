//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use botfleet::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::ErrorCategory;
pub use crate::Result;

// Client
pub use crate::Client;
pub use crate::ClientBuilder;
pub use crate::RemoteApi;

// Types
pub use crate::types::{
    BillingRecord, BillingSummary, Instance, InstanceId, NewInstance, UnixSeconds, User, UserId,
};

// Billing
pub use crate::billing::{PricingPlan, RecordCharge, format_cents, running_total};

// Sync
pub use crate::sync::{BillingSync, InstanceSync, Reconciler, Snapshot, Source, SyncPhase};

// Config
pub use crate::config::Settings;
