//! # botfleet
//!
//! Client-side state for a fleet of provisioned messaging-bot instances.
//!
//! The crate keeps a local, non-authoritative view of a user's instances
//! and billing windows in step with a remote authority by polling it, and
//! estimates the still-accruing charge of open billing windows.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use botfleet::{BillingSync, Client, InstanceSync, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), botfleet::Error> {
//!     let settings = Settings::from_env().await?;
//!     let client = Arc::new(Client::from_settings(&settings)?);
//!
//!     let instances = InstanceSync::start(client.clone(), 1, settings.instances_poll_interval);
//!     let billing = BillingSync::start(client, 1, settings.billing_poll_interval)
//!         .with_pricing(settings.pricing);
//!
//!     instances.activate(42).await?;
//!
//!     let now = chrono::Utc::now().timestamp();
//!     if let Some(total) = billing.running_total(1_700_000_000, now) {
//!         println!("running total: {}", botfleet::format_cents(total));
//!     }
//!
//!     instances.stop();
//!     billing.stop();
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod billing;
pub mod client;
pub mod config;
pub mod observability;
pub mod prelude;
pub mod sync;
pub mod types;

pub use billing::{
    PricingPlan, PricingPlanBuilder, RecordCharge, estimate_open_window_charge, format_cents,
    running_total,
};
pub use client::{Client, ClientBuilder, NetworkConfig, RemoteApi};
pub use config::{ConfigBuilder, ConfigError, Settings};
pub use observability::{LogFormat, SyncMetrics, SyncMetricsSummary, init_logging};
pub use sync::{
    BillingSync, InstanceSync, Reconciler, RefreshFailure, Snapshot, Source, SyncPhase,
};
pub use types::{
    BillingRecord, BillingSummary, Instance, InstanceId, NewInstance, UnixSeconds, User, UserId,
};

/// Error type for botfleet operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request never produced a response (connect, timeout, body read).
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote authority answered with a non-2xx status.
    #[error("Remote error (HTTP {status}): {body}")]
    Remote { status: u16, body: String },

    /// A 2xx body did not match the expected shape for the endpoint.
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required environment variable missing or invalid.
    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    /// The collection's scheduler was torn down.
    #[error("Synchronizer for {collection} has been stopped")]
    Stopped { collection: String },
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Network failures, 429 and 5xx responses
    Transient,
    /// 401 and 403 responses
    Authorization,
    /// Other 4xx responses: the authority refused the request as sent
    Rejected,
    /// Configuration or environment problems
    Configuration,
    /// Response shape mismatches and unexpected statuses
    Internal,
    /// The scheduler is no longer running
    Lifecycle,
}

impl Error {
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Error::Remote {
            status,
            body: body.into(),
        }
    }

    pub fn decode(endpoint: &'static str, message: impl std::fmt::Display) -> Self {
        Error::Decode {
            endpoint,
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Transport(_) => ErrorCategory::Transient,
            Error::Remote {
                status: 429 | 500..=599,
                ..
            } => ErrorCategory::Transient,
            Error::Remote {
                status: 401 | 403, ..
            } => ErrorCategory::Authorization,
            Error::Remote {
                status: 400..=499, ..
            } => ErrorCategory::Rejected,
            Error::Remote { .. } | Error::Decode { .. } => ErrorCategory::Internal,
            Error::Config(_) | Error::Env(_) => ErrorCategory::Configuration,
            Error::Stopped { .. } => ErrorCategory::Lifecycle,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn is_unauthorized(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::Env(e) => Error::Env(e),
            other => Error::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
