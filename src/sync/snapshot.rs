//! Cached view of one collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, ErrorCategory};

/// Observable lifecycle of a cached collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// No data and no fetch in flight. The first fetch may have failed.
    Empty,
    /// First fetch in flight.
    Loading,
    /// Data present, last fetch succeeded.
    Ready,
    /// Data present, fetch in flight.
    Refreshing,
    /// Data present but the last fetch failed; the data is stale.
    ReadyWithError,
}

/// A failed fetch as recorded in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshFailure {
    pub message: String,
    pub status: Option<u16>,
    pub category: ErrorCategory,
    pub at: DateTime<Utc>,
}

impl RefreshFailure {
    pub fn from_error(error: &Error) -> Self {
        Self {
            message: error.to_string(),
            status: error.status_code(),
            category: error.category(),
            at: Utc::now(),
        }
    }
}

impl std::fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Point-in-time copy of a collection's cache. Cheap to clone.
#[derive(Debug)]
pub struct Snapshot<T> {
    data: Option<Arc<T>>,
    error: Option<RefreshFailure>,
    in_flight: bool,
    generation: u64,
    latest_outcome: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            in_flight: self.in_flight,
            generation: self.generation,
            latest_outcome: self.latest_outcome,
            refreshed_at: self.refreshed_at,
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: false,
            generation: 0,
            latest_outcome: 0,
            refreshed_at: None,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    pub fn shared_data(&self) -> Option<Arc<T>> {
        self.data.clone()
    }

    pub fn error(&self) -> Option<&RefreshFailure> {
        self.error.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Generation of the fetch whose result is cached; 0 before any success.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn phase(&self) -> SyncPhase {
        match (self.data.is_some(), self.in_flight, self.error.is_some()) {
            (false, false, _) => SyncPhase::Empty,
            (false, true, _) => SyncPhase::Loading,
            (true, true, _) => SyncPhase::Refreshing,
            (true, false, true) => SyncPhase::ReadyWithError,
            (true, false, false) => SyncPhase::Ready,
        }
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.in_flight = true;
    }

    /// Drop the in-flight marker of a fetch that will never settle.
    pub(crate) fn abandon_fetch(&mut self) -> bool {
        std::mem::replace(&mut self.in_flight, false)
    }

    /// Apply the outcome of fetch `generation`. Returns `false` when a
    /// later-initiated fetch already settled and the result was discarded.
    pub(crate) fn apply(&mut self, generation: u64, outcome: Result<T, RefreshFailure>) -> bool {
        self.in_flight = false;
        if generation <= self.latest_outcome {
            return false;
        }
        self.latest_outcome = generation;
        match outcome {
            Ok(data) => {
                self.data = Some(Arc::new(data));
                self.error = None;
                self.generation = generation;
                self.refreshed_at = Some(Utc::now());
            }
            Err(failure) => self.error = Some(failure),
        }
        true
    }
}
