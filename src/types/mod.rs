//! Wire types shared with the remote authority.
//!
//! Every timestamp is Unix seconds. Amounts are integer minor currency
//! units (cents).

mod billing;
mod instance;
mod user;

pub use billing::{BillingRecord, BillingSummary};
pub use instance::{Instance, NewInstance};
pub use user::User;

use chrono::{DateTime, Utc};

/// Unix timestamp in seconds.
pub type UnixSeconds = i64;

pub type UserId = i64;
pub type InstanceId = i64;
pub type RecordId = i64;

/// Convert a Unix timestamp to a UTC datetime, `None` when out of range.
pub fn to_datetime(ts: UnixSeconds) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_datetime() {
        let dt = to_datetime(0).unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-01T00:00:00+00:00");
        assert!(to_datetime(i64::MAX).is_none());
    }
}
