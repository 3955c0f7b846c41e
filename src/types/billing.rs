//! Billing windows and per-user summaries.

use serde::{Deserialize, Serialize};

use super::{InstanceId, RecordId, UnixSeconds, UserId};

/// One contiguous active-usage window of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: RecordId,
    pub instance_id: InstanceId,
    pub user_id: UserId,
    pub started_at: UnixSeconds,
    /// `None` while the window is still open.
    pub ended_at: Option<UnixSeconds>,
    /// Settled charge in cents; always 0 while open.
    pub amount_cents: i64,
}

impl BillingRecord {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Length of a closed window in seconds.
    pub fn duration_secs(&self) -> Option<i64> {
        self.ended_at
            .map(|end| end.saturating_sub(self.started_at).max(0))
    }
}

/// Response of `GET /billing`.
///
/// `total_cents` covers closed windows only. Records keep the order the
/// authority returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub user_id: UserId,
    pub records: Vec<BillingRecord>,
    pub total_cents: i64,
}

impl BillingSummary {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            records: Vec::new(),
            total_cents: 0,
        }
    }

    pub fn open_records(&self) -> impl Iterator<Item = &BillingRecord> {
        self.records.iter().filter(|r| r.is_open())
    }

    pub fn closed_records(&self) -> impl Iterator<Item = &BillingRecord> {
        self.records.iter().filter(|r| !r.is_open())
    }

    /// Sum of closed-window amounts recomputed from the records.
    pub fn closed_total_cents(&self) -> i64 {
        self.closed_records().map(|r| r.amount_cents).sum()
    }

    /// The open window of an instance, if any.
    pub fn open_record_for_instance(&self, instance_id: InstanceId) -> Option<&BillingRecord> {
        self.open_records().find(|r| r.instance_id == instance_id)
    }

    pub fn records_for_instance(
        &self,
        instance_id: InstanceId,
    ) -> impl Iterator<Item = &BillingRecord> {
        self.records
            .iter()
            .filter(move |r| r.instance_id == instance_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: RecordId,
        instance_id: InstanceId,
        ended_at: Option<i64>,
        amount: i64,
    ) -> BillingRecord {
        BillingRecord {
            id,
            instance_id,
            user_id: 1,
            started_at: 1_000,
            ended_at,
            amount_cents: amount,
        }
    }

    #[test]
    fn test_summary_deserialization() {
        let json = r#"{
            "user_id": 1,
            "records": [
                {"id": 2, "instance_id": 5, "user_id": 1, "started_at": 100, "ended_at": null, "amount_cents": 0},
                {"id": 1, "instance_id": 5, "user_id": 1, "started_at": 0, "ended_at": 90, "amount_cents": 12}
            ],
            "total_cents": 12
        }"#;
        let summary: BillingSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.records[0].id, 2);
        assert!(summary.records[0].is_open());
        assert_eq!(summary.records[1].duration_secs(), Some(90));
    }

    #[test]
    fn test_summary_missing_field_is_error() {
        let json = r#"{"user_id": 1, "records": []}"#;
        assert!(serde_json::from_str::<BillingSummary>(json).is_err());
    }

    #[test]
    fn test_open_and_closed_partition() {
        let summary = BillingSummary {
            user_id: 1,
            records: vec![
                record(1, 5, Some(2_000), 40),
                record(2, 6, None, 0),
                record(3, 5, Some(3_000), 2),
            ],
            total_cents: 42,
        };
        assert_eq!(summary.open_records().count(), 1);
        assert_eq!(summary.closed_total_cents(), 42);
        assert_eq!(summary.open_record_for_instance(6).map(|r| r.id), Some(2));
        assert!(summary.open_record_for_instance(5).is_none());
        assert_eq!(summary.records_for_instance(5).count(), 2);
    }
}
