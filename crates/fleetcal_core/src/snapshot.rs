//! Boundary between exported records and the aggregator.
//!
//! Every raw record is validated exactly once here. Records that cannot be
//! trusted are set aside as [`RejectedRecord`]s and never reach an
//! aggregation, so one corrupt entry cannot hide the rest of the calendar.
//!
//! Dates follow the equipment-local policy: a timestamp contributes the
//! calendar date in the offset it was written with. No conversion to UTC or
//! to the viewer's zone happens.

use crate::error::AppError;
use crate::model::{MaintenanceRecord, MaintenanceStatus, Priority, RawMaintenanceRecord, RecordId};
use std::collections::HashSet;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub id: RecordId,
    pub reason: String,
}

/// Immutable, validated set of records for one aggregation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<MaintenanceRecord>,
    rejected: Vec<RejectedRecord>,
}

impl Snapshot {
    pub fn from_raw(raw: Vec<RawMaintenanceRecord>) -> Self {
        let mut records = Vec::with_capacity(raw.len());
        let mut rejected = Vec::new();
        let mut seen = HashSet::new();

        for entry in raw {
            let id = entry.id.clone();
            if seen.contains(&id) {
                tracing::warn!(record_id = %id, "excluding record with duplicate id");
                rejected.push(RejectedRecord {
                    id,
                    reason: "duplicate id".to_string(),
                });
                continue;
            }

            match validate_record(entry) {
                Ok(record) => {
                    seen.insert(id);
                    records.push(record);
                }
                Err(err) => {
                    tracing::warn!(record_id = %id, reason = err.message(), "excluding record");
                    rejected.push(RejectedRecord {
                        id,
                        reason: err.message().to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            accepted = records.len(),
            rejected = rejected.len(),
            "snapshot validated"
        );

        Self { records, rejected }
    }

    /// Decodes each exported entry on its own, so an entry with the wrong shape
    /// is rejected without taking its neighbours down with it.
    pub fn from_json(entries: Vec<serde_json::Value>) -> Self {
        let mut raw = Vec::with_capacity(entries.len());
        let mut malformed = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let id = entry_id(&entry, index);
            match serde_json::from_value::<RawMaintenanceRecord>(entry) {
                Ok(record) => raw.push(record),
                Err(err) => {
                    tracing::warn!(record_id = %id, error = %err, "excluding malformed record");
                    malformed.push(RejectedRecord {
                        id,
                        reason: format!("malformed record: {err}"),
                    });
                }
            }
        }

        let mut snapshot = Self::from_raw(raw);
        snapshot.rejected.extend(malformed);
        snapshot
    }

    /// Wraps records that were validated elsewhere.
    pub fn from_records(records: Vec<MaintenanceRecord>) -> Self {
        Self {
            records,
            rejected: Vec::new(),
        }
    }

    pub fn records(&self) -> &[MaintenanceRecord] {
        &self.records
    }

    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Id of an undecodable entry, or its position when the id itself is unusable.
fn entry_id(entry: &serde_json::Value, index: usize) -> RecordId {
    entry
        .get("id")
        .and_then(|id| serde_json::from_value::<RecordId>(id.clone()).ok())
        .unwrap_or_else(|| RecordId::Text(format!("#{}", index + 1)))
}

pub fn validate_record(raw: RawMaintenanceRecord) -> Result<MaintenanceRecord, AppError> {
    let scheduled_date = parse_scheduled_date(raw.scheduled_date.as_deref().unwrap_or_default())?;
    let status = match raw.status.as_deref().map(str::trim) {
        None | Some("") => return Err(AppError::invalid_data("status is required")),
        Some(value) => MaintenanceStatus::parse(value)
            .ok_or_else(|| AppError::invalid_data(format!("unknown status '{value}'")))?,
    };

    let priority = match raw.priority.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => {
            let parsed = Priority::parse(value);
            if parsed.is_none() {
                tracing::warn!(record_id = %raw.id, priority = value, "ignoring unknown priority");
            }
            parsed
        }
    };

    Ok(MaintenanceRecord {
        id: raw.id,
        scheduled_date,
        status,
        equipment: raw.equipment.unwrap_or_default(),
        priority,
        maintenance_type: raw
            .maintenance_type
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Reads a calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp, or a
/// naive `YYYY-MM-DD[T ]HH:MM[:SS]` timestamp.
pub fn parse_scheduled_date(raw: &str) -> Result<Date, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::invalid_data("scheduled_date is required"));
    }

    if let Ok(date) = Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Ok(date);
    }

    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(timestamp.date());
    }

    let naive = PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        )
    });

    naive
        .map(|timestamp| timestamp.date())
        .map_err(|_| AppError::invalid_data(format!("unparseable scheduled_date '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::{Snapshot, parse_scheduled_date};
    use crate::model::{MaintenanceStatus, Priority, RawMaintenanceRecord, RecordId};
    use time::macros::date;

    fn raw(id: i64, scheduled_date: &str, status: &str) -> RawMaintenanceRecord {
        RawMaintenanceRecord {
            id: RecordId::Number(id),
            scheduled_date: Some(scheduled_date.to_string()),
            status: Some(status.to_string()),
            equipment: None,
            priority: None,
            maintenance_type: None,
        }
    }

    #[test]
    fn parse_scheduled_date_accepts_supported_forms() {
        assert_eq!(parse_scheduled_date("2025-09-01").unwrap(), date!(2025 - 09 - 01));
        assert_eq!(
            parse_scheduled_date("2025-09-01T08:30:00Z").unwrap(),
            date!(2025 - 09 - 01)
        );
        assert_eq!(
            parse_scheduled_date("2025-09-01 08:30").unwrap(),
            date!(2025 - 09 - 01)
        );
        assert_eq!(
            parse_scheduled_date(" 2025-09-01T08:30:15 ").unwrap(),
            date!(2025 - 09 - 01)
        );
    }

    #[test]
    fn parse_scheduled_date_keeps_written_offset() {
        // 23:30 at -05:00 is already the 2nd in UTC; the local date wins.
        assert_eq!(
            parse_scheduled_date("2025-09-01T23:30:00-05:00").unwrap(),
            date!(2025 - 09 - 01)
        );
    }

    #[test]
    fn parse_scheduled_date_rejects_garbage() {
        assert_eq!(parse_scheduled_date("").unwrap_err().code(), "invalid_data");
        assert_eq!(
            parse_scheduled_date("2025-02-30").unwrap_err().code(),
            "invalid_data"
        );
        assert_eq!(
            parse_scheduled_date("next tuesday").unwrap_err().code(),
            "invalid_data"
        );
    }

    #[test]
    fn from_raw_excludes_corrupt_records_only() {
        let snapshot = Snapshot::from_raw(vec![
            raw(1, "2025-09-01", "pending"),
            raw(2, "not-a-date", "pending"),
            raw(3, "2025-09-03", "archived"),
            raw(4, "2025-09-04", "realized"),
        ]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records()[0].id, RecordId::Number(1));
        assert_eq!(snapshot.records()[1].status, MaintenanceStatus::Completed);

        let rejected: Vec<_> = snapshot.rejected().iter().map(|r| r.id.clone()).collect();
        assert_eq!(rejected, vec![RecordId::Number(2), RecordId::Number(3)]);
        assert!(snapshot.rejected()[1].reason.contains("archived"));
    }

    #[test]
    fn from_raw_keeps_first_of_duplicate_ids() {
        let snapshot = Snapshot::from_raw(vec![
            raw(1, "2025-09-01", "pending"),
            raw(1, "2025-09-02", "overdue"),
        ]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].scheduled_date, date!(2025 - 09 - 01));
        assert_eq!(snapshot.rejected()[0].reason, "duplicate id");
    }

    #[test]
    fn duplicate_of_rejected_record_is_not_a_duplicate() {
        let snapshot = Snapshot::from_raw(vec![
            raw(1, "garbage", "pending"),
            raw(1, "2025-09-02", "pending"),
        ]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].scheduled_date, date!(2025 - 09 - 02));
    }

    #[test]
    fn unknown_priority_is_dropped_not_fatal() {
        let mut entry = raw(1, "2025-09-01", "pending");
        entry.priority = Some("urgent".to_string());
        let mut other = raw(2, "2025-09-01", "pending");
        other.priority = Some("High".to_string());

        let snapshot = Snapshot::from_raw(vec![entry, other]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records()[0].priority, None);
        assert_eq!(snapshot.records()[1].priority, Some(Priority::High));
    }

    #[test]
    fn missing_date_or_status_rejects_only_that_record() {
        let mut no_date = raw(2, "", "pending");
        no_date.scheduled_date = None;
        let mut no_status = raw(3, "2025-09-03", "");
        no_status.status = None;

        let snapshot = Snapshot::from_raw(vec![raw(1, "2025-09-01", "pending"), no_date, no_status]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.rejected()[0].reason, "scheduled_date is required");
        assert_eq!(snapshot.rejected()[1].reason, "status is required");
    }

    #[test]
    fn from_json_rejects_badly_shaped_entries_individually() {
        let snapshot = Snapshot::from_json(vec![
            serde_json::json!({ "id": 1, "scheduled_date": "2025-09-01", "status": "pending" }),
            serde_json::json!({ "id": 2, "scheduled_date": null, "status": "pending" }),
            serde_json::json!({ "id": 3, "scheduled_date": 20250901, "status": "pending" }),
            serde_json::json!({
                "id": 4,
                "scheduled_date": "2025-09-04",
                "status": "overdue",
                "equipment": null,
                "maintenance_type": null
            }),
            serde_json::json!({ "scheduled_date": "2025-09-05", "status": "pending" }),
            serde_json::json!("not a record"),
        ]);

        let accepted: Vec<_> = snapshot.records().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(accepted, vec!["1", "4"]);
        assert_eq!(snapshot.records()[1].equipment.label(), "unknown equipment");
        assert!(snapshot.records()[1].maintenance_type.is_empty());

        let rejected: Vec<_> = snapshot.rejected().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(rejected, vec!["2", "3", "#5", "#6"]);
        assert!(snapshot.rejected()[1].reason.starts_with("malformed record"));
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        let snapshot = Snapshot::from_raw(Vec::new());
        assert!(snapshot.is_empty());
        assert!(snapshot.rejected().is_empty());
    }
}
