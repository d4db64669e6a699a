use super::{date_label, same_month};
use crate::model::{MaintenanceRecord, MaintenanceStatus, Priority, RecordId};
use serde::Serialize;
use time::Date;

pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

/// Day classification order, strongest first.
const BACKGROUND_PRECEDENCE: [MaintenanceStatus; 4] = [
    MaintenanceStatus::Overdue,
    MaintenanceStatus::Pending,
    MaintenanceStatus::Completed,
    MaintenanceStatus::Cancelled,
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn get(&self, status: MaintenanceStatus) -> usize {
        match status {
            MaintenanceStatus::Pending => self.pending,
            MaintenanceStatus::Completed => self.completed,
            MaintenanceStatus::Overdue => self.overdue,
            MaintenanceStatus::Cancelled => self.cancelled,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.completed + self.overdue + self.cancelled
    }

    fn increment(&mut self, status: MaintenanceStatus) {
        let slot = match status {
            MaintenanceStatus::Pending => &mut self.pending,
            MaintenanceStatus::Completed => &mut self.completed,
            MaintenanceStatus::Overdue => &mut self.overdue,
            MaintenanceStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingSummary {
    pub id: RecordId,
    pub date: Date,
    pub date_label: String,
    pub equipment_label: String,
    pub maintenance_type: String,
    pub priority: Option<Priority>,
}

impl UpcomingSummary {
    fn from_record(record: &MaintenanceRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: record.scheduled_date,
            date_label: date_label(record.scheduled_date),
            equipment_label: record.equipment.label(),
            maintenance_type: record.maintenance_type.clone(),
            priority: record.priority,
        }
    }
}

/// Counts records scheduled in the month and year of `reference`.
pub fn monthly_summary(reference: Date, records: &[MaintenanceRecord]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for record in records {
        if same_month(record.scheduled_date, reference) {
            counts.increment(record.status);
        }
    }
    counts
}

/// Soonest pending records on or after `now`, at most `limit` of them.
/// Records sharing a date keep their input order.
pub fn upcoming_pending(
    records: &[MaintenanceRecord],
    now: Date,
    limit: usize,
) -> Vec<UpcomingSummary> {
    let mut pending: Vec<&MaintenanceRecord> = records
        .iter()
        .filter(|record| record.status == MaintenanceStatus::Pending)
        .filter(|record| record.scheduled_date >= now)
        .collect();
    pending.sort_by_key(|record| record.scheduled_date);

    pending
        .into_iter()
        .take(limit)
        .map(UpcomingSummary::from_record)
        .collect()
}

/// Status that decides a day's background: overdue, then pending, then
/// completed, then cancelled. `None` for a day without records.
pub fn day_background_priority(records: &[MaintenanceRecord]) -> Option<MaintenanceStatus> {
    BACKGROUND_PRECEDENCE
        .into_iter()
        .find(|status| records.iter().any(|record| record.status == *status))
}
