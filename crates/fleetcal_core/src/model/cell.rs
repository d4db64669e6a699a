use crate::calendar::day_background_priority;
use crate::model::{MaintenanceRecord, MaintenanceStatus};
use time::Date;

/// One day-slot of the six-week grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: Date,
    pub in_current_month: bool,
    pub records: Vec<MaintenanceRecord>,
}

impl CalendarCell {
    pub fn background(&self) -> Option<MaintenanceStatus> {
        day_background_priority(&self.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
