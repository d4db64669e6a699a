use crate::calendar::{
    self, StatusCounts, UpcomingSummary, WeekStart, build_month_grid_with, day_background_priority,
    first_of_month, month_label, monthly_summary, upcoming_pending, weekday_headers,
};
use crate::error::AppError;
use crate::model::{CalendarCell, MaintenanceRecord, MaintenanceStatus};
use crate::snapshot::{RejectedRecord, Snapshot};
use crate::storage::json_store;
use std::path::Path;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone)]
pub struct MonthView {
    pub reference: Date,
    pub label: String,
    pub week_start: WeekStart,
    pub headers: [&'static str; calendar::DAYS_PER_WEEK],
    pub cells: Vec<CalendarCell>,
    pub summary: StatusCounts,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone)]
pub struct DayDetail {
    pub date: Date,
    pub label: String,
    pub records: Vec<MaintenanceRecord>,
    pub background: Option<MaintenanceStatus>,
}

pub fn load_snapshot_from(path: &Path) -> Result<Snapshot, AppError> {
    let entries = json_store::load_records(path)?;
    Ok(Snapshot::from_json(entries))
}

pub fn month_view(reference: Date, week_start: WeekStart) -> Result<MonthView, AppError> {
    let path = json_store::store_path()?;
    month_view_with_path(&path, reference, week_start)
}

pub fn monthly_summary_for(reference: Date) -> Result<StatusCounts, AppError> {
    let path = json_store::store_path()?;
    monthly_summary_with_path(&path, reference)
}

pub fn upcoming(now: Date, limit: usize) -> Result<Vec<UpcomingSummary>, AppError> {
    let path = json_store::store_path()?;
    upcoming_with_path(&path, now, limit)
}

pub fn day_detail(date: Date) -> Result<DayDetail, AppError> {
    let path = json_store::store_path()?;
    day_detail_with_path(&path, date)
}

fn month_view_with_path(
    path: &Path,
    reference: Date,
    week_start: WeekStart,
) -> Result<MonthView, AppError> {
    let snapshot = load_snapshot_from(path)?;
    build_month_view(&snapshot, reference, week_start)
}

fn monthly_summary_with_path(path: &Path, reference: Date) -> Result<StatusCounts, AppError> {
    let snapshot = load_snapshot_from(path)?;
    Ok(monthly_summary(reference, snapshot.records()))
}

fn upcoming_with_path(
    path: &Path,
    now: Date,
    limit: usize,
) -> Result<Vec<UpcomingSummary>, AppError> {
    let snapshot = load_snapshot_from(path)?;
    Ok(upcoming_pending(snapshot.records(), now, limit))
}

fn day_detail_with_path(path: &Path, date: Date) -> Result<DayDetail, AppError> {
    let snapshot = load_snapshot_from(path)?;
    Ok(build_day_detail(&snapshot, date))
}

/// Grid, summary and rejects for the month containing `reference`.
pub fn build_month_view(
    snapshot: &Snapshot,
    reference: Date,
    week_start: WeekStart,
) -> Result<MonthView, AppError> {
    let first = first_of_month(reference)?;
    let cells = build_month_grid_with(first, snapshot.records(), week_start)?;

    Ok(MonthView {
        reference: first,
        label: month_label(first),
        week_start,
        headers: weekday_headers(week_start),
        cells,
        summary: monthly_summary(first, snapshot.records()),
        rejected: snapshot.rejected().to_vec(),
    })
}

pub fn build_day_detail(snapshot: &Snapshot, date: Date) -> DayDetail {
    let records: Vec<MaintenanceRecord> = calendar::records_on(date, snapshot.records())
        .into_iter()
        .cloned()
        .collect();
    let background = day_background_priority(&records);

    DayDetail {
        date,
        label: calendar::date_label(date),
        records,
        background,
    }
}

/// Accepts `YYYY-MM` or a full `YYYY-MM-DD`; returns the first of that month.
pub fn parse_month_argument(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("month is required"));
    }

    if let Ok(date) = parse_date_argument(trimmed) {
        return first_of_month(date);
    }

    let invalid = || AppError::invalid_argument("month must be YYYY-MM");
    let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, 1).map_err(|_| invalid())
}

pub fn parse_date_argument(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_argument("date must be YYYY-MM-DD"))
}

/// Today in the local offset, or in UTC when the offset cannot be determined.
pub fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}
