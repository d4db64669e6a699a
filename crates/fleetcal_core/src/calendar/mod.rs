//! Month grid construction and month navigation.
//!
//! The grid is always six full weeks (42 cells) starting on the configured
//! week start, so every month renders with the same shape. Records are
//! matched to cells by calendar-day equality of their scheduled date.

mod summary;

pub use summary::{
    DEFAULT_UPCOMING_LIMIT, StatusCounts, UpcomingSummary, day_background_priority,
    monthly_summary, upcoming_pending,
};

use crate::error::AppError;
use crate::model::{CalendarCell, MaintenanceRecord};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, Weekday};

pub const GRID_CELLS: usize = 42;
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Some(Self::Sunday),
            "monday" | "mon" => Some(Self::Monday),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
        }
    }

    /// Column of `weekday` in a grid starting on this day.
    pub fn column(self, weekday: Weekday) -> u8 {
        match self {
            Self::Sunday => weekday.number_days_from_sunday(),
            Self::Monday => weekday.number_days_from_monday(),
        }
    }

    pub fn first_weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sunday,
            Self::Monday => Weekday::Monday,
        }
    }
}

pub fn build_month_grid(
    reference: Date,
    records: &[MaintenanceRecord],
) -> Result<Vec<CalendarCell>, AppError> {
    build_month_grid_with(reference, records, WeekStart::default())
}

pub fn build_month_grid_with(
    reference: Date,
    records: &[MaintenanceRecord],
    week_start: WeekStart,
) -> Result<Vec<CalendarCell>, AppError> {
    let first = first_of_month(reference)?;
    let (start, end) = grid_window(first, week_start)?;

    let mut cells = Vec::with_capacity(GRID_CELLS);
    let mut date = start;
    loop {
        cells.push(CalendarCell {
            date,
            in_current_month: same_month(date, first),
            records: Vec::new(),
        });
        if date == end {
            break;
        }
        date = date.next_day().ok_or_else(out_of_range)?;
    }

    let mut placed = 0usize;
    for record in records {
        let scheduled = record.scheduled_date;
        if scheduled < start || scheduled > end {
            continue;
        }
        let index = (scheduled - start).whole_days() as usize;
        cells[index].records.push(record.clone());
        placed += 1;
    }

    tracing::debug!(
        month = %month_label(first),
        records = records.len(),
        placed,
        "built month grid"
    );

    Ok(cells)
}

/// First and last date shown by the grid for the month starting at `first`.
pub fn grid_window(first: Date, week_start: WeekStart) -> Result<(Date, Date), AppError> {
    let lead = i64::from(week_start.column(first.weekday()));
    let start = first
        .checked_sub(Duration::days(lead))
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add(Duration::days(GRID_CELLS as i64 - 1))
        .ok_or_else(out_of_range)?;
    Ok((start, end))
}

pub fn first_of_month(date: Date) -> Result<Date, AppError> {
    Date::from_calendar_date(date.year(), date.month(), 1).map_err(|_| out_of_range())
}

/// First day of the month `delta` months away from `date`.
pub fn shift_month(date: Date, delta: i32) -> Result<Date, AppError> {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + delta;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).map_err(|_| out_of_range())?;
    Date::from_calendar_date(year, month, 1).map_err(|_| out_of_range())
}

pub fn same_month(a: Date, b: Date) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// `"September 2025"`
pub fn month_label(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}

/// `"Mon, Sep 1, 2025"`
pub fn date_label(date: Date) -> String {
    format!(
        "{}, {} {}, {}",
        weekday_short(date.weekday()),
        month_short(date.month()),
        date.day(),
        date.year()
    )
}

pub fn weekday_headers(week_start: WeekStart) -> [&'static str; DAYS_PER_WEEK] {
    let mut headers = [""; DAYS_PER_WEEK];
    let mut weekday = week_start.first_weekday();
    for header in headers.iter_mut() {
        *header = weekday_short(weekday);
        weekday = weekday.next();
    }
    headers
}

pub fn records_on(date: Date, records: &[MaintenanceRecord]) -> Vec<&MaintenanceRecord> {
    records
        .iter()
        .filter(|record| record.scheduled_date == date)
        .collect()
}

fn weekday_short(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => "Sun",
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
    }
}

fn month_short(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn out_of_range() -> AppError {
    AppError::invalid_argument("reference month is outside the supported date range")
}

#[cfg(test)]
mod tests {
    use super::{
        GRID_CELLS, WeekStart, build_month_grid, build_month_grid_with, date_label, first_of_month,
        month_label, records_on, shift_month, weekday_headers,
    };
    use crate::model::{MaintenanceRecord, MaintenanceStatus};
    use proptest::prelude::*;
    use time::macros::date;
    use time::{Date, Duration, Month, Weekday};

    fn record(id: i64, date: Date, status: MaintenanceStatus) -> MaintenanceRecord {
        MaintenanceRecord::new(id, date, status)
    }

    #[test]
    fn grid_places_records_across_month_boundary() {
        let records = vec![
            record(1, date!(2025 - 09 - 01), MaintenanceStatus::Pending),
            record(2, date!(2025 - 08 - 31), MaintenanceStatus::Overdue),
        ];

        let grid = build_month_grid(date!(2025 - 09 - 01), &records).unwrap();

        assert_eq!(grid.len(), GRID_CELLS);
        assert_eq!(grid[0].date, date!(2025 - 08 - 31));
        assert!(!grid[0].in_current_month);
        assert_eq!(grid[0].records.len(), 1);
        assert_eq!(grid[0].records[0].status, MaintenanceStatus::Overdue);

        assert_eq!(grid[1].date, date!(2025 - 09 - 01));
        assert!(grid[1].in_current_month);
        assert_eq!(grid[1].records.len(), 1);
        assert_eq!(grid[1].records[0].status, MaintenanceStatus::Pending);
    }

    #[test]
    fn grid_uses_any_day_of_the_month_as_reference() {
        let from_first = build_month_grid(date!(2025 - 09 - 01), &[]).unwrap();
        let from_mid = build_month_grid(date!(2025 - 09 - 17), &[]).unwrap();
        assert_eq!(from_first, from_mid);
    }

    #[test]
    fn grid_pads_month_starting_on_sunday_with_trailing_days() {
        // June 2025 starts on a Sunday: no leading days, 12 trailing.
        let grid = build_month_grid(date!(2025 - 06 - 10), &[]).unwrap();
        assert_eq!(grid[0].date, date!(2025 - 06 - 01));
        assert_eq!(grid[41].date, date!(2025 - 07 - 12));
        assert_eq!(grid.iter().filter(|cell| cell.in_current_month).count(), 30);
    }

    #[test]
    fn grid_with_monday_start_begins_on_monday() {
        let grid =
            build_month_grid_with(date!(2025 - 06 - 10), &[], WeekStart::Monday).unwrap();
        assert_eq!(grid[0].date, date!(2025 - 05 - 26));
        assert_eq!(grid[0].date.weekday(), Weekday::Monday);
        assert_eq!(grid.len(), GRID_CELLS);
    }

    #[test]
    fn grid_omits_records_outside_window() {
        let records = vec![
            record(1, date!(2025 - 07 - 01), MaintenanceStatus::Pending),
            record(2, date!(2025 - 11 - 01), MaintenanceStatus::Pending),
        ];
        let grid = build_month_grid(date!(2025 - 09 - 01), &records).unwrap();
        assert!(grid.iter().all(|cell| cell.records.is_empty()));
    }

    #[test]
    fn grid_keeps_input_order_within_a_day() {
        let day = date!(2025 - 09 - 10);
        let records = vec![
            record(3, day, MaintenanceStatus::Cancelled),
            record(1, day, MaintenanceStatus::Pending),
            record(2, day, MaintenanceStatus::Overdue),
        ];
        let grid = build_month_grid(day, &records).unwrap();
        let cell = grid.iter().find(|cell| cell.date == day).unwrap();
        let ids: Vec<_> = cell.records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn grid_rejects_months_at_the_edge_of_the_date_range() {
        let err = build_month_grid(Date::MAX, &[]).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn shift_month_crosses_year_boundaries() {
        assert_eq!(shift_month(date!(2025 - 12 - 15), 1).unwrap(), date!(2026 - 01 - 01));
        assert_eq!(shift_month(date!(2025 - 01 - 31), -1).unwrap(), date!(2024 - 12 - 01));
        assert_eq!(shift_month(date!(2025 - 03 - 31), -13).unwrap(), date!(2024 - 02 - 01));
        assert_eq!(shift_month(date!(2025 - 03 - 31), 0).unwrap(), date!(2025 - 03 - 01));
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(month_label(date!(2025 - 09 - 14)), "September 2025");
        assert_eq!(date_label(date!(2025 - 09 - 01)), "Mon, Sep 1, 2025");
        assert_eq!(
            weekday_headers(WeekStart::Sunday),
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        assert_eq!(weekday_headers(WeekStart::Monday)[6], "Sun");
    }

    #[test]
    fn records_on_matches_calendar_day() {
        let records = vec![
            record(1, date!(2025 - 09 - 01), MaintenanceStatus::Pending),
            record(2, date!(2025 - 09 - 02), MaintenanceStatus::Pending),
        ];
        let found = records_on(date!(2025 - 09 - 02), &records);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.to_string(), "2");
    }

    #[test]
    fn week_start_parse_accepts_short_names() {
        assert_eq!(WeekStart::parse("Mon"), Some(WeekStart::Monday));
        assert_eq!(WeekStart::parse("sunday"), Some(WeekStart::Sunday));
        assert_eq!(WeekStart::parse("friday"), None);
    }

    fn any_date() -> impl Strategy<Value = Date> {
        (1900i32..2200, 1u8..=12, 1u8..=28).prop_map(|(year, month, day)| {
            Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap()
        })
    }

    fn any_week_start() -> impl Strategy<Value = WeekStart> {
        prop_oneof![Just(WeekStart::Sunday), Just(WeekStart::Monday)]
    }

    proptest! {
        #[test]
        fn prop_grid_is_42_consecutive_days(reference in any_date(), week_start in any_week_start()) {
            let grid = build_month_grid_with(reference, &[], week_start).unwrap();
            prop_assert_eq!(grid.len(), GRID_CELLS);
            prop_assert_eq!(grid[0].date.weekday(), week_start.first_weekday());
            for pair in grid.windows(2) {
                prop_assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
            let first = first_of_month(reference).unwrap();
            prop_assert!(grid.iter().any(|cell| cell.date == first));
            for cell in &grid {
                prop_assert_eq!(
                    cell.in_current_month,
                    cell.date.month() == reference.month() && cell.date.year() == reference.year()
                );
            }
        }

        #[test]
        fn prop_records_in_window_land_in_exactly_one_cell(
            reference in any_date(),
            offsets in proptest::collection::vec(-70i64..70, 0..40),
        ) {
            let records: Vec<_> = offsets
                .iter()
                .enumerate()
                .map(|(index, offset)| {
                    record(index as i64, reference + Duration::days(*offset), MaintenanceStatus::Pending)
                })
                .collect();
            let grid = build_month_grid(reference, &records).unwrap();
            let start = grid[0].date;
            let end = grid[GRID_CELLS - 1].date;

            for record in &records {
                let hits = grid
                    .iter()
                    .flat_map(|cell| cell.records.iter())
                    .filter(|placed| placed.id == record.id)
                    .count();
                let inside = record.scheduled_date >= start && record.scheduled_date <= end;
                prop_assert_eq!(hits, usize::from(inside));
            }
            for cell in &grid {
                for placed in &cell.records {
                    prop_assert_eq!(placed.scheduled_date, cell.date);
                }
            }
        }
    }
}
