mod cli;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::{Cli, Command, collect_config_overrides};
use fleetcal_core::calendar::{
    DAYS_PER_WEEK, UpcomingSummary, WeekStart, first_of_month, month_label, shift_month,
};
use fleetcal_core::calendar_api::{self, DayDetail, MonthView};
use fleetcal_core::config::{Config, load_config_with_fallback, merge_overrides};
use fleetcal_core::error::AppError;
use fleetcal_core::model::{MaintenanceRecord, MaintenanceStatus};
use fleetcal_core::style::status_style;
use std::io::{self, BufRead};
use tabled::builder::Builder;
use tabled::settings::Style;
use time::Date;
use tracing_subscriber::EnvFilter;

/// Month shown last in interactive mode, so `next` / `prev` can move from it.
#[derive(Debug, Default)]
struct Session {
    month: Option<Date>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: using default config: {}", err);
    }
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_argument)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn status_marker(status: MaintenanceStatus) -> char {
    match status {
        MaintenanceStatus::Overdue => '!',
        MaintenanceStatus::Pending => '*',
        MaintenanceStatus::Completed => '+',
        MaintenanceStatus::Cancelled => 'x',
    }
}

fn legend(color: bool) -> String {
    MaintenanceStatus::ALL
        .into_iter()
        .map(|status| {
            let style = status_style(status);
            style.paint(&format!("{} {}", status_marker(status), status), color)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn record_json(record: &MaintenanceRecord) -> serde_json::Value {
    serde_json::json!({
        "id": record.id,
        "scheduled_date": record.scheduled_date.to_string(),
        "status": record.status,
        "equipment": record.equipment,
        "priority": record.priority,
        "maintenance_type": record.maintenance_type,
    })
}

fn print_month_plain(view: &MonthView, color: bool) {
    let mut builder = Builder::default();
    builder.push_record(view.headers);

    for week in view.cells.chunks(DAYS_PER_WEEK) {
        let row = week.iter().map(|cell| {
            let day = if cell.in_current_month {
                format!("{:>2}", cell.date.day())
            } else {
                format!("({})", cell.date.day())
            };
            match cell.background() {
                Some(status) => format!("{} {}{}", day, status_marker(status), cell.records.len()),
                None => day,
            }
        });
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::modern());

    println!("{}", view.label);
    println!("{table}");
    println!("{}", legend(color));
    println!(
        "Summary: pending {} | completed {} | overdue {} | cancelled {}",
        view.summary.pending, view.summary.completed, view.summary.overdue, view.summary.cancelled
    );

    if !view.rejected.is_empty() {
        println!("Excluded {} record(s) with invalid data:", view.rejected.len());
        for rejected in &view.rejected {
            println!("  {} - {}", rejected.id, rejected.reason);
        }
    }
}

fn print_month_json(view: &MonthView) {
    let cells: Vec<_> = view
        .cells
        .iter()
        .map(|cell| {
            serde_json::json!({
                "date": cell.date.to_string(),
                "in_current_month": cell.in_current_month,
                "background": cell.background(),
                "records": cell.records.iter().map(record_json).collect::<Vec<_>>(),
            })
        })
        .collect();
    let rejected: Vec<_> = view
        .rejected
        .iter()
        .map(|rejected| serde_json::json!({ "id": rejected.id, "reason": rejected.reason }))
        .collect();

    let json = serde_json::json!({
        "month": view.reference.to_string(),
        "label": view.label,
        "week_start": view.week_start,
        "headers": view.headers,
        "cells": cells,
        "summary": view.summary,
        "rejected": rejected,
    });
    println!("{}", json);
}

fn print_summary(reference: Date, json: bool, color: bool) -> Result<(), AppError> {
    let counts = calendar_api::monthly_summary_for(reference)?;
    let label = month_label(reference);

    if json {
        let payload = serde_json::json!({
            "month": reference.to_string(),
            "label": label,
            "pending": counts.pending,
            "completed": counts.completed,
            "overdue": counts.overdue,
            "cancelled": counts.cancelled,
            "total": counts.total(),
        });
        println!("{}", payload);
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Status", "Count"]);
    for status in MaintenanceStatus::ALL {
        let style = status_style(status);
        builder.push_record([style.label.to_string(), counts.get(status).to_string()]);
    }
    builder.push_record(["Total".to_string(), counts.total().to_string()]);
    let mut table = builder.build();
    table.with(Style::modern());

    println!("{}", label);
    println!("{table}");
    if color && counts.overdue > 0 {
        let style = status_style(MaintenanceStatus::Overdue);
        println!("{}", style.paint(&format!("{} overdue", counts.overdue), true));
    }
    Ok(())
}

fn print_upcoming(items: &[UpcomingSummary], json: bool) {
    if json {
        let payload: Vec<_> = items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "id": item.id,
                    "date": item.date.to_string(),
                    "date_label": item.date_label,
                    "equipment": item.equipment_label,
                    "maintenance_type": item.maintenance_type,
                    "priority": item.priority,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(payload));
        return;
    }

    if items.is_empty() {
        println!("No upcoming pending maintenance.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Date", "Equipment", "Maintenance", "Priority"]);
    for item in items {
        builder.push_record([
            item.date_label.clone(),
            item.equipment_label.clone(),
            item.maintenance_type.clone(),
            item.priority.map(|p| p.as_str()).unwrap_or("-").to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    println!("{table}");
}

fn print_day(detail: &DayDetail, json: bool, color: bool) {
    if json {
        let style = detail.background.map(|status| {
            let style = status_style(status);
            serde_json::json!({ "color": style.color, "border": style.border.as_str() })
        });
        let json = serde_json::json!({
            "date": detail.date.to_string(),
            "label": detail.label,
            "background": detail.background,
            "style": style,
            "records": detail.records.iter().map(record_json).collect::<Vec<_>>(),
        });
        println!("{}", json);
        return;
    }

    println!("{}", detail.label);
    match detail.background {
        Some(status) => {
            let style = status_style(status);
            println!("Day status: {}", style.paint(style.label, color));
        }
        None => {
            println!("No maintenance scheduled.");
            return;
        }
    }

    for record in &detail.records {
        let style = status_style(record.status);
        let maintenance = if record.maintenance_type.is_empty() {
            "-"
        } else {
            record.maintenance_type.as_str()
        };
        println!(
            "{} | {} | {} | {}",
            record.id,
            style.paint(record.status.as_str(), color),
            record.equipment.label(),
            maintenance
        );
    }
}

/// Keeps the first line of a clap error and names the commands when the
/// subcommand itself was wrong.
fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let summary = rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "unrecognized calendar command".to_string());

    match err.kind() {
        ErrorKind::InvalidSubcommand
        | ErrorKind::MissingSubcommand
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => AppError::invalid_argument(format!(
            "{summary}; expected one of calendar, summary, upcoming, day"
        )),
        _ => AppError::invalid_argument(summary),
    }
}

/// Splits an interactive line into arguments. Single or double quotes group
/// words; an empty pair yields an empty argument.
fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current: Option<String> = None;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.get_or_insert_with(String::new).push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.get_or_insert_with(String::new);
            }
            None if ch.is_whitespace() => args.extend(current.take()),
            None => current.get_or_insert_with(String::new).push(ch),
        }
    }

    if let Some(open) = quote {
        return Err(AppError::invalid_argument(format!(
            "missing closing {open} in calendar command"
        )));
    }
    args.extend(current);

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
    println!("Browse months with next, prev and today after any calendar command.");
    println!("Type help to see this again, exit or quit to leave.");
}

fn month_or_current(month: Option<&str>) -> Result<Date, AppError> {
    match month {
        Some(value) => calendar_api::parse_month_argument(value),
        None => first_of_month(calendar_api::today_local()),
    }
}

fn show_month(
    reference: Date,
    week_start: WeekStart,
    json: bool,
    color: bool,
    session: &mut Session,
) -> Result<(), AppError> {
    let view = calendar_api::month_view(reference, week_start)?;
    session.month = Some(view.reference);
    if json {
        print_month_json(&view);
    } else {
        print_month_plain(&view, color);
    }
    Ok(())
}

fn run_command(cli: Cli, session: &mut Session) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    tracing::debug!(command = ?cli.command, json = cli.json, "running command");

    match cli.command {
        Command::Calendar { month, week_start } => {
            let reference = month_or_current(month.as_deref())?;
            let week_start = match week_start {
                Some(value) => WeekStart::parse(&value)
                    .ok_or_else(|| AppError::invalid_argument("week start must be sunday or monday"))?,
                None => config.week_start(),
            };
            show_month(reference, week_start, cli.json, config.color(), session)?;
        }
        Command::Summary { month } => {
            let reference = month_or_current(month.as_deref())?;
            print_summary(reference, cli.json, config.color())?;
        }
        Command::Upcoming { from, limit } => {
            let now = match from {
                Some(value) => calendar_api::parse_date_argument(&value)?,
                None => calendar_api::today_local(),
            };
            let limit = limit.unwrap_or_else(|| config.upcoming_limit());
            let items = calendar_api::upcoming(now, limit)?;
            print_upcoming(&items, cli.json);
        }
        Command::Day { date } => {
            let date = calendar_api::parse_date_argument(&date)?;
            let detail = calendar_api::day_detail(date)?;
            print_day(&detail, cli.json, config.color());
        }
    }

    Ok(())
}

fn navigate(session: &mut Session, delta: i32) -> Result<(), AppError> {
    let current = match session.month {
        Some(month) => month,
        None => month_or_current(None)?,
    };
    let target = if delta == 0 {
        month_or_current(None)?
    } else {
        shift_month(current, delta)?
    };

    let config = load_config_with_fallback().config;
    show_month(target, config.week_start(), false, config.color(), session)
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let mut session = Session::default();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let navigation = match line.to_ascii_lowercase().as_str() {
            "next" => Some(1),
            "prev" | "previous" => Some(-1),
            "today" => Some(0),
            _ => None,
        };
        if let Some(delta) = navigation {
            if let Err(err) = navigate(&mut session, delta) {
                eprintln!("ERROR: {}", err);
            }
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("fleetcal".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, &mut session) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let mut session = Session::default();
    if let Err(err) = run_command(cli, &mut session) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
