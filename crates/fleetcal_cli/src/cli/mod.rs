use clap::{Parser, Subcommand};
use fleetcal_core::calendar::WeekStart;
use fleetcal_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "fleetcal", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the six-week maintenance calendar for a month
    ///
    /// Example: fleetcal calendar --month 2025-09
    /// Example: fleetcal calendar --week-start monday
    Calendar {
        /// Month to display (YYYY-MM or any YYYY-MM-DD in it); defaults to this month
        #[arg(long)]
        month: Option<String>,
        /// First column of the grid: sunday or monday
        #[arg(long = "week-start", value_name = "DAY")]
        week_start: Option<String>,
    },
    /// Count a month's maintenance records by status
    ///
    /// Example: fleetcal summary --month 2025-09
    Summary {
        #[arg(long)]
        month: Option<String>,
    },
    /// List the soonest pending maintenance
    ///
    /// Example: fleetcal upcoming
    /// Example: fleetcal upcoming --from 2025-09-01 --limit 5
    Upcoming {
        /// Earliest date to include (YYYY-MM-DD); defaults to today
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the records scheduled on one day
    ///
    /// Example: fleetcal day 2025-09-01
    Day { date: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    WeekStart,
    UpcomingLimit,
    Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let key =
        normalize_override_key(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match key.as_str() {
        "week_start" | "weekstart" => ConfigOverrideTarget::WeekStart,
        "upcoming_limit" | "limit" => ConfigOverrideTarget::UpcomingLimit,
        "color" | "colour" => ConfigOverrideTarget::Color,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` argument into one set of overrides; later
/// values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::WeekStart => {
                let week_start = WeekStart::parse(&parsed.value)
                    .ok_or_else(|| format!("week_start must be sunday or monday, got '{}'", parsed.value))?;
                overrides.week_start = Some(week_start);
            }
            ConfigOverrideTarget::UpcomingLimit => {
                let limit = parsed
                    .value
                    .parse::<usize>()
                    .map_err(|_| format!("upcoming_limit must be a number, got '{}'", parsed.value))?;
                overrides.upcoming_limit = Some(limit);
            }
            ConfigOverrideTarget::Color => {
                let color = parse_bool(&parsed.value)
                    .ok_or_else(|| format!("color must be true or false, got '{}'", parsed.value))?;
                overrides.color = Some(color);
            }
        }
    }

    Ok(overrides)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// `" Week-Start "` and `week__start` both become `week_start`.
fn normalize_override_key(key: &str) -> Option<String> {
    let normalized = key
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    (!normalized.is_empty()).then_some(normalized)
}
