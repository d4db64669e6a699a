use crate::calendar::{DEFAULT_UPCOMING_LIMIT, WeekStart};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "FLEETCAL_CONFIG_PATH";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub week_start: Option<WeekStart>,
    #[serde(default)]
    pub upcoming_limit: Option<usize>,
    #[serde(default)]
    pub color: Option<bool>,
}

impl Config {
    pub fn week_start(&self) -> WeekStart {
        self.week_start.unwrap_or_default()
    }

    pub fn upcoming_limit(&self) -> usize {
        self.upcoming_limit.unwrap_or(DEFAULT_UPCOMING_LIMIT)
    }

    pub fn color(&self) -> bool {
        self.color.unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub week_start: Option<WeekStart>,
    pub upcoming_limit: Option<usize>,
    pub color: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("fleetcal")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("fleetcal")
            .join(CONFIG_FILE_NAME))
    }
}

/// Never fails: a missing file gives defaults, a broken one gives defaults
/// plus the error so the caller can warn.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(week_start) = overrides.week_start {
        merged.week_start = Some(week_start);
    }
    if let Some(limit) = overrides.upcoming_limit {
        merged.upcoming_limit = Some(limit);
    }
    if let Some(color) = overrides.color {
        merged.color = Some(color);
    }
    merged
}
