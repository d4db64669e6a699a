use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "records.json";
const STORE_ENV_VAR: &str = "FLEETCAL_STORE_PATH";

/// Snapshot file exported by the API layer.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecords {
    schema_version: u32,
    #[serde(default)]
    records: Vec<serde_json::Value>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("fleetcal").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("fleetcal")
            .join(STORE_FILE_NAME))
    }
}

/// Reads the exported entries undecoded. A missing file is an empty snapshot;
/// anything wrong inside a single entry is left for
/// [`crate::snapshot::Snapshot::from_json`].
pub fn load_records(path: &Path) -> Result<Vec<serde_json::Value>, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot file, using empty record set");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let stored: StoredRecords = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data(format!(
            "unsupported schema_version {}",
            stored.schema_version
        )));
    }

    tracing::debug!(path = %path.display(), records = stored.records.len(), "loaded snapshot");
    Ok(stored.records)
}
