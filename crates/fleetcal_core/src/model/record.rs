use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

/// Record identifier as issued by the API layer. Either form is accepted and
/// compared as-is; `7` and `"7"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Serialized as its canonical label; input goes through [`MaintenanceStatus::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    Completed,
    Overdue,
    Cancelled,
}

impl MaintenanceStatus {
    pub const ALL: [MaintenanceStatus; 4] = [
        MaintenanceStatus::Pending,
        MaintenanceStatus::Completed,
        MaintenanceStatus::Overdue,
        MaintenanceStatus::Cancelled,
    ];

    /// Parses the wire label. `realized` is the legacy name for completed work.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" | "realized" => Some(Self::Completed),
            "overdue" => Some(Self::Overdue),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Equipment the record belongs to. Carried through aggregation untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRef {
    #[serde(default, alias = "assetTag")]
    pub asset_tag: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
}

impl EquipmentRef {
    /// `"TRK-014 · Volvo FH16"`, skipping whichever parts are blank.
    pub fn label(&self) -> String {
        let vehicle = [self.make.trim(), self.model.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let tag = self.asset_tag.trim();

        match (tag.is_empty(), vehicle.is_empty()) {
            (false, false) => format!("{tag} · {vehicle}"),
            (false, true) => tag.to_string(),
            (true, false) => vehicle,
            (true, true) => "unknown equipment".to_string(),
        }
    }
}

/// Record exactly as the API layer exported it. Nothing here is trusted yet;
/// see [`crate::snapshot::Snapshot::from_raw`]. Every field but `id` may be
/// missing or `null` so the decision to reject stays with the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaintenanceRecord {
    pub id: RecordId,
    #[serde(default, alias = "scheduledDate")]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "equipmentRef")]
    pub equipment: Option<EquipmentRef>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, alias = "maintenanceType")]
    pub maintenance_type: Option<String>,
}

/// Validated maintenance record handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRecord {
    pub id: RecordId,
    pub scheduled_date: Date,
    pub status: MaintenanceStatus,
    pub equipment: EquipmentRef,
    pub priority: Option<Priority>,
    pub maintenance_type: String,
}

impl MaintenanceRecord {
    pub fn new(id: impl Into<RecordId>, scheduled_date: Date, status: MaintenanceStatus) -> Self {
        Self {
            id: id.into(),
            scheduled_date,
            status,
            equipment: EquipmentRef::default(),
            priority: None,
            maintenance_type: String::new(),
        }
    }
}
