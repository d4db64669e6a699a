mod cell;
mod record;

pub use cell::CalendarCell;
pub use record::{
    EquipmentRef, MaintenanceRecord, MaintenanceStatus, Priority, RawMaintenanceRecord, RecordId,
};
