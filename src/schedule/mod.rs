//! Calibration and maintenance scheduling: due-date status and fleet summaries

pub mod status;
pub mod summary;

pub use status::{next_due_date, DueStatus, DueWindow, EquipmentStatus, ScheduleStatus};
pub use summary::{StatusFilter, StatusPartition};
