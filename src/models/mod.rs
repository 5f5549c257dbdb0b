//! Data models for EquipTrack

pub mod dashboard;
pub mod enums;
pub mod equipment;
pub mod user;

// Re-export commonly used types
pub use enums::{MachineType, ProcedureKind};
pub use equipment::{Equipment, EquipmentWithStatus};
pub use user::{Role, User, UserProfile};
