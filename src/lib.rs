//! EquipTrack: equipment maintenance and calibration tracking
//!
//! REST JSON API recording production, testing and packaging equipment,
//! computing when calibration and maintenance fall due and serving
//! role-specific dashboards to administrators, maintenance staff and
//! quality engineers.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schedule;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
