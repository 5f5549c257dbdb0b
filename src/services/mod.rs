//! Business logic services

pub mod dashboards;
pub mod equipment;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub dashboards: dashboards::DashboardsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let users = users::UsersService::new(repository.clone(), config.auth.clone(), config.users.clone());
        let equipment = equipment::EquipmentService::new(repository, config.tracking.clone());
        let dashboards =
            dashboards::DashboardsService::new(equipment.clone(), users.clone(), config.tracking.clone());

        Self {
            users,
            equipment,
            dashboards,
        }
    }
}
