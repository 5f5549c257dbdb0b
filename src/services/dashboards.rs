//! Role dashboards

use crate::{
    config::TrackingConfig,
    error::AppResult,
    models::{
        dashboard::{AdminDashboard, DashboardHeader, DashboardRoute, DefaultDashboard, MaintenanceDashboard, QualityDashboard},
        equipment::EquipmentFilter,
        user::Role,
    },
    repository::equipment::EquipmentOrder,
    schedule::summary::{self, AdminTotals},
};

use super::{equipment::EquipmentService, users::UsersService};

#[derive(Clone)]
pub struct DashboardsService {
    equipment: EquipmentService,
    users: UsersService,
    config: TrackingConfig,
}

impl DashboardsService {
    pub fn new(equipment: EquipmentService, users: UsersService, config: TrackingConfig) -> Self {
        Self { equipment, users, config }
    }

    pub fn route(&self, role: Role) -> DashboardRoute {
        DashboardRoute::for_role(role)
    }

    pub fn default_dashboard(&self, role: Role) -> DefaultDashboard {
        DefaultDashboard {
            header: DashboardHeader::for_role(role),
        }
    }

    pub async fn admin(&self, filter: &EquipmentFilter) -> AppResult<AdminDashboard> {
        let evaluated = self.equipment.evaluate(filter, EquipmentOrder::MachineName).await?;
        let totals = AdminTotals {
            users: self.users.count_profiles().await?,
            equipment: self.equipment.count().await?,
        };
        Ok(summary::admin_dashboard(evaluated, filter, totals, self.config.admin_preview_limit))
    }

    pub async fn maintenance(&self, filter: &EquipmentFilter) -> AppResult<MaintenanceDashboard> {
        let window = self.equipment.window();
        let evaluated = self.equipment.evaluate(filter, EquipmentOrder::MachineName).await?;
        let all = if filter.has_filters() {
            self.equipment.evaluate_all().await?
        } else {
            evaluated.clone()
        };
        Ok(summary::maintenance_dashboard(evaluated, &all, filter, &window))
    }

    pub async fn quality(&self, filter: &EquipmentFilter) -> AppResult<QualityDashboard> {
        let evaluated = self.equipment.evaluate(filter, EquipmentOrder::MachineName).await?;
        let total = self.equipment.count().await?;
        Ok(summary::quality_dashboard(evaluated, filter, total, self.config.quality_preview_limit))
    }
}
