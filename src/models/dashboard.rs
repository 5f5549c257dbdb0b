//! Dashboard and status report payloads

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{equipment::EquipmentWithStatus, user::Role};

/// Headings shown on top of every dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardHeader {
    pub user_role: String,
    pub page_title: String,
    pub page_subtitle: String,
    pub welcome_message: String,
}

impl DashboardHeader {
    pub fn for_role(role: Role) -> Self {
        let (title, subtitle, welcome) = match role {
            Role::Administrator => (
                "Administrator Dashboard",
                "Complete system administration and management",
                "You have full administrative access to the system.",
            ),
            Role::Maintenance => (
                "Maintenance Dashboard",
                "Track and complete maintenance and calibration tasks",
                "Review your assigned tasks and equipment due for maintenance.",
            ),
            Role::Quality => (
                "Quality Dashboard",
                "Monitor compliance and ensure all procedures are up to date",
                "Review equipment compliance and generate quality reports.",
            ),
            Role::Unassigned => (
                "Dashboard",
                "Welcome to the Maintenance & Calibration System",
                "Please contact your administrator to assign you a role.",
            ),
        };
        Self {
            user_role: role.label().to_string(),
            page_title: title.to_string(),
            page_subtitle: subtitle.to_string(),
            welcome_message: welcome.to_string(),
        }
    }
}

/// Which dashboard a user should land on
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardRoute {
    pub role: Role,
    /// API path of the dashboard, relative to the API root
    pub dashboard: String,
}

impl DashboardRoute {
    pub fn for_role(role: Role) -> Self {
        let dashboard = match role {
            Role::Administrator => "/dashboards/admin",
            Role::Maintenance => "/dashboards/maintenance",
            Role::Quality => "/dashboards/quality",
            Role::Unassigned => "/dashboards/default",
        };
        Self {
            role,
            dashboard: dashboard.to_string(),
        }
    }
}

/// Dashboard for accounts without a role
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefaultDashboard {
    #[serde(flatten)]
    pub header: DashboardHeader,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub header: DashboardHeader,
    pub total_users: i64,
    pub total_equipment: i64,
    pub filtered_equipment_count: usize,
    pub overdue_maintenance_count: usize,
    pub overdue_calibration_count: usize,
    pub due_soon_count: usize,
    /// First entries only
    pub overdue_maintenance: Vec<EquipmentWithStatus>,
    pub overdue_calibration: Vec<EquipmentWithStatus>,
    pub due_soon: Vec<EquipmentWithStatus>,
    pub search: Option<String>,
    pub filtered_equipment: Vec<EquipmentWithStatus>,
    pub has_filters: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaintenanceDashboard {
    #[serde(flatten)]
    pub header: DashboardHeader,
    pub total_equipment: i64,
    pub filtered_equipment_count: usize,
    pub overdue_maintenance: Vec<EquipmentWithStatus>,
    pub due_soon_maintenance: Vec<EquipmentWithStatus>,
    pub overdue_calibration: Vec<EquipmentWithStatus>,
    pub due_soon_calibration: Vec<EquipmentWithStatus>,
    pub overdue_maintenance_count: usize,
    pub overdue_calibration_count: usize,
    pub due_soon_maintenance_count: usize,
    pub due_soon_calibration_count: usize,
    pub search: Option<String>,
    pub filtered_equipment: Vec<EquipmentWithStatus>,
    pub has_filters: bool,
    /// All equipment with calibration due within the window, overdue included
    pub due_calibration: Vec<EquipmentWithStatus>,
    /// All equipment with maintenance due within the window, overdue included
    pub due_maintenance: Vec<EquipmentWithStatus>,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QualityDashboard {
    #[serde(flatten)]
    pub header: DashboardHeader,
    pub total_equipment: i64,
    pub filtered_equipment_count: usize,
    pub overdue_maintenance_count: usize,
    pub overdue_calibration_count: usize,
    pub due_soon_count: usize,
    pub compliant_count: usize,
    /// Percentage of compliant equipment, one decimal
    pub compliance_percentage: f64,
    pub overdue_maintenance: Vec<EquipmentWithStatus>,
    pub overdue_calibration: Vec<EquipmentWithStatus>,
    pub due_soon: Vec<EquipmentWithStatus>,
    pub search: Option<String>,
    pub filtered_equipment: Vec<EquipmentWithStatus>,
    pub has_filters: bool,
}

/// Fleet-wide status counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct StatusStats {
    pub total_equipment: usize,
    pub overdue_maintenance: usize,
    pub overdue_calibration: usize,
    pub due_soon_maintenance: usize,
    pub due_soon_calibration: usize,
    pub compliant: usize,
    pub compliance_percentage: f64,
}

/// Upcoming tasks bucketed by due date, two schedules per machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UpcomingTasks {
    pub overdue: usize,
    pub due_this_week: usize,
    pub due_next_week: usize,
}
