//! Aggregation of equipment statuses into dashboards and reports

use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::{DueWindow, EquipmentStatus};
use crate::models::{
    dashboard::{
        AdminDashboard, DashboardHeader, MaintenanceDashboard, QualityDashboard, StatusStats,
        UpcomingTasks,
    },
    equipment::{EquipmentFilter, EquipmentWithStatus},
    user::Role,
};

/// Status filter accepted by dashboards and the equipment list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    /// Either schedule overdue
    Overdue,
    OverdueMaintenance,
    OverdueCalibration,
    /// Either schedule due soon
    DueSoon,
    /// Neither overdue nor due soon
    Compliant,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Overdue => "overdue",
            StatusFilter::OverdueMaintenance => "overdue_maintenance",
            StatusFilter::OverdueCalibration => "overdue_calibration",
            StatusFilter::DueSoon => "due_soon",
            StatusFilter::Compliant => "compliant",
        }
    }

    pub fn matches(&self, status: &EquipmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Overdue => status.is_overdue(),
            StatusFilter::OverdueMaintenance => status.maintenance.is_overdue,
            StatusFilter::OverdueCalibration => status.calibration.is_overdue,
            StatusFilter::DueSoon => status.is_due_soon(),
            StatusFilter::Compliant => status.is_compliant(),
        }
    }

    pub fn apply(&self, items: Vec<EquipmentWithStatus>) -> Vec<EquipmentWithStatus> {
        items
            .into_iter()
            .filter(|e| self.matches(&e.schedule_status()))
            .collect()
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "overdue" => Ok(StatusFilter::Overdue),
            "overdue_maintenance" => Ok(StatusFilter::OverdueMaintenance),
            "overdue_calibration" => Ok(StatusFilter::OverdueCalibration),
            "due_soon" => Ok(StatusFilter::DueSoon),
            "compliant" => Ok(StatusFilter::Compliant),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}

/// Equipment split by schedule status; a record may land in several lists
#[derive(Debug, Default)]
pub struct StatusPartition {
    pub overdue_maintenance: Vec<EquipmentWithStatus>,
    pub overdue_calibration: Vec<EquipmentWithStatus>,
    pub due_soon_maintenance: Vec<EquipmentWithStatus>,
    pub due_soon_calibration: Vec<EquipmentWithStatus>,
    /// Records with at least one schedule due soon, each listed once
    pub due_soon: Vec<EquipmentWithStatus>,
    pub compliant: Vec<EquipmentWithStatus>,
}

impl StatusPartition {
    pub fn of(items: &[EquipmentWithStatus]) -> Self {
        let mut partition = Self::default();
        for item in items {
            let status = item.schedule_status();
            if status.maintenance.is_overdue {
                partition.overdue_maintenance.push(item.clone());
            } else if status.maintenance.is_due_soon() {
                partition.due_soon_maintenance.push(item.clone());
            }
            if status.calibration.is_overdue {
                partition.overdue_calibration.push(item.clone());
            } else if status.calibration.is_due_soon() {
                partition.due_soon_calibration.push(item.clone());
            }
            if status.is_due_soon() {
                partition.due_soon.push(item.clone());
            }
            if status.is_compliant() {
                partition.compliant.push(item.clone());
            }
        }
        partition
    }
}

/// Percentage rounded to one decimal, 0 for an empty set
pub fn compliance_percentage(compliant: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = compliant as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

fn preview(items: &[EquipmentWithStatus], limit: usize) -> Vec<EquipmentWithStatus> {
    items.iter().take(limit).cloned().collect()
}

pub struct AdminTotals {
    pub users: i64,
    pub equipment: i64,
}

/// `evaluated` is the equipment left after search and type filtering
pub fn admin_dashboard(
    evaluated: Vec<EquipmentWithStatus>,
    filter: &EquipmentFilter,
    totals: AdminTotals,
    preview_limit: usize,
) -> AdminDashboard {
    let partition = StatusPartition::of(&evaluated);
    let filtered = filter.status_filter().apply(evaluated);

    AdminDashboard {
        header: DashboardHeader::for_role(Role::Administrator),
        total_users: totals.users,
        total_equipment: totals.equipment,
        filtered_equipment_count: filtered.len(),
        overdue_maintenance_count: partition.overdue_maintenance.len(),
        overdue_calibration_count: partition.overdue_calibration.len(),
        due_soon_count: partition.due_soon.len(),
        overdue_maintenance: preview(&partition.overdue_maintenance, preview_limit),
        overdue_calibration: preview(&partition.overdue_calibration, preview_limit),
        due_soon: preview(&partition.due_soon, preview_limit),
        search: filter.search_term().map(str::to_string),
        filtered_equipment: filtered,
        has_filters: filter.has_filters(),
    }
}

/// `all` is the unfiltered fleet, used for the due-within-window lists
pub fn maintenance_dashboard(
    evaluated: Vec<EquipmentWithStatus>,
    all: &[EquipmentWithStatus],
    filter: &EquipmentFilter,
    window: &DueWindow,
) -> MaintenanceDashboard {
    let partition = StatusPartition::of(&evaluated);
    let filtered = filter.status_filter().apply(evaluated);

    let due_calibration = all
        .iter()
        .filter(|e| e.calibration.is_due_within_window())
        .cloned()
        .collect();
    let due_maintenance = all
        .iter()
        .filter(|e| e.maintenance.is_due_within_window())
        .cloned()
        .collect();

    MaintenanceDashboard {
        header: DashboardHeader::for_role(Role::Maintenance),
        total_equipment: all.len() as i64,
        filtered_equipment_count: filtered.len(),
        overdue_maintenance_count: partition.overdue_maintenance.len(),
        overdue_calibration_count: partition.overdue_calibration.len(),
        due_soon_maintenance_count: partition.due_soon_maintenance.len(),
        due_soon_calibration_count: partition.due_soon_calibration.len(),
        overdue_maintenance: partition.overdue_maintenance,
        due_soon_maintenance: partition.due_soon_maintenance,
        overdue_calibration: partition.overdue_calibration,
        due_soon_calibration: partition.due_soon_calibration,
        search: filter.search_term().map(str::to_string),
        filtered_equipment: filtered,
        has_filters: filter.has_filters(),
        due_calibration,
        due_maintenance,
        today: window.today,
    }
}

pub fn quality_dashboard(
    evaluated: Vec<EquipmentWithStatus>,
    filter: &EquipmentFilter,
    total_equipment: i64,
    preview_limit: usize,
) -> QualityDashboard {
    let partition = StatusPartition::of(&evaluated);
    let evaluated_count = evaluated.len();
    let filtered = filter.status_filter().apply(evaluated);

    QualityDashboard {
        header: DashboardHeader::for_role(Role::Quality),
        total_equipment,
        filtered_equipment_count: filtered.len(),
        overdue_maintenance_count: partition.overdue_maintenance.len(),
        overdue_calibration_count: partition.overdue_calibration.len(),
        due_soon_count: partition.due_soon.len(),
        compliant_count: partition.compliant.len(),
        compliance_percentage: compliance_percentage(partition.compliant.len(), evaluated_count),
        overdue_maintenance: preview(&partition.overdue_maintenance, preview_limit),
        overdue_calibration: preview(&partition.overdue_calibration, preview_limit),
        due_soon: preview(&partition.due_soon, preview_limit),
        search: filter.search_term().map(str::to_string),
        filtered_equipment: filtered,
        has_filters: filter.has_filters(),
    }
}

pub fn status_stats(all: &[EquipmentWithStatus]) -> StatusStats {
    let partition = StatusPartition::of(all);
    StatusStats {
        total_equipment: all.len(),
        overdue_maintenance: partition.overdue_maintenance.len(),
        overdue_calibration: partition.overdue_calibration.len(),
        due_soon_maintenance: partition.due_soon_maintenance.len(),
        due_soon_calibration: partition.due_soon_calibration.len(),
        compliant: partition.compliant.len(),
        compliance_percentage: compliance_percentage(partition.compliant.len(), all.len()),
    }
}

/// Buckets every schedule with a next date: overdue, due within 7 days,
/// due within 14 days (independent of the due-soon window)
pub fn upcoming_tasks(all: &[EquipmentWithStatus], window: &DueWindow) -> UpcomingTasks {
    let week = window.today + Duration::days(7);
    let fortnight = window.today + Duration::days(14);
    let mut tasks = UpcomingTasks::default();

    let next_dates = all
        .iter()
        .flat_map(|e| [e.calibration.next_date, e.maintenance.next_date])
        .flatten();

    for next in next_dates {
        if next < window.today {
            tasks.overdue += 1;
        } else if next <= week {
            tasks.due_this_week += 1;
        } else if next <= fortnight {
            tasks.due_next_week += 1;
        }
    }
    tasks
}
