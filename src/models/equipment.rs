//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{MachineType, ProcedureKind};
use crate::{
    error::{AppError, AppResult},
    schedule::{DueStatus, DueWindow, EquipmentStatus, ScheduleStatus, StatusFilter},
};

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    /// Unique machine identifier (upper case)
    pub machine_id: String,
    /// Name / description of the machine
    pub machine_name: String,
    pub machine_type: MachineType,
    /// Physical location of the machine
    pub machine_location: String,
    pub last_calibration_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    /// Days between calibrations
    pub calibration_interval_days: i32,
    /// Days between maintenance
    pub maintenance_interval_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// User who registered the machine
    pub created_by: Option<i32>,
}

impl Equipment {
    pub fn calibration_status(&self, window: &DueWindow) -> ScheduleStatus {
        window.schedule(self.last_calibration_date, self.calibration_interval_days)
    }

    pub fn maintenance_status(&self, window: &DueWindow) -> ScheduleStatus {
        window.schedule(self.last_maintenance_date, self.maintenance_interval_days)
    }

    pub fn status(&self, window: &DueWindow) -> EquipmentStatus {
        EquipmentStatus::new(self.calibration_status(window), self.maintenance_status(window))
    }

    pub fn with_status(self, window: &DueWindow) -> EquipmentWithStatus {
        let status = self.status(window);
        EquipmentWithStatus {
            equipment: self,
            calibration: status.calibration,
            maintenance: status.maintenance,
            status: status.overall,
        }
    }
}

/// Equipment together with its computed schedules
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentWithStatus {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub calibration: ScheduleStatus,
    pub maintenance: ScheduleStatus,
    /// Combined status of both schedules
    pub status: DueStatus,
}

impl EquipmentWithStatus {
    pub fn schedule_status(&self) -> EquipmentStatus {
        EquipmentStatus {
            calibration: self.calibration,
            maintenance: self.maintenance,
            overall: self.status,
        }
    }
}

/// Compact status row used by the status listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentStatusSummary {
    pub machine_id: String,
    pub machine_name: String,
    pub machine_type: MachineType,
    pub machine_location: String,
    pub maintenance_status: DueStatus,
    pub calibration_status: DueStatus,
    pub next_maintenance_date: Option<NaiveDate>,
    pub next_calibration_date: Option<NaiveDate>,
}

impl From<&EquipmentWithStatus> for EquipmentStatusSummary {
    fn from(e: &EquipmentWithStatus) -> Self {
        EquipmentStatusSummary {
            machine_id: e.equipment.machine_id.clone(),
            machine_name: e.equipment.machine_name.clone(),
            machine_type: e.equipment.machine_type,
            machine_location: e.equipment.machine_location.clone(),
            maintenance_status: e.maintenance.status,
            calibration_status: e.calibration.status,
            next_maintenance_date: e.maintenance.next_date,
            next_calibration_date: e.calibration.next_date,
        }
    }
}

/// Search, type and status filters shared by dashboards and listings
///
/// An empty `machine_type` or `status` means "all".
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentFilter {
    /// Case-insensitive search in machine id, name and location
    pub search: Option<String>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub machine_type: Option<MachineType>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub status: Option<StatusFilter>,
}

impl EquipmentFilter {
    /// Trimmed search term, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status.unwrap_or_default()
    }

    pub fn has_filters(&self) -> bool {
        self.search_term().is_some()
            || self.machine_type.is_some()
            || self.status_filter() != StatusFilter::All
    }
}

/// Equipment list query parameters
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    pub search: Option<String>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub machine_type: Option<MachineType>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub status: Option<StatusFilter>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl EquipmentQuery {
    pub fn filter(&self) -> EquipmentFilter {
        EquipmentFilter {
            search: self.search.clone(),
            machine_type: self.machine_type,
            status: self.status,
        }
    }
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 50, message = "Machine ID is required (max 50 characters)"))]
    pub machine_id: String,
    #[validate(length(min = 1, max = 200, message = "Machine name is required (max 200 characters)"))]
    pub machine_name: String,
    pub machine_type: Option<MachineType>,
    #[validate(length(min = 1, max = 200, message = "Location is required (max 200 characters)"))]
    pub machine_location: String,
    pub last_calibration_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Calibration interval must be at least 1 day"))]
    pub calibration_interval_days: Option<i32>,
    #[validate(range(min = 1, message = "Maintenance interval must be at least 1 day"))]
    pub maintenance_interval_days: Option<i32>,
}

impl CreateEquipment {
    /// Machine identifiers are stored upper case
    pub fn normalized_machine_id(&self) -> String {
        normalize_machine_id(&self.machine_id)
    }

    pub fn check_dates(&self, today: NaiveDate) -> AppResult<()> {
        ensure_not_future(self.last_calibration_date, today, "Calibration")?;
        ensure_not_future(self.last_maintenance_date, today, "Maintenance")
    }

    /// Required text fields must hold more than whitespace
    pub fn check_fields(&self) -> AppResult<()> {
        ensure_not_blank(Some(&self.machine_id), "Machine ID is required.")?;
        ensure_not_blank(Some(&self.machine_name), "Machine name is required.")?;
        ensure_not_blank(Some(&self.machine_location), "Location is required.")
    }
}

/// Update equipment request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 200, message = "Machine name is required (max 200 characters)"))]
    pub machine_name: Option<String>,
    pub machine_type: Option<MachineType>,
    #[validate(length(min = 1, max = 200, message = "Location is required (max 200 characters)"))]
    pub machine_location: Option<String>,
    pub last_calibration_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Calibration interval must be at least 1 day"))]
    pub calibration_interval_days: Option<i32>,
    #[validate(range(min = 1, message = "Maintenance interval must be at least 1 day"))]
    pub maintenance_interval_days: Option<i32>,
}

impl UpdateEquipment {
    pub fn check_dates(&self, today: NaiveDate) -> AppResult<()> {
        ensure_not_future(self.last_calibration_date, today, "Calibration")?;
        ensure_not_future(self.last_maintenance_date, today, "Maintenance")
    }

    /// Provided text fields must hold more than whitespace
    pub fn check_fields(&self) -> AppResult<()> {
        ensure_not_blank(self.machine_name.as_deref(), "Machine name is required.")?;
        ensure_not_blank(self.machine_location.as_deref(), "Location is required.")
    }

    pub fn is_empty(&self) -> bool {
        self.machine_name.is_none()
            && self.machine_type.is_none()
            && self.machine_location.is_none()
            && self.last_calibration_date.is_none()
            && self.last_maintenance_date.is_none()
            && self.calibration_interval_days.is_none()
            && self.maintenance_interval_days.is_none()
    }
}

/// Mark a calibration or maintenance procedure as done
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteProcedure {
    pub procedure_type: ProcedureKind,
    /// Defaults to today
    pub completion_date: Option<NaiveDate>,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl CompleteProcedure {
    pub fn resolved_date(&self, today: NaiveDate) -> AppResult<NaiveDate> {
        let date = self.completion_date.unwrap_or(today);
        ensure_not_future(Some(date), today, "Completion")?;
        Ok(date)
    }
}

/// Result of a completed procedure
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcedureCompleted {
    pub machine_id: String,
    pub procedure_type: ProcedureKind,
    pub completion_date: NaiveDate,
    pub next_due_date: Option<NaiveDate>,
    pub message: String,
    pub equipment: EquipmentWithStatus,
}

/// Machine identifiers are case-insensitive and stored upper case
pub fn normalize_machine_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn ensure_not_blank(value: Option<&str>, message: &str) -> AppResult<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::Validation(message.to_string())),
        _ => Ok(()),
    }
}

fn ensure_not_future(date: Option<NaiveDate>, today: NaiveDate, what: &str) -> AppResult<()> {
    match date {
        Some(d) if d > today => Err(AppError::Validation(format!(
            "{} date cannot be in the future.",
            what
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    /// Equipment whose last dates are `cal_ago` / `maint_ago` days before [`today`]
    pub(crate) fn equipment(id: &str, cal_ago: Option<i64>, maint_ago: Option<i64>) -> Equipment {
        let now = Utc::now();
        Equipment {
            machine_id: id.to_string(),
            machine_name: format!("Machine {}", id),
            machine_type: MachineType::Production,
            machine_location: "Floor A".to_string(),
            last_calibration_date: cal_ago.map(|d| today() - Duration::days(d)),
            last_maintenance_date: maint_ago.map(|d| today() - Duration::days(d)),
            calibration_interval_days: 365,
            maintenance_interval_days: 90,
            created_at: now,
            updated_at: now,
            created_by: None,
        }
    }

    #[test]
    fn test_with_status() {
        let window = DueWindow::new(today(), 14);
        let e = equipment("CNC-1", Some(400), Some(80)).with_status(&window);
        assert_eq!(e.calibration.status, DueStatus::Overdue);
        assert_eq!(e.maintenance.status, DueStatus::DueSoon);
        assert_eq!(e.maintenance.next_date, Some(today() + Duration::days(10)));
        assert_eq!(e.status, DueStatus::Overdue);
    }

    #[test]
    fn test_serialized_shape() {
        let window = DueWindow::new(today(), 14);
        let e = equipment("CNC-1", None, Some(10)).with_status(&window);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["machine_id"], "CNC-1");
        assert_eq!(json["machine_type"], "PRODUCTION");
        assert_eq!(json["calibration"]["status"], "no_data");
        assert_eq!(json["maintenance"]["next_date"], "2027-01-03");
        assert_eq!(json["status"], "compliant");
    }

    #[test]
    fn test_normalized_machine_id() {
        let req = CreateEquipment {
            machine_id: " mch-001 ".into(),
            machine_name: "Press".into(),
            machine_type: None,
            machine_location: "Line 1".into(),
            last_calibration_date: None,
            last_maintenance_date: None,
            calibration_interval_days: None,
            maintenance_interval_days: None,
        };
        assert_eq!(req.normalized_machine_id(), "MCH-001");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_future_dates_rejected() {
        let update = UpdateEquipment {
            last_calibration_date: Some(today() + Duration::days(1)),
            ..Default::default()
        };
        assert!(matches!(update.check_dates(today()), Err(AppError::Validation(_))));

        let update = UpdateEquipment {
            last_maintenance_date: Some(today()),
            ..Default::default()
        };
        assert!(update.check_dates(today()).is_ok());
    }

    #[test]
    fn test_interval_must_be_positive() {
        let update = UpdateEquipment {
            maintenance_interval_days: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateEquipment::default().is_empty());
    }

    #[test]
    fn test_completion_date() {
        let req = CompleteProcedure {
            procedure_type: ProcedureKind::Calibration,
            completion_date: None,
            notes: None,
        };
        assert_eq!(req.resolved_date(today()).unwrap(), today());

        let req = CompleteProcedure {
            procedure_type: ProcedureKind::Maintenance,
            completion_date: Some(today() + Duration::days(3)),
            notes: None,
        };
        assert!(req.resolved_date(today()).is_err());
    }

    fn create_request() -> CreateEquipment {
        CreateEquipment {
            machine_id: "MCH-001".into(),
            machine_name: "Press".into(),
            machine_type: None,
            machine_location: "Line 1".into(),
            last_calibration_date: None,
            last_maintenance_date: None,
            calibration_interval_days: None,
            maintenance_interval_days: None,
        }
    }

    #[test]
    fn test_blank_create_fields_rejected() {
        assert!(create_request().check_fields().is_ok());

        let mut req = create_request();
        req.machine_id = "   ".into();
        assert!(req.validate().is_ok());
        assert!(matches!(req.check_fields(), Err(AppError::Validation(m)) if m == "Machine ID is required."));

        let mut req = create_request();
        req.machine_name = "   ".into();
        assert!(matches!(req.check_fields(), Err(AppError::Validation(m)) if m == "Machine name is required."));

        let mut req = create_request();
        req.machine_location = " \t ".into();
        assert!(matches!(req.check_fields(), Err(AppError::Validation(m)) if m == "Location is required."));
    }

    #[test]
    fn test_blank_update_fields_rejected() {
        let update = UpdateEquipment {
            machine_name: Some("   ".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert!(matches!(update.check_fields(), Err(AppError::Validation(_))));

        let update = UpdateEquipment {
            machine_location: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(update.check_fields(), Err(AppError::Validation(_))));

        let update = UpdateEquipment {
            machine_name: Some(" Press 2 ".into()),
            ..Default::default()
        };
        assert!(update.check_fields().is_ok());
        assert!(UpdateEquipment::default().check_fields().is_ok());
    }

    #[test]
    fn test_empty_query_values_mean_all() {
        let uri: axum::http::Uri = "/equipment?search=press&machine_type=&status=".parse().unwrap();
        let axum::extract::Query(query) = axum::extract::Query::<EquipmentQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.machine_type, None);
        assert_eq!(query.status, None);
        assert_eq!(query.filter().search_term(), Some("press"));

        let uri: axum::http::Uri = "/dashboards/admin?machine_type=testing&status=due_soon".parse().unwrap();
        let axum::extract::Query(filter) = axum::extract::Query::<EquipmentFilter>::try_from_uri(&uri).unwrap();
        assert_eq!(filter.machine_type, Some(MachineType::Testing));
        assert_eq!(filter.status, Some(StatusFilter::DueSoon));

        let uri: axum::http::Uri = "/dashboards/admin".parse().unwrap();
        let axum::extract::Query(filter) = axum::extract::Query::<EquipmentFilter>::try_from_uri(&uri).unwrap();
        assert!(!filter.has_filters());

        let uri: axum::http::Uri = "/dashboards/admin?status=late".parse().unwrap();
        assert!(axum::extract::Query::<EquipmentFilter>::try_from_uri(&uri).is_err());
    }

    #[test]
    fn test_filter_flags() {
        let mut filter = EquipmentFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filter.search_term(), None);
        assert!(!filter.has_filters());

        filter.status = Some(StatusFilter::DueSoon);
        assert!(filter.has_filters());
    }
}
