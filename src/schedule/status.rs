//! Due-date arithmetic for calibration and maintenance schedules
//!
//! Everything here is a pure function of the last service date, the interval
//! and a reference day, so callers decide what "today" is.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default number of days ahead of a due date that counts as "due soon"
pub const DEFAULT_DUE_SOON_DAYS: i64 = 14;

/// Status of a single schedule (or of a whole equipment record)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    /// Today is past the next due date
    Overdue,
    /// Next due date falls within the due-soon window (today included)
    DueSoon,
    /// Next due date is further away than the window
    Compliant,
    /// No last service date recorded
    NoData,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Overdue => "overdue",
            DueStatus::DueSoon => "due_soon",
            DueStatus::Compliant => "compliant",
            DueStatus::NoData => "no_data",
        }
    }
}

impl std::fmt::Display for DueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next due date: last service date plus the interval, if a last date exists
pub fn next_due_date(last_date: Option<NaiveDate>, interval_days: i32) -> Option<NaiveDate> {
    last_date.and_then(|d| d.checked_add_signed(Duration::days(i64::from(interval_days))))
}

/// Reference day plus the width of the due-soon window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub today: NaiveDate,
    pub days: i64,
}

impl DueWindow {
    pub fn new(today: NaiveDate, days: i64) -> Self {
        Self { today, days }
    }

    /// Window anchored on the current UTC date
    pub fn current(days: i64) -> Self {
        Self::new(Utc::now().date_naive(), days)
    }

    /// Last day still considered "due soon"
    pub fn horizon(&self) -> NaiveDate {
        self.today + Duration::days(self.days)
    }

    pub fn classify(&self, next_due: Option<NaiveDate>) -> DueStatus {
        let Some(next) = next_due else {
            return DueStatus::NoData;
        };
        if next < self.today {
            DueStatus::Overdue
        } else if next <= self.horizon() {
            DueStatus::DueSoon
        } else {
            DueStatus::Compliant
        }
    }

    pub fn schedule(&self, last_date: Option<NaiveDate>, interval_days: i32) -> ScheduleStatus {
        let next_date = next_due_date(last_date, interval_days);
        let status = self.classify(next_date);
        ScheduleStatus {
            last_date,
            interval_days,
            next_date,
            days_until: next_date.map(|d| (d - self.today).num_days()),
            is_overdue: status == DueStatus::Overdue,
            status,
        }
    }
}

/// Computed state of one schedule (calibration or maintenance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleStatus {
    pub last_date: Option<NaiveDate>,
    pub interval_days: i32,
    pub next_date: Option<NaiveDate>,
    /// Days until the next due date, negative when overdue
    pub days_until: Option<i64>,
    pub is_overdue: bool,
    pub status: DueStatus,
}

impl ScheduleStatus {
    pub fn is_due_soon(&self) -> bool {
        self.status == DueStatus::DueSoon
    }

    /// Next due date no later than the window horizon, overdue included
    pub fn is_due_within_window(&self) -> bool {
        matches!(self.status, DueStatus::Overdue | DueStatus::DueSoon)
    }
}

/// Both schedules of an equipment record plus the combined status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentStatus {
    pub calibration: ScheduleStatus,
    pub maintenance: ScheduleStatus,
    pub overall: DueStatus,
}

impl EquipmentStatus {
    pub fn new(calibration: ScheduleStatus, maintenance: ScheduleStatus) -> Self {
        let overall = if calibration.is_overdue || maintenance.is_overdue {
            DueStatus::Overdue
        } else if calibration.is_due_soon() || maintenance.is_due_soon() {
            DueStatus::DueSoon
        } else if calibration.status == DueStatus::NoData && maintenance.status == DueStatus::NoData {
            DueStatus::NoData
        } else {
            DueStatus::Compliant
        };
        Self {
            calibration,
            maintenance,
            overall,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.overall == DueStatus::Overdue
    }

    /// At least one schedule is due soon, regardless of the other one
    pub fn is_due_soon(&self) -> bool {
        self.calibration.is_due_soon() || self.maintenance.is_due_soon()
    }

    /// Neither overdue nor due soon; records without data count as compliant
    pub fn is_compliant(&self) -> bool {
        !self.is_overdue() && !self.is_due_soon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DueWindow {
        DueWindow::new(day(2026, 10, 15), DEFAULT_DUE_SOON_DAYS)
    }

    #[test]
    fn test_next_due_date() {
        assert_eq!(next_due_date(Some(day(2026, 1, 1)), 90), Some(day(2026, 4, 1)));
        assert_eq!(next_due_date(Some(day(2024, 2, 28)), 1), Some(day(2024, 2, 29)));
        assert_eq!(next_due_date(None, 365), None);
    }

    #[test]
    fn test_calibration_overdue() {
        let w = window();
        let last = w.today - Duration::days(400);
        let s = w.schedule(Some(last), 365);
        assert_eq!(s.status, DueStatus::Overdue);
        assert!(s.is_overdue);
        assert_eq!(s.days_until, Some(-35));
    }

    #[test]
    fn test_maintenance_due_soon() {
        let w = window();
        let last = w.today - Duration::days(80);
        let s = w.schedule(Some(last), 90);
        assert_eq!(s.next_date, Some(w.today + Duration::days(10)));
        assert_eq!(s.status, DueStatus::DueSoon);
        assert!(!s.is_overdue);
        assert_eq!(s.days_until, Some(10));
    }

    #[test]
    fn test_window_boundaries() {
        let w = window();
        assert_eq!(w.classify(Some(w.today)), DueStatus::DueSoon);
        assert_eq!(w.classify(Some(w.today - Duration::days(1))), DueStatus::Overdue);
        assert_eq!(w.classify(Some(w.horizon())), DueStatus::DueSoon);
        assert_eq!(w.classify(Some(w.horizon() + Duration::days(1))), DueStatus::Compliant);
        assert_eq!(w.classify(None), DueStatus::NoData);
    }

    #[test]
    fn test_no_data_is_never_overdue() {
        let s = window().schedule(None, 90);
        assert_eq!(s.status, DueStatus::NoData);
        assert!(!s.is_overdue);
        assert_eq!(s.next_date, None);
        assert_eq!(s.days_until, None);
        assert!(!s.is_due_within_window());
    }

    #[test]
    fn test_overall_status() {
        let w = window();
        let overdue = w.schedule(Some(w.today - Duration::days(100)), 90);
        let soon = w.schedule(Some(w.today - Duration::days(85)), 90);
        let fine = w.schedule(Some(w.today), 90);
        let none = w.schedule(None, 90);

        assert_eq!(EquipmentStatus::new(overdue, fine).overall, DueStatus::Overdue);
        assert_eq!(EquipmentStatus::new(fine, soon).overall, DueStatus::DueSoon);
        assert_eq!(EquipmentStatus::new(none, fine).overall, DueStatus::Compliant);
        assert_eq!(EquipmentStatus::new(none, none).overall, DueStatus::NoData);

        let mixed = EquipmentStatus::new(soon, overdue);
        assert_eq!(mixed.overall, DueStatus::Overdue);
        assert!(mixed.is_due_soon());
        assert!(!mixed.is_compliant());
        assert!(EquipmentStatus::new(none, none).is_compliant());
    }

    #[test]
    fn test_custom_window() {
        let w = DueWindow::new(day(2026, 10, 15), 7);
        assert_eq!(w.classify(Some(day(2026, 10, 22))), DueStatus::DueSoon);
        assert_eq!(w.classify(Some(day(2026, 10, 23))), DueStatus::Compliant);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&DueStatus::DueSoon).unwrap(), "\"due_soon\"");
        assert_eq!(DueStatus::NoData.to_string(), "no_data");
    }
}
