//! Equipment service: records, procedures and status views

use validator::Validate;

use crate::{
    config::TrackingConfig,
    error::{AppError, AppResult},
    models::{
        dashboard::{StatusStats, UpcomingTasks},
        enums::ProcedureKind,
        equipment::{
            CompleteProcedure, CreateEquipment, Equipment, EquipmentFilter, EquipmentQuery, EquipmentStatusSummary,
            normalize_machine_id, EquipmentWithStatus, ProcedureCompleted, UpdateEquipment,
        },
    },
    repository::{
        equipment::{EquipmentOrder, NewEquipment},
        Repository,
    },
    schedule::{summary, DueWindow},
};

/// One page of a listing
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Slice `items` to the requested page, clamping out-of-range pages to the last one
pub fn paginate<T>(items: Vec<T>, page: Option<i64>, per_page: i64) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len() as i64;
    let last_page = ((total + per_page - 1) / per_page).max(1);
    let page = page.unwrap_or(1).clamp(1, last_page);
    let start = ((page - 1) * per_page) as usize;

    Page {
        items: items.into_iter().skip(start).take(per_page as usize).collect(),
        total,
        page,
        per_page,
    }
}

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    config: TrackingConfig,
}

impl EquipmentService {
    pub fn new(repository: Repository, config: TrackingConfig) -> Self {
        Self { repository, config }
    }

    /// Due-soon window anchored on today
    pub fn window(&self) -> DueWindow {
        DueWindow::current(self.config.due_soon_days)
    }

    /// Equipment matching the SQL-side filters, with computed statuses
    pub async fn evaluate(&self, filter: &EquipmentFilter, order: EquipmentOrder) -> AppResult<Vec<EquipmentWithStatus>> {
        let window = self.window();
        let rows = self.repository.equipment.list(filter, order).await?;
        Ok(rows.into_iter().map(|e| e.with_status(&window)).collect())
    }

    /// The whole fleet with computed statuses
    pub async fn evaluate_all(&self) -> AppResult<Vec<EquipmentWithStatus>> {
        let window = self.window();
        let rows = self.repository.equipment.list_all().await?;
        Ok(rows.into_iter().map(|e| e.with_status(&window)).collect())
    }

    /// Database round-trip for the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.equipment.count().await
    }

    /// Equipment list view: filtered, ordered by machine ID, paginated
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Page<EquipmentWithStatus>> {
        let filter = query.filter();
        let evaluated = self.evaluate(&filter, EquipmentOrder::MachineId).await?;
        let filtered = filter.status_filter().apply(evaluated);
        let per_page = query.per_page.unwrap_or(self.config.page_size).clamp(1, 100);
        Ok(paginate(filtered, query.page, per_page))
    }

    pub async fn get(&self, machine_id: &str) -> AppResult<EquipmentWithStatus> {
        let equipment = self.repository.equipment.get_by_id(&normalize_machine_id(machine_id)).await?;
        Ok(equipment.with_status(&self.window()))
    }

    pub async fn create(&self, data: CreateEquipment, created_by: i32) -> AppResult<EquipmentWithStatus> {
        data.validate()?;
        data.check_fields()?;
        let window = self.window();
        data.check_dates(window.today)?;

        let machine_id = data.normalized_machine_id();
        if self.repository.equipment.exists(&machine_id).await? {
            return Err(AppError::Conflict("Machine ID already exists.".to_string()));
        }

        let created = self
            .repository
            .equipment
            .create(NewEquipment {
                machine_id: &machine_id,
                data: &data,
                calibration_interval_days: data
                    .calibration_interval_days
                    .unwrap_or(self.config.default_calibration_interval_days),
                maintenance_interval_days: data
                    .maintenance_interval_days
                    .unwrap_or(self.config.default_maintenance_interval_days),
                created_by: Some(created_by),
            })
            .await?;

        tracing::info!(machine_id = %created.machine_id, user_id = created_by, "Equipment created");

        Ok(created.with_status(&window))
    }

    pub async fn update(&self, machine_id: &str, data: UpdateEquipment, user_id: i32) -> AppResult<EquipmentWithStatus> {
        data.validate()?;
        data.check_fields()?;
        let window = self.window();
        data.check_dates(window.today)?;

        if data.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let machine_id = normalize_machine_id(machine_id);
        let updated = self.repository.equipment.update(&machine_id, &data).await?;

        tracing::info!(%machine_id, user_id, "Equipment updated");

        Ok(updated.with_status(&window))
    }

    pub async fn delete(&self, machine_id: &str, user_id: i32) -> AppResult<Equipment> {
        let deleted = self.repository.equipment.delete(&normalize_machine_id(machine_id)).await?;

        tracing::info!(
            machine_id = %deleted.machine_id,
            machine_name = %deleted.machine_name,
            user_id,
            "Equipment deleted"
        );

        Ok(deleted)
    }

    /// Record a completed calibration or maintenance
    pub async fn complete_procedure(
        &self,
        machine_id: &str,
        data: CompleteProcedure,
        user_id: i32,
        username: &str,
    ) -> AppResult<ProcedureCompleted> {
        data.validate()?;
        let window = self.window();
        let completion_date = data.resolved_date(window.today)?;

        let machine_id = normalize_machine_id(machine_id);
        let updated = self
            .repository
            .equipment
            .set_last_date(&machine_id, data.procedure_type, completion_date)
            .await?;
        let evaluated = updated.with_status(&window);

        let next_due_date = match data.procedure_type {
            ProcedureKind::Calibration => evaluated.calibration.next_date,
            ProcedureKind::Maintenance => evaluated.maintenance.next_date,
        };

        tracing::info!(
            %machine_id,
            procedure = data.procedure_type.as_str(),
            %completion_date,
            next_due_date = ?next_due_date,
            user_id,
            username,
            notes = data.notes.as_deref().unwrap_or(""),
            "Procedure completed"
        );

        Ok(ProcedureCompleted {
            machine_id: evaluated.equipment.machine_id.clone(),
            procedure_type: data.procedure_type,
            completion_date,
            next_due_date,
            message: format!(
                "{} recorded for {} on {}.",
                data.procedure_type.label(),
                evaluated.equipment.machine_id,
                completion_date
            ),
            equipment: evaluated,
        })
    }

    /// Compact statuses of the whole fleet
    pub async fn status_list(&self) -> AppResult<Vec<EquipmentStatusSummary>> {
        let all = self.evaluate_all().await?;
        Ok(all.iter().map(EquipmentStatusSummary::from).collect())
    }

    pub async fn stats(&self) -> AppResult<StatusStats> {
        let all = self.evaluate_all().await?;
        Ok(summary::status_stats(&all))
    }

    pub async fn upcoming(&self) -> AppResult<UpcomingTasks> {
        let all = self.evaluate_all().await?;
        Ok(summary::upcoming_tasks(&all, &self.window()))
    }
}
