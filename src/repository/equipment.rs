//! Equipment repository

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use super::like_pattern;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ProcedureKind,
        equipment::{CreateEquipment, Equipment, EquipmentFilter, UpdateEquipment},
    },
};

/// Sort order of equipment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentOrder {
    MachineName,
    MachineId,
}

impl EquipmentOrder {
    fn clause(&self) -> &'static str {
        match self {
            EquipmentOrder::MachineName => "machine_name, machine_id",
            EquipmentOrder::MachineId => "machine_id",
        }
    }
}

/// Values to insert, already normalized by the service
pub struct NewEquipment<'a> {
    pub machine_id: &'a str,
    pub data: &'a CreateEquipment,
    pub calibration_interval_days: i32,
    pub maintenance_interval_days: i32,
    pub created_by: Option<i32>,
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment matching the search and type filters
    ///
    /// The status filter is not applied here: statuses depend on the current
    /// date and are computed by the caller.
    pub async fn list(&self, filter: &EquipmentFilter, order: EquipmentOrder) -> AppResult<Vec<Equipment>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        let pattern = filter.search_term().map(like_pattern);
        if pattern.is_some() {
            conditions.push(format!(
                "(machine_id ILIKE ${i} OR machine_name ILIKE ${i} OR machine_location ILIKE ${i})",
                i = idx
            ));
            idx += 1;
        }
        if filter.machine_type.is_some() {
            conditions.push(format!("machine_type = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM equipment {} ORDER BY {}",
            where_clause,
            order.clause()
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query);
        if let Some(ref pattern) = pattern {
            builder = builder.bind(pattern);
        }
        if let Some(machine_type) = filter.machine_type {
            builder = builder.bind(machine_type);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// All equipment, ordered by name
    pub async fn list_all(&self) -> AppResult<Vec<Equipment>> {
        self.list(&EquipmentFilter::default(), EquipmentOrder::MachineName).await
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Get equipment by machine ID
    pub async fn get_by_id(&self, machine_id: &str) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE machine_id = $1")
            .bind(machine_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", machine_id)))
    }

    pub async fn exists(&self, machine_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment WHERE machine_id = $1)")
            .bind(machine_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, new: NewEquipment<'_>) -> AppResult<Equipment> {
        let data = new.data;
        let result = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                machine_id, machine_name, machine_type, machine_location,
                last_calibration_date, last_maintenance_date,
                calibration_interval_days, maintenance_interval_days, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.machine_id)
        .bind(data.machine_name.trim())
        .bind(data.machine_type.unwrap_or_default())
        .bind(data.machine_location.trim())
        .bind(data.last_calibration_date)
        .bind(data.last_maintenance_date)
        .bind(new.calibration_interval_days)
        .bind(new.maintenance_interval_days)
        .bind(new.created_by)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict("Machine ID already exists.".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update the provided fields only
    pub async fn update(&self, machine_id: &str, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $2".to_string()];
        let mut idx = 3;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.machine_name, "machine_name");
        add_field!(data.machine_type, "machine_type");
        add_field!(data.machine_location, "machine_location");
        add_field!(data.last_calibration_date, "last_calibration_date");
        add_field!(data.last_maintenance_date, "last_maintenance_date");
        add_field!(data.calibration_interval_days, "calibration_interval_days");
        add_field!(data.maintenance_interval_days, "maintenance_interval_days");

        let query = format!(
            "UPDATE equipment SET {} WHERE machine_id = $1 RETURNING *",
            sets.join(", ")
        );

        let name = data.machine_name.as_deref().map(str::trim);
        let location = data.machine_location.as_deref().map(str::trim);
        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(machine_id).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(name);
        bind_field!(data.machine_type);
        bind_field!(location);
        bind_field!(data.last_calibration_date);
        bind_field!(data.last_maintenance_date);
        bind_field!(data.calibration_interval_days);
        bind_field!(data.maintenance_interval_days);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", machine_id)))
    }

    /// Record the completion date of a calibration or maintenance
    pub async fn set_last_date(
        &self,
        machine_id: &str,
        kind: ProcedureKind,
        date: NaiveDate,
    ) -> AppResult<Equipment> {
        let query = format!(
            "UPDATE equipment SET {} = $2, updated_at = NOW() WHERE machine_id = $1 RETURNING *",
            kind.last_date_column()
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(machine_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", machine_id)))
    }

    /// Delete equipment, returning the removed record
    pub async fn delete(&self, machine_id: &str) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("DELETE FROM equipment WHERE machine_id = $1 RETURNING *")
            .bind(machine_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", machine_id)))
    }
}
