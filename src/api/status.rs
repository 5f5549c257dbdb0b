//! Status JSON endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        dashboard::{StatusStats, UpcomingTasks},
        equipment::EquipmentStatusSummary,
        user::Permission,
    },
    schedule::EquipmentStatus,
    AppState,
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct StatusList {
    pub equipment: Vec<EquipmentStatusSummary>,
    pub count: usize,
}

/// Status of one piece of equipment
#[derive(Serialize, ToSchema)]
pub struct EquipmentStatusResponse {
    pub machine_id: String,
    pub machine_name: String,
    #[serde(flatten)]
    pub status: EquipmentStatus,
}

/// Statuses and next due dates of all equipment
#[utoipa::path(
    get,
    path = "/status/equipment",
    tag = "status",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fleet statuses", body = StatusList)
    )
)]
pub async fn list_statuses(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatusList>> {
    claims.require(Permission::ViewEquipment)?;

    let equipment = state.services.equipment.status_list().await?;
    Ok(Json(StatusList {
        count: equipment.len(),
        equipment,
    }))
}

/// Calibration and maintenance status of one piece of equipment
#[utoipa::path(
    get,
    path = "/status/equipment/{machine_id}",
    tag = "status",
    security(("bearer_auth" = [])),
    params(("machine_id" = String, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Equipment status", body = EquipmentStatusResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn equipment_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(machine_id): Path<String>,
) -> AppResult<Json<EquipmentStatusResponse>> {
    claims.require(Permission::ViewEquipment)?;

    let equipment = state.services.equipment.get(&machine_id).await?;
    Ok(Json(EquipmentStatusResponse {
        status: equipment.schedule_status(),
        machine_id: equipment.equipment.machine_id,
        machine_name: equipment.equipment.machine_name,
    }))
}

/// Fleet-wide counts and compliance percentage
#[utoipa::path(
    get,
    path = "/status/stats",
    tag = "status",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status statistics", body = StatusStats)
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatusStats>> {
    claims.require(Permission::ViewEquipment)?;

    let stats = state.services.equipment.stats().await?;
    Ok(Json(stats))
}

/// Upcoming calibration and maintenance tasks by time bucket
#[utoipa::path(
    get,
    path = "/status/upcoming",
    tag = "status",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Upcoming task counts", body = UpcomingTasks)
    )
)]
pub async fn upcoming(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UpcomingTasks>> {
    claims.require(Permission::ViewEquipment)?;

    let tasks = state.services.equipment.upcoming().await?;
    Ok(Json(tasks))
}
