//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        equipment::{
            CompleteProcedure, CreateEquipment, Equipment, EquipmentQuery, EquipmentWithStatus, ProcedureCompleted,
            UpdateEquipment,
        },
        user::{Permission, UserSummary},
    },
    services::equipment::Page,
    AppState,
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[aliases(PaginatedEquipment = PaginatedResponse<EquipmentWithStatus>, PaginatedUsers = PaginatedResponse<UserSummary>)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

impl<T> From<Page<T>> for PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// List equipment with search, filters and pagination
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = PaginatedEquipment),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "No role assigned", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<PaginatedResponse<EquipmentWithStatus>>> {
    claims.require(Permission::ViewEquipment)?;

    let page = state.services.equipment.list(&query).await?;
    Ok(Json(page.into()))
}

/// Get equipment with its calibration and maintenance status
#[utoipa::path(
    get,
    path = "/equipment/{machine_id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("machine_id" = String, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentWithStatus),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(machine_id): Path<String>,
) -> AppResult<Json<EquipmentWithStatus>> {
    claims.require(Permission::ViewEquipment)?;

    let equipment = state.services.equipment.get(&machine_id).await?;
    Ok(Json(equipment))
}

/// Register new equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = EquipmentWithStatus),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 409, description = "Machine ID already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<EquipmentWithStatus>)> {
    claims.require(Permission::WriteEquipment)?;

    let created = state.services.equipment.create(data, claims.user_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update equipment (administrators only)
#[utoipa::path(
    put,
    path = "/equipment/{machine_id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("machine_id" = String, Path, description = "Machine ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = EquipmentWithStatus),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(machine_id): Path<String>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<EquipmentWithStatus>> {
    claims.require(Permission::EditEquipment)?;

    let updated = state.services.equipment.update(&machine_id, data, claims.user_id).await?;
    Ok(Json(updated))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{machine_id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("machine_id" = String, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Deleted equipment", body = Equipment),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(machine_id): Path<String>,
) -> AppResult<Json<Equipment>> {
    claims.require(Permission::WriteEquipment)?;

    let deleted = state.services.equipment.delete(&machine_id, claims.user_id).await?;
    Ok(Json(deleted))
}

/// Record a completed calibration or maintenance
#[utoipa::path(
    post,
    path = "/equipment/{machine_id}/complete",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("machine_id" = String, Path, description = "Machine ID")),
    request_body = CompleteProcedure,
    responses(
        (status = 200, description = "Procedure recorded", body = ProcedureCompleted),
        (status = 400, description = "Invalid completion date", body = crate::error::ErrorResponse),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_procedure(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(machine_id): Path<String>,
    Json(data): Json<CompleteProcedure>,
) -> AppResult<Json<ProcedureCompleted>> {
    claims.require(Permission::WriteEquipment)?;

    let completed = state
        .services
        .equipment
        .complete_procedure(&machine_id, data, claims.user_id, &claims.sub)
        .await?;
    Ok(Json(completed))
}
