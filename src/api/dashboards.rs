//! Role dashboards

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        dashboard::{AdminDashboard, DashboardRoute, DefaultDashboard, MaintenanceDashboard, QualityDashboard},
        equipment::EquipmentFilter,
        user::{Permission, Role},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Dashboard matching the caller's role
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard to open", body = DashboardRoute),
        (status = 403, description = "No profile", body = crate::error::ErrorResponse)
    )
)]
pub async fn dashboard_route(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardRoute>> {
    let role = claims.role()?;
    Ok(Json(state.services.dashboards.route(role)))
}

/// Landing page for accounts waiting for a role
#[utoipa::path(
    get,
    path = "/dashboards/default",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Default dashboard", body = DefaultDashboard)
    )
)]
pub async fn default_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DefaultDashboard>> {
    let role = claims.role.unwrap_or(Role::Unassigned);
    Ok(Json(state.services.dashboards.default_dashboard(role)))
}

/// Administrator dashboard
#[utoipa::path(
    get,
    path = "/dashboards/admin",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    params(EquipmentFilter),
    responses(
        (status = 200, description = "Administrator dashboard", body = AdminDashboard),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse)
    )
)]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<EquipmentFilter>,
) -> AppResult<Json<AdminDashboard>> {
    claims.require(Permission::AdminDashboard)?;

    let dashboard = state.services.dashboards.admin(&filter).await?;
    Ok(Json(dashboard))
}

/// Maintenance dashboard
#[utoipa::path(
    get,
    path = "/dashboards/maintenance",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    params(EquipmentFilter),
    responses(
        (status = 200, description = "Maintenance dashboard", body = MaintenanceDashboard),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn maintenance_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<EquipmentFilter>,
) -> AppResult<Json<MaintenanceDashboard>> {
    claims.require(Permission::MaintenanceDashboard)?;

    let dashboard = state.services.dashboards.maintenance(&filter).await?;
    Ok(Json(dashboard))
}

/// Quality dashboard
#[utoipa::path(
    get,
    path = "/dashboards/quality",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    params(EquipmentFilter),
    responses(
        (status = 200, description = "Quality dashboard", body = QualityDashboard),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn quality_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<EquipmentFilter>,
) -> AppResult<Json<QualityDashboard>> {
    claims.require(Permission::QualityDashboard)?;

    let dashboard = state.services.dashboards.quality(&filter).await?;
    Ok(Json(dashboard))
}
