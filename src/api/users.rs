//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{Permission, UpdateRole, UserProfile, UserQuery, UserSummary},
    AppState,
};

use super::{equipment::PaginatedResponse, AuthenticatedUser};

/// List users with their profiles
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = crate::api::equipment::PaginatedUsers),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<UserSummary>>> {
    claims.require(Permission::ManageUsers)?;

    let (users, total) = state.services.users.list_users(&query).await?;
    let (page, per_page, _) = query.paging();

    Ok(Json(PaginatedResponse {
        items: users,
        total,
        page,
        per_page,
    }))
}

/// Change the role of a user
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = UserProfile),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateRole>,
) -> AppResult<Json<UserProfile>> {
    claims.require(Permission::ManageUsers)?;

    let profile = state.services.users.set_role(claims.user_id, id, data.role).await?;
    Ok(Json(profile))
}
