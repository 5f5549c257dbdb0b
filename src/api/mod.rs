//! API handlers for EquipTrack REST endpoints

pub mod auth;
pub mod dashboards;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod status;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        // Role and account status come from the database, not the token
        let claims = state.services.users.refresh_session(claims).await?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Service
        .route("/", get(health::home))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        // Dashboards
        .route("/dashboard", get(dashboards::dashboard_route))
        .route("/dashboards/default", get(dashboards::default_dashboard))
        .route("/dashboards/admin", get(dashboards::admin_dashboard))
        .route("/dashboards/maintenance", get(dashboards::maintenance_dashboard))
        .route("/dashboards/quality", get(dashboards::quality_dashboard))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipment/:machine_id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route("/equipment/:machine_id/complete", post(equipment::complete_procedure))
        // Status
        .route("/status/equipment", get(status::list_statuses))
        .route("/status/equipment/:machine_id", get(status::equipment_status))
        .route("/status/stats", get(status::stats))
        .route("/status/upcoming", get(status::upcoming))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id/role", put(users::update_role))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}


/// Role guards of every handler, called directly with already-authenticated claims.
///
/// A denied call fails before any query; an allowed one reaches the
/// unreachable database instead.
#[cfg(test)]
mod guard_tests {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
        Json,
    };
    use chrono::Utc;
    use uuid::Uuid;

    use super::{dashboards, equipment, status, tests::test_state, users, AuthenticatedUser};
    use crate::{
        error::{AppError, AppResult},
        models::{
            enums::ProcedureKind,
            equipment::{CompleteProcedure, CreateEquipment, EquipmentFilter, EquipmentQuery, UpdateEquipment},
            user::{
                Role::{self, Administrator, Maintenance, Quality, Unassigned},
                SessionState, UpdateRole, UserClaims, UserQuery,
            },
        },
    };

    const ALL_ROLES: [Role; 4] = [Administrator, Maintenance, Quality, Unassigned];
    const WITH_ROLE: &[Role] = &[Administrator, Maintenance, Quality];

    #[derive(Debug, Clone, Copy)]
    enum Route {
        ListEquipment,
        GetEquipment,
        CreateEquipment,
        UpdateEquipment,
        DeleteEquipment,
        CompleteProcedure,
        AdminDashboard,
        MaintenanceDashboard,
        QualityDashboard,
        StatusList,
        EquipmentStatus,
        Stats,
        Upcoming,
        ListUsers,
        UpdateRole,
    }

    fn user(role: Option<Role>) -> AuthenticatedUser {
        let now = Utc::now().timestamp();
        AuthenticatedUser(UserClaims {
            sub: "tester".to_string(),
            user_id: 42,
            role,
            jti: Uuid::new_v4(),
            exp: now + 600,
            iat: now,
        })
    }

    fn new_equipment() -> CreateEquipment {
        CreateEquipment {
            machine_id: "MCH-9".into(),
            machine_name: "Press".into(),
            machine_type: None,
            machine_location: "Line 9".into(),
            last_calibration_date: None,
            last_maintenance_date: None,
            calibration_interval_days: None,
            maintenance_interval_days: None,
        }
    }

    fn rename() -> UpdateEquipment {
        UpdateEquipment {
            machine_name: Some("Press 2".into()),
            ..Default::default()
        }
    }

    fn completion() -> CompleteProcedure {
        CompleteProcedure {
            procedure_type: ProcedureKind::Maintenance,
            completion_date: None,
            notes: None,
        }
    }

    fn is_denied<T>(result: AppResult<T>) -> bool {
        matches!(result, Err(AppError::Authorization(_)) | Err(AppError::ProfileMissing(_)))
    }

    async fn denied(route: Route, role: Option<Role>) -> bool {
        let state = State(test_state());
        let id = || Path("MCH-9".to_string());
        match route {
            Route::ListEquipment => {
                is_denied(equipment::list_equipment(state, user(role), Query(EquipmentQuery::default())).await)
            }
            Route::GetEquipment => is_denied(equipment::get_equipment(state, user(role), id()).await),
            Route::CreateEquipment => {
                is_denied(equipment::create_equipment(state, user(role), Json(new_equipment())).await)
            }
            Route::UpdateEquipment => {
                is_denied(equipment::update_equipment(state, user(role), id(), Json(rename())).await)
            }
            Route::DeleteEquipment => is_denied(equipment::delete_equipment(state, user(role), id()).await),
            Route::CompleteProcedure => {
                is_denied(equipment::complete_procedure(state, user(role), id(), Json(completion())).await)
            }
            Route::AdminDashboard => {
                is_denied(dashboards::admin_dashboard(state, user(role), Query(EquipmentFilter::default())).await)
            }
            Route::MaintenanceDashboard => is_denied(
                dashboards::maintenance_dashboard(state, user(role), Query(EquipmentFilter::default())).await,
            ),
            Route::QualityDashboard => {
                is_denied(dashboards::quality_dashboard(state, user(role), Query(EquipmentFilter::default())).await)
            }
            Route::StatusList => is_denied(status::list_statuses(state, user(role)).await),
            Route::EquipmentStatus => is_denied(status::equipment_status(state, user(role), id()).await),
            Route::Stats => is_denied(status::stats(state, user(role)).await),
            Route::Upcoming => is_denied(status::upcoming(state, user(role)).await),
            Route::ListUsers => is_denied(users::list_users(state, user(role), Query(UserQuery::default())).await),
            Route::UpdateRole => is_denied(
                users::update_role(state, user(role), Path(7), Json(UpdateRole { role: Quality })).await,
            ),
        }
    }

    async fn check(table: &[(Route, &[Role])]) {
        for (route, allowed) in table {
            for role in ALL_ROLES {
                assert_eq!(
                    denied(*route, Some(role)).await,
                    !allowed.contains(&role),
                    "{:?} as {:?}",
                    route,
                    role
                );
            }
            assert!(denied(*route, None).await, "{:?} without a profile", route);
        }
    }

    #[tokio::test]
    async fn test_equipment_guards() {
        check(&[
            (Route::ListEquipment, WITH_ROLE),
            (Route::GetEquipment, WITH_ROLE),
            (Route::CreateEquipment, &[Administrator, Maintenance]),
            (Route::UpdateEquipment, &[Administrator]),
            (Route::DeleteEquipment, &[Administrator, Maintenance]),
            (Route::CompleteProcedure, &[Administrator, Maintenance]),
        ])
        .await;
    }

    #[tokio::test]
    async fn test_dashboard_guards() {
        check(&[
            (Route::AdminDashboard, &[Administrator]),
            (Route::MaintenanceDashboard, &[Administrator, Maintenance]),
            (Route::QualityDashboard, &[Administrator, Quality]),
        ])
        .await;
    }

    #[tokio::test]
    async fn test_status_guards() {
        check(&[
            (Route::StatusList, WITH_ROLE),
            (Route::EquipmentStatus, WITH_ROLE),
            (Route::Stats, WITH_ROLE),
            (Route::Upcoming, WITH_ROLE),
        ])
        .await;
    }

    #[tokio::test]
    async fn test_user_management_guards() {
        check(&[(Route::ListUsers, &[Administrator]), (Route::UpdateRole, &[Administrator])]).await;
    }

    #[tokio::test]
    async fn test_denied_is_forbidden() {
        let response = equipment::create_equipment(State(test_state()), user(Some(Quality)), Json(new_equipment()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = status::stats(State(test_state()), user(Some(Unassigned))).await.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_demoted_administrator_is_forbidden() {
        let AuthenticatedUser(token_claims) = user(Some(Administrator));
        let current = SessionState {
            revoked: false,
            is_active: true,
            role: Some(Maintenance),
        }
        .apply(token_claims)
        .unwrap();

        let response = equipment::update_equipment(
            State(test_state()),
            AuthenticatedUser(current),
            Path("MCH-9".to_string()),
            Json(rename()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
