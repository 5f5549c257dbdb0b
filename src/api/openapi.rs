//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, dashboards, equipment, health, status, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "EquipTrack API",
        version = "1.0.0",
        description = "Equipment maintenance and calibration tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::home,
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        // Dashboards
        dashboards::dashboard_route,
        dashboards::default_dashboard,
        dashboards::admin_dashboard,
        dashboards::maintenance_dashboard,
        dashboards::quality_dashboard,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::complete_procedure,
        // Status
        status::list_statuses,
        status::equipment_status,
        status::stats,
        status::upcoming,
        // Users
        users::list_users,
        users::update_role,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::UserProfile,
            crate::models::user::UserWithProfile,
            crate::models::user::UserSummary,
            crate::models::user::SignupRequest,
            crate::models::user::UpdateProfile,
            crate::models::user::UpdateRole,
            equipment::PaginatedUsers,
            // Equipment
            crate::models::enums::MachineType,
            crate::models::enums::ProcedureKind,
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentWithStatus,
            crate::models::equipment::EquipmentStatusSummary,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::CompleteProcedure,
            crate::models::equipment::ProcedureCompleted,
            crate::schedule::DueStatus,
            crate::schedule::ScheduleStatus,
            crate::schedule::EquipmentStatus,
            crate::schedule::StatusFilter,
            equipment::PaginatedEquipment,
            // Dashboards
            crate::models::dashboard::DashboardHeader,
            crate::models::dashboard::DashboardRoute,
            crate::models::dashboard::DefaultDashboard,
            crate::models::dashboard::AdminDashboard,
            crate::models::dashboard::MaintenanceDashboard,
            crate::models::dashboard::QualityDashboard,
            // Status
            crate::models::dashboard::StatusStats,
            crate::models::dashboard::UpcomingTasks,
            status::StatusList,
            status::EquipmentStatusResponse,
            // Health
            health::HealthResponse,
            health::ServiceInfo,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service information and health checks"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "dashboards", description = "Role dashboards"),
        (name = "equipment", description = "Equipment management"),
        (name = "status", description = "Calibration and maintenance status"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/equipment/{machine_id}/complete"));
        assert!(paths.contains_key("/dashboards/quality"));
        assert!(paths.contains_key("/status/upcoming"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
