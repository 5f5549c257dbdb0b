//! User accounts, profiles and token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::impl_text_column;
use crate::error::AppError;

/// Role attached to a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Maintenance,
    Quality,
    /// Registered but not yet given a role by an administrator
    Unassigned,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Maintenance => "maintenance",
            Role::Quality => "quality",
            Role::Unassigned => "unassigned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Maintenance => "Maintenance/Calibration User",
            Role::Quality => "Quality Engineer",
            Role::Unassigned => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" => Ok(Role::Administrator),
            "maintenance" => Ok(Role::Maintenance),
            "quality" => Ok(Role::Quality),
            "unassigned" | "" => Ok(Role::Unassigned),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl_text_column!(Role);

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile holding the role and employee details, one per user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub role: Role,
    pub employee_id: Option<String>,
    pub department: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User together with its profile
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<UserProfile>,
}

/// Row used by the user listing (profile columns may be missing)
#[derive(Debug, Clone, FromRow)]
pub struct UserSummaryRow {
    id: i32,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_active: bool,
    role: Option<Role>,
    employee_id: Option<String>,
    department: Option<String>,
}

impl From<UserSummaryRow> for UserSummary {
    fn from(row: UserSummaryRow) -> Self {
        UserSummary {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_active: row.is_active,
            has_profile: row.role.is_some(),
            role: row.role,
            employee_id: row.employee_id,
            department: row.department,
        }
    }
}

/// Short user representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub has_profile: bool,
    pub role: Option<Role>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
}

/// User query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Search in username, first and last name
    pub name: Option<String>,
    pub role: Option<Role>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl UserQuery {
    /// Page (from 1), page size (1 to 100, default 20) and row offset
    pub fn paging(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page, (page - 1).saturating_mul(per_page))
    }
}

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 150, message = "Username must be between 3 and 150 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 30, message = "First name is required (max 30 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name is required (max 30 characters)"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 20, message = "Employee ID must be at most 20 characters"))]
    pub employee_id: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub password_confirm: String,
}

impl SignupRequest {
    pub fn check_passwords(&self) -> Result<(), AppError> {
        if self.password != self.password_confirm {
            return Err(AppError::Validation("The two password fields didn't match".to_string()));
        }
        if self.password.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation("Password can't be entirely numeric".to_string()));
        }
        Ok(())
    }

    /// Employee ID with surrounding blanks removed, `None` when empty
    pub fn normalized_employee_id(&self) -> Option<String> {
        normalize_optional(self.employee_id.as_deref())
    }
}

/// Update own profile request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(max = 20, message = "Employee ID must be at most 20 characters"))]
    pub employee_id: Option<String>,
    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,
    #[validate(length(max = 15, message = "Phone number must be at most 15 characters"))]
    pub phone_number: Option<String>,
}

/// Change a user's role (administrators only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    pub role: Role,
}

pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    /// `None` when the account has no profile
    pub role: Option<Role>,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Role of the caller, failing when the account has no profile
    pub fn role(&self) -> Result<Role, AppError> {
        self.role.ok_or_else(|| {
            AppError::ProfileMissing("Profile not found. Please contact administrator.".to_string())
        })
    }

    /// Require a role granted `permission`
    pub fn require(&self, permission: Permission) -> Result<Role, AppError> {
        let role = self.role()?;
        if permission.allows(role) {
            return Ok(role);
        }
        let message = match role {
            Role::Unassigned => "No role assigned yet. Please contact your administrator.",
            _ => "You don't have permission to access this page.",
        };
        Err(AppError::Authorization(message.to_string()))
    }
}

/// Role-guarded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Equipment list and detail, status endpoints
    ViewEquipment,
    /// Create and delete equipment, record completed procedures
    WriteEquipment,
    /// Edit an equipment record
    EditEquipment,
    AdminDashboard,
    MaintenanceDashboard,
    QualityDashboard,
    /// User list and role changes
    ManageUsers,
}

impl Permission {
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Permission::ViewEquipment => &[Role::Administrator, Role::Maintenance, Role::Quality],
            Permission::WriteEquipment => &[Role::Administrator, Role::Maintenance],
            Permission::EditEquipment => &[Role::Administrator],
            Permission::AdminDashboard => &[Role::Administrator],
            Permission::MaintenanceDashboard => &[Role::Administrator, Role::Maintenance],
            Permission::QualityDashboard => &[Role::Administrator, Role::Quality],
            Permission::ManageUsers => &[Role::Administrator],
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }
}

/// Current account state looked up for every authenticated request
#[derive(Debug, Clone, FromRow)]
pub struct SessionState {
    pub revoked: bool,
    pub is_active: bool,
    pub role: Option<Role>,
}

impl SessionState {
    /// Replace the role carried by the token with the stored one
    pub fn apply(self, mut claims: UserClaims) -> Result<UserClaims, AppError> {
        if self.revoked {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }
        if !self.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        claims.role = self.role;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<Role>) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "jdoe".to_string(),
            user_id: 7,
            role,
            jti: Uuid::new_v4(),
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Quality".parse::<Role>(), Ok(Role::Quality));
        assert_eq!("".parse::<Role>(), Ok(Role::Unassigned));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_token_roundtrip() {
        let original = claims(Some(Role::Maintenance));
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.role, Some(Role::Maintenance));
        assert_eq!(parsed.jti, original.jti);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut c = claims(Some(Role::Quality));
        c.exp = Utc::now().timestamp() - 3600;
        let token = c.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn test_role_requirements() {
        let maint = claims(Some(Role::Maintenance));
        assert!(maint.require(Permission::WriteEquipment).is_ok());
        assert!(maint.require(Permission::EditEquipment).is_err());
        assert!(maint.require(Permission::ViewEquipment).is_ok());

        let quality = claims(Some(Role::Quality));
        assert!(matches!(quality.require(Permission::WriteEquipment), Err(AppError::Authorization(_))));

        let admin = claims(Some(Role::Administrator));
        assert_eq!(admin.require(Permission::ManageUsers).unwrap(), Role::Administrator);

        let fresh = claims(Some(Role::Unassigned));
        match fresh.require(Permission::ViewEquipment) {
            Err(AppError::Authorization(msg)) => assert!(msg.starts_with("No role assigned")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_permission_table() {
        use Permission::*;
        use Role::*;

        let table: &[(Permission, &[Role])] = &[
            (ViewEquipment, &[Administrator, Maintenance, Quality]),
            (WriteEquipment, &[Administrator, Maintenance]),
            (EditEquipment, &[Administrator]),
            (AdminDashboard, &[Administrator]),
            (MaintenanceDashboard, &[Administrator, Maintenance]),
            (QualityDashboard, &[Administrator, Quality]),
            (ManageUsers, &[Administrator]),
        ];

        for (permission, allowed) in table {
            for role in [Administrator, Maintenance, Quality, Unassigned] {
                assert_eq!(
                    permission.allows(role),
                    allowed.contains(&role),
                    "{:?} for {:?}",
                    permission,
                    role
                );
            }
        }
    }

    #[test]
    fn test_missing_profile() {
        let c = claims(None);
        assert!(matches!(c.role(), Err(AppError::ProfileMissing(_))));
        assert!(matches!(c.require(Permission::QualityDashboard), Err(AppError::ProfileMissing(_))));
    }

    #[test]
    fn test_session_state_overrides_token_role() {
        let token_claims = claims(Some(Role::Administrator));
        let demoted = SessionState {
            revoked: false,
            is_active: true,
            role: Some(Role::Maintenance),
        }
        .apply(token_claims.clone())
        .unwrap();
        assert_eq!(demoted.role, Some(Role::Maintenance));
        assert!(matches!(demoted.require(Permission::EditEquipment), Err(AppError::Authorization(_))));

        let no_profile = SessionState {
            revoked: false,
            is_active: true,
            role: None,
        }
        .apply(token_claims)
        .unwrap();
        assert!(matches!(no_profile.role(), Err(AppError::ProfileMissing(_))));
    }

    #[test]
    fn test_session_state_rejects_revoked_and_inactive() {
        let revoked = SessionState {
            revoked: true,
            is_active: true,
            role: Some(Role::Quality),
        };
        assert!(matches!(revoked.apply(claims(Some(Role::Quality))), Err(AppError::Authentication(_))));

        let disabled = SessionState {
            revoked: false,
            is_active: false,
            role: Some(Role::Administrator),
        };
        match disabled.apply(claims(Some(Role::Administrator))) {
            Err(AppError::Authentication(msg)) => assert_eq!(msg, "Account is disabled"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_signup_password_checks() {
        let mut req = SignupRequest {
            username: "jdoe".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            employee_id: Some("  ".into()),
            password: "s3cure-pass".into(),
            password_confirm: "s3cure-pass".into(),
        };
        assert!(req.validate().is_ok());
        assert!(req.check_passwords().is_ok());
        assert_eq!(req.normalized_employee_id(), None);

        req.password_confirm = "different".into();
        assert!(req.check_passwords().is_err());

        req.password = "12345678".into();
        req.password_confirm = "12345678".into();
        assert!(req.check_passwords().is_err());

        req.email = "not-an-email".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_user_query_paging() {
        assert_eq!(UserQuery::default().paging(), (1, 20, 0));

        let query = UserQuery {
            page: Some(3),
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(query.paging(), (3, 100, 200));

        let query = UserQuery {
            page: Some(i64::MAX),
            per_page: Some(50),
            ..Default::default()
        };
        let (page, _, offset) = query.paging();
        assert_eq!(page, i64::MAX);
        assert_eq!(offset, i64::MAX);

        let query = UserQuery {
            page: Some(-4),
            per_page: Some(0),
            ..Default::default()
        };
        assert_eq!(query.paging(), (1, 1, 0));
    }

    #[test]
    fn test_password_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            username: "admin".into(),
            password: "$argon2id$hash".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "admin");
    }
}
