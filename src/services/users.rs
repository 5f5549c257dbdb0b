//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{TimeZone, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{AuthConfig, UsersConfig},
    error::{AppError, AppResult},
    models::user::{
        normalize_optional, Role, SignupRequest, UpdateProfile, User, UserClaims, UserProfile, UserQuery,
        UserSummary, UserWithProfile,
    },
    repository::{users::ProfileChanges, Repository},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    auth: AuthConfig,
    config: UsersConfig,
}

impl UsersService {
    pub fn new(repository: Repository, auth: AuthConfig, config: UsersConfig) -> Self {
        Self { repository, auth, config }
    }

    /// Authenticate user by username and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, UserWithProfile)> {
        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let profile = self.repository.users.get_profile(user.id).await?;
        let token = self.create_token_for_user(&user, profile.as_ref())?;

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");

        Ok((token, UserWithProfile { user, profile }))
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User, profile: Option<&UserProfile>) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.auth.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: profile.map(|p| p.role),
            jti: Uuid::new_v4(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.auth.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Register a new account together with its profile
    pub async fn signup(&self, request: SignupRequest) -> AppResult<UserWithProfile> {
        request.validate()?;
        request.check_passwords()?;

        if self.repository.users.username_exists(request.username.trim()).await? {
            return Err(AppError::Conflict("A user with that username already exists.".to_string()));
        }

        let employee_id = request.normalized_employee_id();
        if let Some(ref employee_id) = employee_id {
            if self.repository.users.employee_id_exists(employee_id, None).await? {
                return Err(AppError::Conflict("Employee ID already exists.".to_string()));
            }
        }

        let hash = hash_password(&request.password)?;
        let (user, profile) = self
            .repository
            .users
            .create_with_profile(&request, &hash, employee_id.as_deref(), self.config.default_role)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = %profile.role, "Account created");

        Ok(UserWithProfile {
            user,
            profile: Some(profile),
        })
    }

    /// Revoke the token described by `claims`
    pub async fn logout(&self, claims: &UserClaims) -> AppResult<()> {
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or_else(Utc::now);
        self.repository.tokens.revoke(claims.jti, claims.user_id, expires_at).await?;

        let purged = self.repository.tokens.purge_expired().await?;
        tracing::debug!(user_id = claims.user_id, purged, "Token revoked");
        Ok(())
    }

    /// Check the token against the stored account and refresh its role
    pub async fn refresh_session(&self, claims: UserClaims) -> AppResult<UserClaims> {
        let state = self
            .repository
            .users
            .session_state(claims.user_id, claims.jti)
            .await?
            .ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;
        state.apply(claims)
    }

    /// Current user with profile
    pub async fn me(&self, user_id: i32) -> AppResult<UserWithProfile> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let profile = self.repository.users.get_profile(user_id).await?;
        Ok(UserWithProfile { user, profile })
    }

    /// Update the caller's own profile
    pub async fn update_profile(&self, user_id: i32, data: UpdateProfile) -> AppResult<UserProfile> {
        data.validate()?;

        let changes = ProfileChanges {
            employee_id: data.employee_id.as_deref().map(|v| normalize_optional(Some(v))),
            department: data.department.as_deref().map(|v| v.trim().to_string()),
            phone_number: data.phone_number.as_deref().map(|v| v.trim().to_string()),
        };

        if changes.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        if let Some(Some(ref employee_id)) = changes.employee_id {
            if self.repository.users.employee_id_exists(employee_id, Some(user_id)).await? {
                return Err(AppError::Conflict("Employee ID already exists.".to_string()));
            }
        }

        self.repository.users.update_profile(user_id, &changes).await
    }

    /// Search users
    pub async fn list_users(&self, query: &UserQuery) -> AppResult<(Vec<UserSummary>, i64)> {
        self.repository.users.list(query).await
    }

    /// Change the role of a user
    pub async fn set_role(&self, admin_id: i32, user_id: i32, role: Role) -> AppResult<UserProfile> {
        self.repository.users.get_by_id(user_id).await?;
        let profile = self.repository.users.set_role(user_id, role).await?;

        tracing::info!(admin_id, user_id, role = %role, "User role changed");

        Ok(profile)
    }

    /// Total number of user profiles
    pub async fn count_profiles(&self) -> AppResult<i64> {
        self.repository.users.count_profiles().await
    }

    /// Create the configured administrator when none exists
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<bool> {
        let (Some(username), Some(password)) = (
            self.auth.bootstrap_admin_username.as_deref(),
            self.auth.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(false);
        };

        if self.repository.users.count_administrators().await? > 0 {
            return Ok(false);
        }

        if let Some(existing) = self.repository.users.get_by_username(username).await? {
            self.repository.users.set_role(existing.id, Role::Administrator).await?;
            tracing::warn!(username, "Existing account promoted to administrator");
            return Ok(true);
        }

        let request = SignupRequest {
            username: username.to_string(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: format!("{}@localhost", username),
            employee_id: None,
            password: password.to_string(),
            password_confirm: password.to_string(),
        };
        let hash = hash_password(password)?;
        self.repository
            .users
            .create_with_profile(&request, &hash, None, Role::Administrator)
            .await?;

        tracing::warn!(username, "Bootstrap administrator created");
        Ok(true)
    }
}

/// Verify user password
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
