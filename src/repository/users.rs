//! Users repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::like_pattern;
use crate::{
    error::{AppError, AppResult},
    models::user::{
        Role, SessionState, SignupRequest, User, UserProfile, UserQuery, UserSummary, UserSummaryRow,
    },
};

/// Profile changes, already normalized by the service
#[derive(Debug, Default)]
pub struct ProfileChanges {
    /// `Some(None)` clears the employee ID
    pub employee_id: Option<Option<String>>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.employee_id.is_none() && self.department.is_none() && self.phone_number.is_none()
    }
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if an employee ID is used by another user's profile
    pub async fn employee_id_exists(&self, employee_id: &str, exclude_user: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(user_id) = exclude_user {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM user_profiles WHERE employee_id = $1 AND user_id != $2)",
            )
            .bind(employee_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_profiles WHERE employee_id = $1)")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a user account and its profile in one transaction
    pub async fn create_with_profile(
        &self,
        data: &SignupRequest,
        password_hash: &str,
        employee_id: Option<&str>,
        role: Role,
    ) -> AppResult<(User, UserProfile)> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.username.trim())
        .bind(password_hash)
        .bind(data.first_name.trim())
        .bind(data.last_name.trim())
        .bind(data.email.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(unique_to_conflict)?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, role, employee_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(role)
        .bind(employee_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(unique_to_conflict)?;

        tx.commit().await?;

        Ok((user, profile))
    }

    /// Revocation of `jti` together with the account's current status and role
    ///
    /// `None` when the user no longer exists.
    pub async fn session_state(&self, user_id: i32, jti: Uuid) -> AppResult<Option<SessionState>> {
        let state = sqlx::query_as::<_, SessionState>(
            r#"
            SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $2) AS revoked,
                   u.is_active, p.role
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;
        Ok(state)
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Update the provided profile fields only
    pub async fn update_profile(&self, user_id: i32, changes: &ProfileChanges) -> AppResult<UserProfile> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(changes.employee_id, "employee_id");
        add_field!(changes.department, "department");
        add_field!(changes.phone_number, "phone_number");

        let query = format!(
            "UPDATE user_profiles SET {} WHERE user_id = $1 RETURNING *",
            sets.join(", ")
        );

        let mut builder = sqlx::query_as::<_, UserProfile>(&query).bind(user_id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.employee_id);
        bind_field!(changes.department);
        bind_field!(changes.phone_number);

        builder
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_to_conflict)?
            .ok_or_else(|| AppError::ProfileMissing("Profile not found. Please contact administrator.".to_string()))
    }

    /// Set the role of a user, creating the profile when missing
    pub async fn set_role(&self, user_id: i32, role: Role) -> AppResult<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Number of user profiles
    pub async fn count_profiles(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_administrators(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles WHERE role = $1")
            .bind(Role::Administrator)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Search users with pagination
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<UserSummary>, i64)> {
        let (_, per_page, offset) = query.paging();

        let mut conditions = Vec::new();
        let mut idx = 1;

        let pattern = query
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(like_pattern);
        if pattern.is_some() {
            conditions.push(format!(
                "(u.username ILIKE ${i} OR u.first_name ILIKE ${i} OR u.last_name ILIKE ${i})",
                i = idx
            ));
            idx += 1;
        }
        if query.role.is_some() {
            conditions.push(format!("p.role = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM users u LEFT JOIN user_profiles p ON p.user_id = u.id {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref pattern) = pattern {
            count_builder = count_builder.bind(pattern);
        }
        if let Some(role) = query.role {
            count_builder = count_builder.bind(role);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.email, u.is_active,
                   p.role, p.employee_id, p.department
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            {}
            ORDER BY u.last_name, u.first_name, u.username
            LIMIT {} OFFSET {}
            "#,
            where_clause, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, UserSummaryRow>(&select_query);
        if let Some(ref pattern) = pattern {
            select_builder = select_builder.bind(pattern);
        }
        if let Some(role) = query.role {
            select_builder = select_builder.bind(role);
        }
        let rows = select_builder.fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(UserSummary::from).collect(), total))
    }
}

/// Turn unique violations on users and profiles into conflicts
fn unique_to_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            let message = if db.constraint().is_some_and(|c| c.contains("employee")) {
                "Employee ID already exists."
            } else {
                "A user with that username already exists."
            };
            AppError::Conflict(message.to_string())
        }
        other => AppError::Database(other),
    }
}
