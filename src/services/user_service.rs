//! User service.
//!
//! Handles user CRUD with the same ownership scoping as the catalog: a
//! regular user sees and mutates only their own account, an admin sees all.
//! Usernames are derived from the email local part, uniquified with a
//! numeric suffix on collision.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, FieldErrors, Result};
use crate::models::user::{User, UserRole};
use crate::services::access::RequestContext;
use crate::services::auth_service::AuthService;
use crate::services::metadata_service::MetadataService;
use crate::services::validation;

/// Request to create a new user
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
}

/// Request to update a user
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub is_active: Option<bool>,
}

const USER_ROLES: [&str; 2] = ["ADMIN", "USER"];

/// User service
pub struct UserService {
    db: SqlitePool,
}

impl UserService {
    /// Create a new user service
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a user. Duplicate emails surface as a field error, matching
    /// the validation error shape.
    pub async fn create(&self, req: &CreateUserRequest) -> Result<User> {
        let mut errors = FieldErrors::new();
        if !validation::email_is_valid(&req.email) {
            errors.push("email", "Enter a valid email address");
        }
        if req.name.is_empty() {
            errors.push("name", "This field is required");
        }
        if let Some(role) = &req.role {
            if !USER_ROLES.contains(&role.as_str()) {
                errors.push("role", format!("Must be one of: {}", USER_ROLES.join(", ")));
            }
        }
        errors.into_result()?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?1")
            .bind(req.email.clone())
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::field("email", "A user with this email already exists"));
        }

        let username = self.generate_username(&req.email).await?;
        let password_hash = match &req.password {
            Some(password) => Some(AuthService::hash_password(password)?),
            None => None,
        };

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (id, username, email, name, password_hash, role, organization, \
             is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)",
        )
        .bind(id)
        .bind(username)
        .bind(req.email.clone())
        .bind(req.name.clone())
        .bind(password_hash)
        .bind(req.role.clone().unwrap_or_else(|| "USER".into()))
        .bind(req.organization.clone())
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::field("email", "A user with this email already exists")
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::info!(user_id = %id, email = %req.email, "User created");
        self.get_unscoped(id).await
    }

    /// Fetch a user the requester is allowed to see.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<User> {
        if !ctx.is_admin() && ctx.user_id != id {
            return Err(AppError::NotFound("User not found".into()));
        }
        self.get_unscoped(id).await
    }

    /// List visible users: everyone for admins, only themselves otherwise.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE (?1 IS NULL OR id = ?1) ORDER BY created_at DESC",
        )
        .bind(ctx.owner_filter())
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    /// Partially update a visible user; present fields overwrite, absent
    /// fields stay untouched. Passwords are re-hashed, never stored raw.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> Result<User> {
        if !ctx.is_admin() && ctx.user_id != id {
            return Err(AppError::NotFound("User not found".into()));
        }

        let mut errors = FieldErrors::new();
        if let Some(email) = &req.email {
            if !validation::email_is_valid(email) {
                errors.push("email", "Enter a valid email address");
            }
        }
        if let Some(role) = &req.role {
            if !USER_ROLES.contains(&role.as_str()) {
                errors.push("role", format!("Must be one of: {}", USER_ROLES.join(", ")));
            }
        }
        errors.into_result()?;

        let password_hash = match &req.password {
            Some(password) => Some(AuthService::hash_password(password)?),
            None => None,
        };

        let result = sqlx::query(
            "UPDATE users SET \
             email = COALESCE(?2, email), \
             name = COALESCE(?3, name), \
             password_hash = COALESCE(?4, password_hash), \
             role = COALESCE(?5, role), \
             organization = COALESCE(?6, organization), \
             is_active = COALESCE(?7, is_active), \
             updated_at = ?8 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(req.email.clone())
        .bind(req.name.clone())
        .bind(password_hash)
        .bind(req.role.clone())
        .bind(req.organization.clone())
        .bind(req.is_active)
        .bind(Utc::now())
        .execute(&self.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::field("email", "A user with this email already exists")
            } else {
                AppError::Database(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        self.get_unscoped(id).await
    }

    /// Delete a visible user together with every metadata aggregate they
    /// own, in one transaction.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        if !ctx.is_admin() && ctx.user_id != id {
            return Err(AppError::NotFound("User not found".into()));
        }

        let mut tx = self.db.begin().await?;
        let owned = sqlx::query_scalar::<_, Uuid>("SELECT id FROM metadata WHERE user_id = ?1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        for metadata_id in owned {
            MetadataService::delete_aggregate(&mut tx, metadata_id).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        tx.commit().await?;
        Ok(())
    }

    /// True when at least one admin account exists.
    pub async fn admin_exists(&self) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
        )
        .bind(UserRole::Admin.as_str())
        .fetch_one(&self.db)
        .await?;
        Ok(count > 0)
    }

    async fn get_unscoped(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Derive a unique username from the email local part, appending a
    /// counter until it is free.
    async fn generate_username(&self, email: &str) -> Result<String> {
        let base = email.split('@').next().unwrap_or(email);
        let mut candidate = base.to_string();
        let mut counter = 1u32;
        loop {
            let taken =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?1")
                    .bind(candidate.clone())
                    .fetch_one(&self.db)
                    .await?;
            if taken == 0 {
                return Ok(candidate);
            }
            candidate = format!("{base}{counter}");
            counter += 1;
        }
    }
}
