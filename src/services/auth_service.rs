//! Authentication service.
//!
//! Handles user authentication, JWT token management, and password hashing.
//! The resolved identity is handed to the core as an explicit
//! [`RequestContext`](crate::services::access::RequestContext); nothing else
//! in the system re-validates credentials.

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::user::{User, UserRole};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Email (login key)
    pub email: String,
    /// Display name
    pub name: String,
    /// Role
    pub role: UserRole,
    /// Organization
    pub organization: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Authentication service
pub struct AuthService {
    db: SqlitePool,
    config: Arc<Config>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(db: SqlitePool, config: Arc<Config>) -> Self {
        let secret = config.jwt_secret.clone();
        Self {
            db,
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Authenticate a user with email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(User, TokenPair)> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ?1 AND is_active = 1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        let password_hash = user
            .password_hash
            .as_ref()
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?
        {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        sqlx::query("UPDATE users SET last_login_at = ?2 WHERE id = ?1")
            .bind(user.id)
            .bind(Utc::now())
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Generate access and refresh tokens for a user
    pub fn generate_tokens(&self, user: &User) -> Result<TokenPair> {
        let now = Utc::now();
        let access_exp = now + Duration::minutes(self.config.jwt_access_token_expiry_minutes);
        let refresh_exp = now + Duration::days(self.config.jwt_refresh_token_expiry_days);

        let access_claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            organization: user.organization.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            token_type: "access".to_string(),
        };

        let refresh_claims = Claims {
            token_type: "refresh".to_string(),
            exp: refresh_exp.timestamp(),
            ..access_claims.clone()
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: (self.config.jwt_access_token_expiry_minutes * 60).max(0) as u64,
        })
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let data = self.decode_token(token)?;
        if data.claims.token_type != "access" {
            return Err(AppError::Authentication("Not an access token".to_string()));
        }
        Ok(data.claims)
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<(User, TokenPair)> {
        let data = self.decode_token(refresh_token)?;
        if data.claims.token_type != "refresh" {
            return Err(AppError::Authentication("Not a refresh token".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?1 AND is_active = 1",
        )
        .bind(data.claims.sub)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Authentication("User no longer active".to_string()))?;

        let tokens = self.generate_tokens(&user)?;
        Ok((user, tokens))
    }

    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data)
    }

    /// Hash a password with bcrypt
    pub fn hash_password(password: &str) -> Result<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "correct horse battery staple";
        let hashed = AuthService::hash_password(password).unwrap();
        assert_ne!(hashed, password);
        assert!(AuthService::verify_password(password, &hashed).unwrap());
        assert!(!AuthService::verify_password("wrong password", &hashed).unwrap());
    }
}
