//! Login accounts and server-side sessions

use super::repository::UserRepository;
use crate::contract::ReportingError;
use chrono::{DateTime, Utc};
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_HASH_COST: u32 = 10;
const MAX_SESSIONS: u64 = 10_000;

/// Authenticated session held in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    sessions: Cache<String, Session>,
    hash_cost: u32,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, session_ttl: Duration) -> Self {
        Self {
            users,
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_live(session_ttl)
                .build(),
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    /// Override the bcrypt cost used for new password hashes
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Verify credentials and open a session
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ReportingError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ReportingError::InvalidCredentials);
        }

        let user = self
            .users
            .find(username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load user");
                ReportingError::Internal
            })?
            .ok_or(ReportingError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password_hash).unwrap_or(false) {
            tracing::warn!(username = %username, "Rejected login");
            return Err(ReportingError::InvalidCredentials);
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            created_at: Utc::now(),
        };
        self.sessions.insert(session.id.clone(), session.clone());
        tracing::info!(username = %session.username, "User logged in");
        Ok(session)
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.sessions.get(id)
    }

    pub fn logout(&self, id: &str) {
        self.sessions.invalidate(id);
    }

    /// Create the account, or reset its password when it already exists
    pub async fn ensure_user(&self, username: &str, password: &str) -> Result<(), ReportingError> {
        if username.trim().is_empty() {
            return Err(ReportingError::invalid("username", "This field is required."));
        }
        if password.is_empty() {
            return Err(ReportingError::invalid("password", "This field is required."));
        }

        let hash = bcrypt::hash(password, self.hash_cost).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            ReportingError::Internal
        })?;
        self.users
            .upsert(username.trim(), &hash)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to store user");
                ReportingError::Internal
            })?;
        Ok(())
    }
}
