//! Identity lookup by phone number (or the fixed admin token).
//!
//! This is an identity *lookup*, not authentication: no password, token, or
//! cryptographic verification is performed, and none should be added here
//! without a real credential store behind it. The caller supplies the role
//! of the portal being entered; a mismatch with the stored role is an
//! access-denied error.

use std::time::Duration;

use tracing::warn;

use crate::db::Database;
use crate::error::{BoxguardError, Result};
use crate::models::{User, UserRole};

/// Strip separator characters so "555-0101", "(555) 0101", and "5550101"
/// all resolve to the same identity.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '(' | ')' | ' '))
        .collect()
}

/// Identity resolution over the canonical store
pub struct ServerAuth {
    db: Database,
    login_delay: Duration,
    admin_token: String,
}

impl ServerAuth {
    /// Create an authenticator over the given store. `admin_token` is a
    /// fixed identifier resolving to the admin account; `login_delay_ms`
    /// simulates the latency of a real credential check.
    #[must_use]
    pub fn new(db: Database, login_delay_ms: u64, admin_token: impl Into<String>) -> Self {
        Self {
            db,
            login_delay: Duration::from_millis(login_delay_ms),
            admin_token: admin_token.into(),
        }
    }

    /// Resolve an identifier to a user and confirm the portal role matches.
    pub async fn verify_identity(&self, identifier: &str, expected_role: UserRole) -> Result<User> {
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }

        let normalized = normalize_identifier(identifier);
        let snapshot = self.db.get()?;

        let user = if normalized == self.admin_token {
            snapshot
                .users
                .iter()
                .find(|u| u.role == UserRole::Admin)
                .cloned()
        } else {
            snapshot
                .users
                .iter()
                .find(|u| {
                    u.phone
                        .as_deref()
                        .is_some_and(|p| normalize_identifier(p) == normalized)
                })
                .cloned()
        }
        .ok_or_else(|| BoxguardError::AccessDenied("Identity not found in registry".to_string()))?;

        if user.role != expected_role {
            warn!(
                identifier,
                stored = %user.role,
                requested = %expected_role,
                "Role mismatch on login attempt"
            );
            return Err(BoxguardError::AccessDenied(format!(
                "User role ({}) does not match the requested portal ({expected_role})",
                user.role
            )));
        }

        Ok(user)
    }
}
