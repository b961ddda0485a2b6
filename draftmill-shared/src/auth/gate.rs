/// Auth gate
///
/// Resolves the credential presented on a request to an active account, or
/// rejects the call. Used by every operation except signup and health. The
/// gate has no side effects; `last_used_at` is stamped by admission, not
/// here.
///
/// Unknown keys and keys belonging to deactivated accounts are rejected
/// identically, so a caller cannot probe which keys exist.
///
/// # Example
///
/// ```no_run
/// use draftmill_shared::auth::gate::AuthGate;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let gate = AuthGate::new(pool);
///
/// let account = gate.authenticate(Some("acc_abcdefghijklmnopqrstuvwxyz123456")).await?;
/// println!("authenticated {}", account.email);
/// # Ok(())
/// # }
/// ```

use crate::auth::api_key::hash_api_key;
use crate::models::account::Account;
use sqlx::PgPool;
use thiserror::Error;

/// Authentication failure
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was supplied with the request
    #[error("API key required")]
    MissingCredential,

    /// The credential does not map to an active account
    #[error("invalid API key")]
    InvalidCredential,

    /// Account store lookup failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Credential resolution service
///
/// Constructed once at startup and shared by handle; holds only the pool.
#[derive(Clone)]
pub struct AuthGate {
    db: PgPool,
}

impl AuthGate {
    /// Creates a new auth gate
    pub fn new(db: PgPool) -> Self {
        AuthGate { db }
    }

    /// Resolves a presented credential to an active account
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredential`] when `credential` is `None` or blank
    /// - [`AuthError::InvalidCredential`] when the key is unknown or the
    ///   account is inactive
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<Account, AuthError> {
        let key = match credential {
            Some(key) if !key.trim().is_empty() => key.trim(),
            _ => return Err(AuthError::MissingCredential),
        };

        let key_hash = hash_api_key(key);

        let account = Account::find_active_by_key_hash(&self.db, &key_hash)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::MissingCredential.to_string(), "API key required");
        assert_eq!(AuthError::InvalidCredential.to_string(), "invalid API key");
    }
}
