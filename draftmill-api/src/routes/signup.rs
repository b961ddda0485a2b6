/// Signup endpoint
///
/// Registers a new account and returns its API key. The key is shown
/// exactly once; only its hash is stored.
///
/// # Endpoint
///
/// `POST /signup`
///
/// # Example Request
///
/// ```json
/// { "email": "writer@example.com" }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "api_key": "acc_abcd1234efgh5678ijkl9012mnop3456",
///   "tier": "free",
///   "monthly_limit": 10
/// }
/// ```

use crate::app::AppState;
use crate::error::ApiError;
use axum::{extract::State, Json};
use draftmill_shared::auth::api_key::generate_api_key;
use draftmill_shared::models::account::{Account, CreateAccount, SubscriptionTier};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address; must not already be registered
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Signup response
#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    /// The plaintext API key (keep it secret, it cannot be re-fetched)
    pub api_key: String,

    /// Assigned tier
    pub tier: String,

    /// Monthly job allowance for that tier
    pub monthly_limit: i32,
}

/// Signup endpoint handler
///
/// New accounts always start on the free tier. A duplicate email is
/// rejected with 409 via the unique constraint, so two racing signups for
/// the same address can never both succeed.
///
/// # Errors
///
/// - 409 Conflict: email already registered
/// - 422 Unprocessable Entity: malformed email
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    request.validate()?;

    tracing::info!(email = %request.email, "signup attempt");

    let (api_key, api_key_hash) = generate_api_key();

    let account = Account::create(
        &state.db,
        CreateAccount {
            email: request.email,
            api_key_hash,
            tier: SubscriptionTier::Free,
        },
    )
    .await?;

    tracing::info!(account_id = %account.id, email = %account.email, "signup successful");

    Ok(Json(SignupResponse {
        api_key,
        tier: account.tier,
        monthly_limit: account.monthly_limit,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            email: "writer@example.com".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = SignupRequest {
            email: "not-an-email".to_string(),
        };
        assert!(invalid.validate().is_err());

        let empty = SignupRequest {
            email: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_signup_response_serialization() {
        let response = SignupResponse {
            api_key: "acc_abcd1234efgh5678ijkl9012mnop3456".to_string(),
            tier: "free".to_string(),
            monthly_limit: 10,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("api_key"));
        assert!(json.contains("\"tier\":\"free\""));
        assert!(json.contains("\"monthly_limit\":10"));
    }
}
