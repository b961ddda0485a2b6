/// Usage endpoint
///
/// Returns the calling account's consumption against its monthly limit.
///
/// # Endpoint
///
/// `GET /usage`
///
/// # Example Response
///
/// ```json
/// {
///   "email": "writer@example.com",
///   "tier": "free",
///   "usage_count": 3,
///   "monthly_limit": 10,
///   "remaining": 7
/// }
/// ```

use axum::{Extension, Json};
use draftmill_shared::models::account::Account;
use draftmill_shared::quota::QuotaSnapshot;
use serde::Serialize;

/// Usage response
#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    /// Account email
    pub email: String,

    /// Subscription tier
    pub tier: String,

    /// Jobs admitted this billing period
    pub usage_count: i32,

    /// Monthly ceiling
    pub monthly_limit: i32,

    /// Submissions left before QuotaExceeded
    pub remaining: i32,
}

/// Usage endpoint handler
///
/// Pure read of the authenticated account; no side effects.
pub async fn usage(Extension(account): Extension<Account>) -> Json<UsageResponse> {
    let snapshot = QuotaSnapshot::new(account.usage_count, account.monthly_limit);

    Json(UsageResponse {
        email: account.email,
        tier: account.tier,
        usage_count: snapshot.used,
        monthly_limit: snapshot.limit,
        remaining: snapshot.remaining(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_response_serialization() {
        let response = UsageResponse {
            email: "writer@example.com".to_string(),
            tier: "free".to_string(),
            usage_count: 3,
            monthly_limit: 10,
            remaining: 7,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"usage_count\":3"));
        assert!(json.contains("\"monthly_limit\":10"));
        assert!(json.contains("\"remaining\":7"));
    }
}
