/// Account model and database operations
///
/// Accounts are the registered callers of the service. Each account holds a
/// hashed API key, a subscription tier, and a monthly usage counter that the
/// admission path increments atomically.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     api_key_hash VARCHAR(64) NOT NULL UNIQUE,
///     tier VARCHAR(20) NOT NULL DEFAULT 'free',
///     usage_count INTEGER NOT NULL DEFAULT 0,
///     monthly_limit INTEGER NOT NULL DEFAULT 10,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use draftmill_shared::auth::api_key::generate_api_key;
/// use draftmill_shared::models::account::{Account, CreateAccount, SubscriptionTier};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let (plaintext, hash) = generate_api_key();
///
/// let account = Account::create(&pool, CreateAccount {
///     email: "writer@example.com".to_string(),
///     api_key_hash: hash,
///     tier: SubscriptionTier::Free,
/// }).await?;
///
/// println!("created {} (limit {}/month)", account.id, account.monthly_limit);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Subscription tier determining the default monthly allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// Entry tier, 10 jobs per month
    Free,

    /// Paid tier, 100 jobs per month
    Pro,

    /// Contract tier, 1000 jobs per month
    Enterprise,
}

impl SubscriptionTier {
    /// Converts tier to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }

    /// Default monthly job allowance for this tier
    pub fn monthly_limit(&self) -> i32 {
        match self {
            SubscriptionTier::Free => 10,
            SubscriptionTier::Pro => 100,
            SubscriptionTier::Enterprise => 1000,
        }
    }

    /// Parses a stored tier string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(SubscriptionTier::Free),
            "pro" => Some(SubscriptionTier::Pro),
            "enterprise" => Some(SubscriptionTier::Enterprise),
            _ => None,
        }
    }
}

/// Account model representing a registered caller
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID
    pub id: Uuid,

    /// Email address, unique across all accounts
    pub email: String,

    /// SHA-256 hash of the API key (plaintext keys are never stored)
    pub api_key_hash: String,

    /// Subscription tier ("free", "pro", "enterprise")
    pub tier: String,

    /// Jobs admitted in the current billing period
    pub usage_count: i32,

    /// Ceiling for `usage_count` within the billing period
    pub monthly_limit: i32,

    /// Inactive accounts fail authentication
    pub active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Last accepted submission (None if never used)
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Email address (uniqueness enforced by the store)
    pub email: String,

    /// SHA-256 hash of the generated API key
    pub api_key_hash: String,

    /// Tier, also fixing the default monthly limit
    pub tier: SubscriptionTier,
}

impl Account {
    /// Creates a new account
    ///
    /// The monthly limit is derived from the tier. Fails with a unique
    /// constraint violation if the email is already registered.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, api_key_hash, tier, monthly_limit)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, api_key_hash, tier, usage_count, monthly_limit,
                      active, created_at, last_used_at
            "#,
        )
        .bind(data.email)
        .bind(data.api_key_hash)
        .bind(data.tier.as_str())
        .bind(data.tier.monthly_limit())
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an active account by API key hash
    ///
    /// Inactive accounts are filtered out here so the auth gate cannot
    /// distinguish them from unknown keys.
    pub async fn find_active_by_key_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, api_key_hash, tier, usage_count, monthly_limit,
                   active, created_at, last_used_at
            FROM accounts
            WHERE api_key_hash = $1 AND active = TRUE
            "#,
        )
        .bind(key_hash)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Atomically consumes one unit of monthly allowance
    ///
    /// Performs the limit check and the increment as a single conditional
    /// update, so two racing admissions for the same account can never push
    /// `usage_count` past `monthly_limit`. Also stamps `last_used_at`.
    ///
    /// Returns the post-increment `(usage_count, monthly_limit)` pair, or
    /// `None` when the account is already at its limit (nothing mutated).
    pub async fn consume_quota<'e, E>(
        executor: E,
        account_id: Uuid,
    ) -> Result<Option<(i32, i32)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: Option<(i32, i32)> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET usage_count = usage_count + 1,
                last_used_at = NOW()
            WHERE id = $1 AND usage_count < monthly_limit
            RETURNING usage_count, monthly_limit
            "#,
        )
        .bind(account_id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    /// Counts all accounts
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts active accounts
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE active = TRUE")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Lists all accounts, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, api_key_hash, tier, usage_count, monthly_limit,
                   active, created_at, last_used_at
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }

    /// Parses the stored tier string
    pub fn subscription_tier(&self) -> Option<SubscriptionTier> {
        SubscriptionTier::parse(&self.tier)
    }
}
