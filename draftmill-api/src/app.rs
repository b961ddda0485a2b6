/// Application state and router builder
///
/// Defines the shared application state and builds the axum router with all
/// routes and middleware. Every service object (auth gate, admission,
/// rate limiter) is constructed once here and passed by handle; there are
/// no process-wide singletons.
///
/// # Example
///
/// ```no_run
/// use draftmill_api::{app::AppState, config::Config};
/// use draftmill_shared::admission::AdmissionService;
/// use draftmill_shared::queue::work_queue;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let (queue, _receiver) = work_queue();
/// let admission = AdmissionService::new(pool.clone(), queue);
///
/// let state = AppState::new(pool, admission, config);
/// let app = draftmill_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::rate_limit::RateLimiter};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use draftmill_shared::admission::AdmissionService;
use draftmill_shared::auth::gate::AuthGate;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Shared application state
///
/// Cloned for each request handler via axum's `State` extractor; all fields
/// are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Credential resolution
    pub gate: AuthGate,

    /// Submission admission service (validation + quota + queue hand-off)
    pub admission: AdmissionService,

    /// Per-IP submit rate limiter
    pub rate_limiter: Arc<RateLimiter>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, admission: AdmissionService, config: Config) -> Self {
        let gate = AuthGate::new(db.clone());
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.submit_per_hour));

        Self {
            db,
            gate,
            admission,
            rate_limiter,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health             # Health check (public)
/// ├── POST /signup             # Account creation (public)
/// ├── POST /generate           # Submit a job (API key + rate limit)
/// ├── GET  /status/:job_id     # Poll a job (API key)
/// ├── GET  /usage              # Usage snapshot (API key)
/// └── /admin                   # Reporting (admin bearer token)
///     ├── GET /stats
///     ├── GET /users
///     └── GET /costs
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes, no auth
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::signup::signup));

    // Submission (API key auth runs first, then the per-IP limiter)
    let submit_routes = Router::new()
        .route("/generate", post(routes::submit::submit_job))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            api_key_auth_layer,
        ));

    // Read paths for authenticated accounts
    let account_routes = Router::new()
        .route("/status/:job_id", get(routes::status::job_status))
        .route("/usage", get(routes::usage::usage))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            api_key_auth_layer,
        ));

    // Reporting, gated on the configured admin token
    let admin_routes = Router::new()
        .route("/stats", get(routes::admin::platform_stats))
        .route("/users", get(routes::admin::list_accounts))
        .route("/costs", get(routes::admin::cost_report))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(submit_routes)
        .merge(account_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API key authentication middleware layer
///
/// Resolves the `X-API-Key` header through the auth gate and injects the
/// account into request extensions for handlers to pick up.
async fn api_key_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let account = state.gate.authenticate(api_key).await?;

    req.extensions_mut().insert(account);

    Ok(next.run(req).await)
}

/// Admin authentication middleware layer
///
/// The reporting endpoints require `Authorization: Bearer <ADMIN_TOKEN>`.
/// Without a configured token they are unavailable rather than open.
async fn admin_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let Some(expected) = state.config.admin.token.as_deref() else {
        return Err(crate::error::ApiError::ServiceUnavailable(
            "Admin access is not configured".to_string(),
        ));
    };

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    if token != expected {
        tracing::warn!("rejected admin request with invalid token");
        return Err(crate::error::ApiError::Forbidden(
            "Invalid admin token".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
