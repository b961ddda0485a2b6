/// API route handlers
///
/// - `signup`: account creation (public)
/// - `submit`: job submission (authenticated, rate limited)
/// - `status`: job polling (authenticated)
/// - `usage`: per-account usage snapshot (authenticated)
/// - `admin`: platform reporting (admin token)
/// - `health`: liveness and database probe (public)

pub mod admin;
pub mod health;
pub mod signup;
pub mod status;
pub mod submit;
pub mod usage;
