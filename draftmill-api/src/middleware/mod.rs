/// HTTP middleware
///
/// - `rate_limit`: per-IP token bucket applied to the submit path

pub mod rate_limit;
