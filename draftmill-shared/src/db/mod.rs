/// Database layer
///
/// - `pool`: connection pool construction and health probing
/// - `migrations`: embedded schema migrations

pub mod migrations;
pub mod pool;
