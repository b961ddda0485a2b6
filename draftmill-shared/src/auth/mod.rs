/// Authentication
///
/// - `api_key`: key generation, hashing, and format validation
/// - `gate`: resolves a presented credential to an active account

pub mod api_key;
pub mod gate;

pub use gate::{AuthError, AuthGate};
