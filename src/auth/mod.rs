/// Authentication module
///
/// Token issuance/verification, password hashing, and the auth service
/// orchestrating the token lifecycle.

mod claims;
mod password;
mod service;
mod token;

pub use claims::Claims;
pub use claims::TokenPurpose;
pub use password::hash_password;
pub use password::verify_password;
pub use service::AuthService;
pub use service::TokenPair;
pub use token::issue_token;
pub use token::token_fingerprint;
pub use token::verify_token;
