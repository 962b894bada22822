//! Authentication module
//!
//! The Feedbin API uses HTTP Basic credentials. Requests without credentials
//! are sent as-is.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
