//! Authentication system
//!
//! Handles the user directory, credential validation, caller identities and
//! the session token lifecycle.

pub mod credentials;
pub mod identity;
pub mod session;
pub mod validator;

pub use credentials::{AuthMethod, User, UserDirectory};
pub use identity::{GUEST_NAME, Identity};
pub use session::{Claims, DEFAULT_TOKEN_TTL, IssuedToken, RevokedSession, SessionManager};
pub use validator::validate_login;
