//! Authentication validator
//!
//! Checks a login attempt against the user directory.

use subtle::ConstantTimeEq;

use crate::auth::credentials::{AuthMethod, User, UserDirectory};
use crate::error::AuthError;

/// Validates a user name and password pair.
///
/// Passwords are compared in constant time. The error says why the attempt
/// failed so it can be logged; callers must not pass that reason on.
pub fn validate_login<'a>(
    directory: &'a UserDirectory,
    username: &str,
    password: &str,
) -> Result<&'a User, AuthError> {
    let user = directory
        .get(username)
        .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;

    match &user.auth_method {
        AuthMethod::Password => {
            if bool::from(user.password.as_bytes().ct_eq(password.as_bytes())) {
                Ok(user)
            } else {
                Err(AuthError::InvalidPassword(user.name.clone()))
            }
        }
        AuthMethod::Unsupported(method) => Err(AuthError::UnsupportedMethod {
            user: user.name.clone(),
            method: method.clone(),
        }),
    }
}
