//! Session management
//!
//! Issues signed bearer tokens on login, resolves them back to identities, and
//! keeps the set of revoked token ids. A revoked id stays revoked for the
//! lifetime of the process, even after the token would have expired.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::credentials::UserDirectory;
use crate::auth::identity::Identity;
use crate::auth::validator::validate_login;
use crate::error::{AuthError, SessionError};

/// Default validity window of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Name of the user the token is bound to.
    pub sub: String,
    /// Unique token id, the unit of revocation.
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

/// Token handed back to a successful login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub jti: String,
    pub expires_at: u64,
}

/// Result of a successful logout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedSession {
    pub user: String,
    pub jti: String,
}

pub struct SessionManager {
    users: Arc<UserDirectory>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    revoked: RwLock<HashSet<String>>,
}

impl SessionManager {
    pub fn new(users: Arc<UserDirectory>, secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            revoked: RwLock::new(HashSet::new()),
        }
    }

    /// Authenticates a user and mints a token bound to them.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = match validate_login(&self.users, username, password) {
            Ok(user) => user,
            Err(e) => {
                warn!("Login failure: {e}");
                return Err(e);
            }
        };

        let now = get_current_timestamp();
        let claims = Claims {
            sub: user.name.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        info!("User {} successful login", user.name);
        Ok(IssuedToken {
            access_token,
            jti: claims.jti,
            expires_at: claims.exp,
        })
    }

    /// Resolves a presented token to the identity of the caller.
    ///
    /// Missing, malformed, expired or revoked tokens, and tokens whose user no
    /// longer exists, all resolve to [`Identity::Guest`].
    pub fn resolve_identity(&self, token: Option<&str>) -> Identity {
        let Some(claims) = token.and_then(|t| self.decode_claims(t)) else {
            return Identity::Guest;
        };

        if self.is_revoked(&claims.jti) {
            debug!("Token {} of {} is revoked", claims.jti, claims.sub);
            return Identity::Guest;
        }

        match self.users.get(&claims.sub) {
            Some(user) => user.identity(),
            None => {
                debug!("Token bound to unknown user {}", claims.sub);
                Identity::Guest
            }
        }
    }

    /// Returns whether the token id has been revoked.
    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(jti)
    }

    /// Revokes the presented token.
    ///
    /// A second revocation of the same token is rejected rather than ignored.
    pub fn revoke(&self, token: Option<&str>) -> Result<RevokedSession, SessionError> {
        let claims = token
            .and_then(|t| self.decode_claims(t))
            .ok_or(SessionError::NoActiveSession)?;

        let inserted = self
            .revoked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(claims.jti.clone());
        if !inserted {
            return Err(SessionError::AlreadyRevoked(claims.jti));
        }

        info!("User {} successful logout", claims.sub);
        Ok(RevokedSession {
            user: claims.sub,
            jti: claims.jti,
        })
    }

    /// Verifies signature and expiry; revocation is checked by the callers.
    fn decode_claims(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Rejected bearer token: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn manager() -> SessionManager {
        let users = serde_json::from_str(
            r#"[
                {"name": "bob", "password": "bob123", "groups": ["Editors"]},
                {"name": "carol", "auth_method": "ldap"}
            ]"#,
        )
        .unwrap();
        let directory = UserDirectory::from_users(users).unwrap();
        SessionManager::new(Arc::new(directory), SECRET, DEFAULT_TOKEN_TTL)
    }

    fn forge(sub: &str, exp: u64) -> String {
        let claims = Claims {
            sub: sub.into(),
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    #[test]
    fn login_issues_token_for_the_user() {
        let sessions = manager();
        let token = sessions.login("bob", "bob123").unwrap();
        assert!(token.expires_at > get_current_timestamp());

        let identity = sessions.resolve_identity(Some(&token.access_token));
        assert_eq!(identity, Identity::user("bob", vec!["Editors".into()]));
    }

    #[test]
    fn oversized_lifetime_saturates() {
        let users = UserDirectory::from_users(
            serde_json::from_str(r#"[{"name": "bob", "password": "pw"}]"#).unwrap(),
        )
        .unwrap();
        let sessions = SessionManager::new(Arc::new(users), SECRET, Duration::from_secs(u64::MAX));

        let token = sessions.login("bob", "pw").unwrap();
        assert_eq!(token.expires_at, u64::MAX);
        assert!(!sessions.resolve_identity(Some(&token.access_token)).is_guest());
    }

    #[test]
    fn tokens_carry_unique_ids() {
        let sessions = manager();
        let first = sessions.login("bob", "bob123").unwrap();
        let second = sessions.login("bob", "bob123").unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn bad_logins_fail() {
        let sessions = manager();
        assert!(sessions.login("bob", "wrong").is_err());
        assert!(sessions.login("nobody", "bob123").is_err());
        assert!(sessions.login("carol", "").is_err());
    }

    #[test]
    fn absent_or_garbage_tokens_resolve_to_guest() {
        let sessions = manager();
        assert_eq!(sessions.resolve_identity(None), Identity::Guest);
        assert_eq!(sessions.resolve_identity(Some("not-a-token")), Identity::Guest);

        let foreign = encode(
            &Header::default(),
            &Claims {
                sub: "bob".into(),
                jti: "x".into(),
                iat: 0,
                exp: get_current_timestamp() + 60,
            },
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();
        assert_eq!(sessions.resolve_identity(Some(&foreign)), Identity::Guest);
    }

    #[test]
    fn expired_token_resolves_to_guest() {
        let sessions = manager();
        let expired = forge("bob", get_current_timestamp() - 10);
        assert_eq!(sessions.resolve_identity(Some(&expired)), Identity::Guest);
        assert_eq!(
            sessions.revoke(Some(&expired)),
            Err(SessionError::NoActiveSession)
        );
    }

    #[test]
    fn deleted_user_resolves_to_guest() {
        let sessions = manager();
        let orphan = forge("mallory", get_current_timestamp() + 60);
        assert_eq!(sessions.resolve_identity(Some(&orphan)), Identity::Guest);
    }

    #[test]
    fn revoke_is_observable_and_terminal() {
        let sessions = manager();
        let token = sessions.login("bob", "bob123").unwrap();

        let revoked = sessions.revoke(Some(&token.access_token)).unwrap();
        assert_eq!(revoked.user, "bob");
        assert_eq!(revoked.jti, token.jti);
        assert!(sessions.is_revoked(&token.jti));

        assert_eq!(
            sessions.revoke(Some(&token.access_token)),
            Err(SessionError::AlreadyRevoked(token.jti.clone()))
        );
        assert_eq!(
            sessions.resolve_identity(Some(&token.access_token)),
            Identity::Guest
        );
    }

    #[test]
    fn revoke_without_token_has_no_session() {
        let sessions = manager();
        assert_eq!(sessions.revoke(None), Err(SessionError::NoActiveSession));
        assert_eq!(
            sessions.revoke(Some("garbage")),
            Err(SessionError::NoActiveSession)
        );
    }

    #[test]
    fn revoking_one_token_keeps_others_valid() {
        let sessions = manager();
        let first = sessions.login("bob", "bob123").unwrap();
        let second = sessions.login("bob", "bob123").unwrap();

        sessions.revoke(Some(&first.access_token)).unwrap();
        assert!(!sessions.is_revoked(&second.jti));
        assert!(!sessions.resolve_identity(Some(&second.access_token)).is_guest());
    }
}
