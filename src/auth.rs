//! Sign-in gate
//! Checks a username/password pair against configured bcrypt hashes and hands
//! the session an identity. Nothing below this module knows how sign-in works.

use crate::config::UserCredentials;
use bcrypt::{BcryptError, DEFAULT_COST};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// An already-authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub display_name: String,
}

/// Outcome of the latest sign-in attempt, as shown on the login screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// No attempt yet.
    #[default]
    Pending,
    Rejected,
    Authenticated(Identity),
}

/// Salted bcrypt hash at the default cost, the format stored in the config.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, DEFAULT_COST)
}

/// A malformed stored hash counts as a mismatch.
fn password_matches(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matches) => matches,
        Err(e) => {
            warn!(error = %e, "stored password hash is not valid bcrypt");
            false
        }
    }
}

/// Known users, keyed by username.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, UserCredentials>,
}

impl CredentialStore {
    pub fn new(users: BTreeMap<String, UserCredentials>) -> Self {
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn authenticate(&self, username: &str, password: &str) -> AuthStatus {
        let username = username.trim();
        match self.users.get(username) {
            Some(user) if password_matches(password, &user.password_hash) => {
                info!(username, "signed in");
                AuthStatus::Authenticated(Identity {
                    username: username.to_string(),
                    display_name: user.name.clone(),
                })
            }
            _ => {
                warn!(username, "sign-in rejected");
                AuthStatus::Rejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, password_hash: String) -> UserCredentials {
        UserCredentials {
            name: name.to_string(),
            email: None,
            password_hash,
        }
    }

    fn store() -> CredentialStore {
        let mut users = BTreeMap::new();
        // Lowest cost keeps the tests fast.
        users.insert(
            "edu".to_string(),
            user("Eduardo", bcrypt::hash("s3nha", 4).unwrap()),
        );
        users.insert(
            "ana".to_string(),
            user(
                "Ana",
                "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW".to_string(),
            ),
        );
        users.insert("broken".to_string(), user("Broken", "not-a-hash".to_string()));
        CredentialStore::new(users)
    }

    #[test]
    fn hashes_are_salted_bcrypt() {
        let first = hash_password("s3nha").unwrap();
        let second = hash_password("s3nha").unwrap();
        assert!(first.starts_with("$2b$12$"));
        assert_ne!(first, second);
        assert!(bcrypt::verify("s3nha", &first).unwrap());
    }

    #[test]
    fn externally_generated_hash_is_accepted() {
        let status = store().authenticate("ana", "U*U");
        assert!(matches!(status, AuthStatus::Authenticated(ref id) if id.display_name == "Ana"));
    }

    #[test]
    fn malformed_stored_hash_is_rejected() {
        assert_eq!(store().authenticate("broken", "not-a-hash"), AuthStatus::Rejected);
    }

    #[test]
    fn correct_password_yields_identity() {
        let status = store().authenticate(" edu ", "s3nha");
        assert_eq!(
            status,
            AuthStatus::Authenticated(Identity {
                username: "edu".to_string(),
                display_name: "Eduardo".to_string(),
            })
        );
    }

    #[test]
    fn wrong_password_or_unknown_user_is_rejected() {
        assert_eq!(store().authenticate("edu", "nope"), AuthStatus::Rejected);
        assert_eq!(store().authenticate("pietro", "s3nha"), AuthStatus::Rejected);
    }
}
