use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The single fixed account allowed to use the viewer.
/// Only the SHA-256 digest of the password is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    /// Lower-case hex SHA-256 of the password.
    pub password_sha256: String,
}

impl Credentials {
    /// Build credentials from a plain-text password.
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_sha256: password_digest(password),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username
            && password_digest(password).eq_ignore_ascii_case(self.password_sha256.trim())
    }
}

/// Lower-case hex SHA-256 of `password`.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Per-session access state. Created unauthenticated, flipped by a successful
/// login and cleared by logout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    user: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The logged-in user, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Check `username`/`password` against `credentials`.
    ///
    /// A failed attempt leaves the session unauthenticated and reports the
    /// same error whichever half was wrong.
    pub fn login(
        &mut self,
        credentials: &Credentials,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if credentials.verify(username, password) {
            log::info!("user '{username}' logged in");
            self.authenticated = true;
            self.user = Some(username.to_string());
            Ok(())
        } else {
            log::warn!("rejected login attempt for user '{username}'");
            self.logout();
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("user '{user}' logged out");
        }
        self.authenticated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("admin", "s3cret")
    }

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        assert_eq!(
            password_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn correct_credentials_authenticate() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());

        session.login(&creds(), "admin", "s3cret").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user(), Some("admin"));
    }

    #[test]
    fn uppercase_stored_digest_still_matches() {
        let mut stored = creds();
        stored.password_sha256 = stored.password_sha256.to_uppercase();
        assert!(stored.verify("admin", "s3cret"));
    }

    #[test]
    fn wrong_username_or_password_is_rejected_generically() {
        for (user, pass) in [("admin", "wrong"), ("root", "s3cret"), ("", ""), ("Admin", "s3cret")] {
            let mut session = Session::new();
            let err = session.login(&creds(), user, pass).unwrap_err();
            assert_eq!(err, AuthError::InvalidCredentials);
            assert_eq!(err.to_string(), "Invalid username or password");
            assert!(!session.is_authenticated());
        }
    }

    #[test]
    fn logout_clears_the_flag() {
        let mut session = Session::new();
        session.login(&creds(), "admin", "s3cret").unwrap();
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
    }
}
