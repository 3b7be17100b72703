//! Login credential check.
//!
//! This is a placeholder gate in front of the desk, not an authentication
//! system: one configured username/password pair, compared exactly. There is no
//! hashing, rate limiting, or lockout.

use std::fmt;

/// The single username/password pair the desk accepts, fixed at start-up.
///
/// Either half may be absent (the environment did not provide it); in that case
/// every login attempt fails.
#[derive(Clone, Default)]
pub struct CredentialChecker {
    username: Option<String>,
    password: Option<String>,
}

impl CredentialChecker {
    /// Creates a checker for the configured pair.
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    /// Returns `true` if both halves of the pair are configured.
    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Returns `true` iff `username` and `password` both equal the configured
    /// values. Comparison is case-sensitive and performs no trimming.
    pub fn check(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(expected_user), Some(expected_pass)) => {
                expected_user == username && expected_pass == password
            }
            _ => false,
        }
    }
}

// The password must never reach a log line.
impl fmt::Debug for CredentialChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChecker")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> CredentialChecker {
        CredentialChecker::new(Some("editor".into()), Some("s3cret".into()))
    }

    #[test]
    fn exact_match_is_accepted() {
        assert!(checker().check("editor", "s3cret"));
    }

    #[test]
    fn any_mismatch_is_rejected() {
        let c = checker();
        assert!(!c.check("Editor", "s3cret"));
        assert!(!c.check("editor", "S3cret"));
        assert!(!c.check(" editor", "s3cret"));
        assert!(!c.check("editor", "s3cret "));
        assert!(!c.check("", ""));
    }

    #[test]
    fn unconfigured_pair_rejects_everything() {
        let c = CredentialChecker::new(None, Some("s3cret".into()));
        assert!(!c.is_configured());
        assert!(!c.check("", "s3cret"));
        assert!(!CredentialChecker::default().check("", ""));
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let rendered = format!("{:?}", checker());
        assert!(rendered.contains("editor"));
        assert!(!rendered.contains("s3cret"));
    }
}
