//! Mock operator session.
//!
//! There is no real authentication: any non-empty username/password pair
//! yields a session with a locally generated token.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub token: String,
}

impl Session {
    /// Create a session from login form input
    pub fn login(username: &str, password: &str) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(ConsoleError::session("username and password must not be empty"));
        }
        Ok(Self {
            username: username.to_string(),
            token: format!("mock-{}", crate::unix_millis()),
        })
    }
}

/// Fail unless someone is logged in
pub fn require(session: Option<&Session>) -> Result<&Session> {
    session.ok_or_else(|| ConsoleError::session("not logged in; run `login` first"))
}
