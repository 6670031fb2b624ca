// src/gate.rs
// Shared-secret gate in front of the chat shell

/// Password the gate opens for unless configured otherwise
pub const DEFAULT_PASSWORD: &str = "WECKY";

/// Title shown above the password prompt
pub const TITLE: &str = "Me";

/// Subtitle shown above the password prompt
pub const SUBTITLE: &str = "Enter to reflect";

/// Shown after a wrong password
pub const INCORRECT: &str = "Incorrect password";

/// Session-scoped placeholder gate.
///
/// Exact string equality against one fixed secret, nothing more: no
/// hashing, no attempt counting, no lockout. Not an authentication system.
#[derive(Debug, Clone)]
pub struct Gate {
    secret: String,
    authenticated: bool,
    error: bool,
}

impl Gate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            authenticated: false,
            error: false,
        }
    }

    /// Check a candidate. The candidate is consumed either way, which clears
    /// the caller's input on mismatch.
    pub fn submit(&mut self, candidate: String) -> bool {
        if candidate == self.secret {
            self.authenticated = true;
            self.error = false;
        } else {
            self.error = true;
        }
        self.authenticated
    }

    /// The user started typing again
    pub fn edit(&mut self) {
        self.error = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD)
    }
}
