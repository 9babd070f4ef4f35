use serde::{Deserialize, Serialize};

use crate::UserId;

/// Authenticated principal attached to an admitted request.
///
/// Built by the authorization middleware once the bearer token has been
/// verified and the principal's permissions resolved from the permission
/// graph. Downstream handlers receive it by value from request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    subject: UserId,
    username: String,
    permissions: Vec<String>,
}

impl AuthContext {
    /// Creates a request context from the token subject and resolved grants.
    #[must_use]
    pub fn new(subject: UserId, username: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            subject,
            username: username.into(),
            permissions,
        }
    }

    /// Returns the token subject.
    #[must_use]
    pub fn subject(&self) -> UserId {
        self.subject
    }

    /// Returns the username claimed by the token, empty when absent.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns whether the effective permissions include `permission_name`.
    #[must_use]
    pub fn has_permission(&self, permission_name: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| granted == permission_name)
    }
}
