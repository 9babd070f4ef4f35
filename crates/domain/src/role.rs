use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

use crate::RoleId;

/// Minimum length of role and group names, counted in characters.
pub const ENTITY_NAME_MIN_LENGTH: usize = 2;

/// Maximum length of role and group names, counted in characters.
pub const ENTITY_NAME_MAX_LENGTH: usize = 50;

/// Validates and normalizes a role or group name.
///
/// Surrounding whitespace is trimmed before the length check.
pub fn validate_entity_name(kind: &str, name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if !(ENTITY_NAME_MIN_LENGTH..=ENTITY_NAME_MAX_LENGTH).contains(&length) {
        return Err(AppError::Validation(format!(
            "{kind} name must be between {ENTITY_NAME_MIN_LENGTH} and {ENTITY_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_owned())
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl Role {
    /// Creates a role with a validated name.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = validate_entity_name("role", name.into().as_str())?;

        Ok(Self {
            id,
            name,
            description: description.into(),
            created_at,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
