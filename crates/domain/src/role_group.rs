use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::AppResult;

use crate::{GroupId, validate_entity_name};

/// A named bundle of roles assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroup {
    id: GroupId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl RoleGroup {
    /// Creates a role group with a validated name.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = validate_entity_name("group", name.into().as_str())?;

        Ok(Self {
            id,
            name,
            description: description.into(),
            created_at,
        })
    }

    /// Returns the group identifier.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the unique group name.
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
