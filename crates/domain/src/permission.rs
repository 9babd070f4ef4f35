use serde::{Deserialize, Serialize};
use warden_core::{AppResult, NonEmptyString};

use crate::PermissionId;

/// An atomic capability: an `action` on a `resource`, addressed by a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: NonEmptyString,
    resource: NonEmptyString,
    action: NonEmptyString,
}

impl Permission {
    /// Creates a permission with validated fields.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name.into().trim())?,
            resource: NonEmptyString::new(resource.into().trim())?,
            action: NonEmptyString::new(action.into().trim())?,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name checked by endpoints.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the protected resource.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the action allowed on the resource.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }
}
