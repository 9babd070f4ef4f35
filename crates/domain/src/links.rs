//! Join relations of the permission graph.
//!
//! Each link is identified by its composite key; storing the same pair twice
//! is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::UserId;

use crate::{GroupId, PermissionId, RoleId};

/// Grants a permission to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    /// Granted role.
    pub role_id: RoleId,
    /// Granted permission.
    pub permission_id: PermissionId,
}

/// Places a role inside a role group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRole {
    /// Containing group.
    pub group_id: GroupId,
    /// Contained role.
    pub role_id: RoleId,
}

/// Makes a user a member of a role group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Member user.
    pub user_id: UserId,
    /// Group joined.
    pub group_id: GroupId,
    /// When the membership was created.
    pub assigned_at: DateTime<Utc>,
}
