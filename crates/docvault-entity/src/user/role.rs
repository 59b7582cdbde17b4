//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the records-management RBAC system.
///
/// Roles are ordered by privilege level:
/// Admin > RecordsManager > Contributor > Viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full system administrator.
    Admin,
    /// Manages classifications, retention policies, and lifecycle rules.
    RecordsManager,
    /// Can create, edit, and check out documents.
    Contributor,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 4,
            Self::RecordsManager => 3,
            Self::Contributor => 2,
            Self::Viewer => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::RecordsManager => "records_manager",
            Self::Contributor => "contributor",
            Self::Viewer => "viewer",
        }
    }

    /// Whether this role satisfies a rule's required-role string.
    pub fn satisfies(&self, required: &str) -> bool {
        if self.is_admin() {
            return true;
        }
        self.as_str().eq_ignore_ascii_case(required)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "records_manager" => Ok(Self::RecordsManager),
            "contributor" => Ok(Self::Contributor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, records_manager, contributor, viewer"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(UserRole::Admin.has_at_least(&UserRole::Viewer));
        assert!(UserRole::Admin.has_at_least(&UserRole::Admin));
        assert!(!UserRole::Viewer.has_at_least(&UserRole::Contributor));
    }

    #[test]
    fn test_satisfies() {
        assert!(UserRole::Admin.satisfies("records_manager"));
        assert!(UserRole::RecordsManager.satisfies("records_manager"));
        assert!(!UserRole::Contributor.satisfies("records_manager"));
    }
}
