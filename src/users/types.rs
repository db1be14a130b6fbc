//! Core identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System-level role. Group roles are separate, see
/// [`crate::groups::GroupRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemRole {
    User,
    Sysadmin,
}

impl SystemRole {
    /// String form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Sysadmin => "sysadmin",
        }
    }

    /// Parse from database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "sysadmin" => Some(Self::Sysadmin),
            _ => None,
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Unique login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Argon2id PHC-format password hash.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// System-level role; mutated only by a sysadmin.
    pub role: SystemRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the system-wide admin role.
    pub fn is_sysadmin(&self) -> bool {
        self.role == SystemRole::Sysadmin
    }
}

/// A bearer access token. Stored hashed; the plain value is only ever
/// returned once, at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_role_roundtrip() {
        assert_eq!(SystemRole::parse("user"), Some(SystemRole::User));
        assert_eq!(SystemRole::parse("sysadmin"), Some(SystemRole::Sysadmin));
        assert_eq!(SystemRole::parse("admin"), None);
        assert_eq!(
            SystemRole::parse(SystemRole::Sysadmin.as_str()),
            Some(SystemRole::Sysadmin)
        );
    }
}
