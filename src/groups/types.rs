//! Core types for recipe-sharing groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who can discover and join a group without an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPrivacy {
    Public,
    Private,
}

impl GroupPrivacy {
    /// String form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse from database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// A member's privilege level within one group, ordered
/// `Member < Contributor < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Member,
    Contributor,
    Admin,
}

impl GroupRole {
    /// String form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Contributor => "contributor",
            Self::Admin => "admin",
        }
    }

    /// Parse from database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "contributor" => Some(Self::Contributor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role may publish recipes into the group.
    pub fn can_contribute(&self) -> bool {
        *self >= Self::Contributor
    }
}

/// A group of users sharing recipes with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.
    pub id: i64,
    /// Display name, 2-100 characters.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Whether the group can be joined without an invite.
    pub privacy: GroupPrivacy,
    /// The user who created the group. Always present in the member list
    /// with role `admin`.
    pub creator_id: i64,
    /// Unguessable 32-hex-character join token, unique per group.
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a user to a group with a role. A user appears at most once per
/// group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// Unique identifier.
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub role: GroupRole,
    /// When the user joined the group.
    pub joined_at: DateTime<Utc>,
}
