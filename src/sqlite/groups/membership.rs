//! `SQLite` implementation of [`GroupMembershipRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::db_error;
use crate::groups::{CreateMember, GroupMember, GroupMembershipRepository, GroupRole};
use crate::HearthError;

/// `SQLite`-backed group membership repository. The `(group_id, user_id)`
/// unique index backs the one-membership-per-user invariant.
#[derive(Clone)]
pub struct SqliteGroupMembershipRepository {
    pool: SqlitePool,
}

impl SqliteGroupMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MemberRecord {
    id: i64,
    group_id: i64,
    user_id: i64,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MemberRecord> for GroupMember {
    type Error = HearthError;

    fn try_from(row: MemberRecord) -> Result<Self, Self::Error> {
        let role = GroupRole::parse(&row.role)
            .ok_or_else(|| HearthError::DatabaseError(format!("unknown group role: {}", row.role)))?;
        Ok(GroupMember {
            id: row.id,
            group_id: row.group_id,
            user_id: row.user_id,
            role,
            joined_at: row.joined_at,
        })
    }
}

const MEMBER_COLUMNS: &str = "id, group_id, user_id, role, joined_at";

#[async_trait]
impl GroupMembershipRepository for SqliteGroupMembershipRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateMember) -> Result<GroupMember, HearthError> {
        let row: MemberRecord = sqlx::query_as(
            r"
            INSERT INTO group_members (group_id, user_id, role)
            VALUES (?, ?, ?)
            RETURNING id, group_id, user_id, role, joined_at
            ",
        )
        .bind(data.group_id)
        .bind(data.user_id)
        .bind(data.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // unique (group_id, user_id) violation means a duplicate join
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                HearthError::AlreadyMember
            } else {
                db_error("create_membership")(e)
            }
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_group_and_user(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> Result<Option<GroupMember>, HearthError> {
        let row: Option<MemberRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = ? AND user_id = ?"
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_membership_by_group_and_user"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_group(&self, group_id: i64) -> Result<Vec<GroupMember>, HearthError> {
        let rows: Vec<MemberRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = ? ORDER BY joined_at ASC, id ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find_memberships_by_group"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<GroupMember>, HearthError> {
        let rows: Vec<MemberRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE user_id = ? ORDER BY joined_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find_memberships_by_user"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_role(
        &self,
        group_id: i64,
        user_id: i64,
        role: GroupRole,
    ) -> Result<GroupMember, HearthError> {
        let row: MemberRecord = sqlx::query_as(
            r"
            UPDATE group_members SET role = ?
            WHERE group_id = ? AND user_id = ?
            RETURNING id, group_id, user_id, role, joined_at
            ",
        )
        .bind(role.as_str())
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HearthError::NotAMember,
            _ => db_error("update_membership_role")(e),
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, group_id: i64, user_id: i64) -> Result<(), HearthError> {
        sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_membership"))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_by_user(&self, user_id: i64) -> Result<(), HearthError> {
        sqlx::query("DELETE FROM group_members WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_memberships_by_user"))?;

        Ok(())
    }
}
