#![allow(clippy::significant_drop_tightening)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::repository::{CreateGroup, CreateMember, GroupMembershipRepository, GroupRepository};
use super::types::{Group, GroupMember, GroupPrivacy, GroupRole};
use crate::HearthError;

#[derive(Clone)]
pub struct MockGroupRepository {
    pub groups: Arc<RwLock<Vec<Group>>>,
    next_id: Arc<AtomicI64>,
}

impl MockGroupRepository {
    pub fn new() -> Self {
        Self {
            groups: Arc::new(RwLock::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockGroupRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupRepository for MockGroupRepository {
    async fn create(&self, data: CreateGroup) -> Result<Group, HearthError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let group = Group {
            id,
            name: data.name,
            description: data.description,
            privacy: data.privacy,
            creator_id: data.creator_id,
            invite_code: data.invite_code,
            created_at: now,
            updated_at: now,
        };

        let mut groups = self
            .groups
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        groups.push(group.clone());

        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, HearthError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>, HearthError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(groups.iter().find(|g| g.invite_code == invite_code).cloned())
    }

    async fn find_by_creator(&self, creator_id: i64) -> Result<Vec<Group>, HearthError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(groups
            .iter()
            .filter(|g| g.creator_id == creator_id)
            .cloned()
            .collect())
    }

    async fn search_public(&self, search: Option<&str>) -> Result<Vec<Group>, HearthError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        let needle = search.map(str::to_lowercase);
        let mut found: Vec<Group> = groups
            .iter()
            .filter(|g| g.privacy == GroupPrivacy::Public)
            .filter(|g| {
                needle.as_deref().map_or(true, |n| {
                    g.name.to_lowercase().contains(n) || g.description.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        privacy: Option<GroupPrivacy>,
    ) -> Result<Group, HearthError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        let group = groups.iter_mut().find(|g| g.id == id).ok_or(HearthError::NotFound)?;

        if let Some(n) = name {
            n.clone_into(&mut group.name);
        }
        if let Some(d) = description {
            d.clone_into(&mut group.description);
        }
        if let Some(p) = privacy {
            group.privacy = p;
        }
        group.updated_at = Utc::now();

        Ok(group.clone())
    }

    async fn set_creator(&self, group_id: i64, user_id: i64) -> Result<Group, HearthError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(HearthError::NotFound)?;
        group.creator_id = user_id;
        group.updated_at = Utc::now();

        Ok(group.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), HearthError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        groups.retain(|g| g.id != id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockGroupMembershipRepository {
    pub members: Arc<RwLock<Vec<GroupMember>>>,
    next_id: Arc<AtomicI64>,
}

impl MockGroupMembershipRepository {
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockGroupMembershipRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupMembershipRepository for MockGroupMembershipRepository {
    async fn create(&self, data: CreateMember) -> Result<GroupMember, HearthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        // same uniqueness guarantee as the SQL unique index
        if members
            .iter()
            .any(|m| m.group_id == data.group_id && m.user_id == data.user_id)
        {
            return Err(HearthError::AlreadyMember);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let member = GroupMember {
            id,
            group_id: data.group_id,
            user_id: data.user_id,
            role: data.role,
            joined_at: Utc::now(),
        };
        members.push(member.clone());

        Ok(member)
    }

    async fn find_by_group_and_user(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> Result<Option<GroupMember>, HearthError> {
        let members = self
            .members
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(members
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_by_group(&self, group_id: i64) -> Result<Vec<GroupMember>, HearthError> {
        let members = self
            .members
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        let mut found: Vec<GroupMember> = members
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<GroupMember>, HearthError> {
        let members = self
            .members
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(members
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_role(
        &self,
        group_id: i64,
        user_id: i64,
        role: GroupRole,
    ) -> Result<GroupMember, HearthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        let member = members
            .iter_mut()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .ok_or(HearthError::NotAMember)?;
        member.role = role;

        Ok(member.clone())
    }

    async fn delete(&self, group_id: i64, user_id: i64) -> Result<(), HearthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        members.retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<(), HearthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        members.retain(|m| m.user_id != user_id);
        Ok(())
    }
}
