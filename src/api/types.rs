use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::groups::{Group, GroupMember, GroupPrivacy, GroupRole};
use crate::recipes::{KosherType, Recipe, Visibility};
use crate::users::{SystemRole, User};
use crate::{HearthError, SecretString};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<SystemRole>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub privacy: Option<GroupPrivacy>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<GroupPrivacy>,
}

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: GroupRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: u32,
    pub difficulty: u8,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_yemeni: bool,
    pub kosher_type: Option<KosherType>,
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub group_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time: Option<u32>,
    pub difficulty: Option<u8>,
    pub image_url: Option<String>,
    pub is_yemeni: Option<bool>,
    pub kosher_type: Option<KosherType>,
    pub visibility: Option<Visibility>,
    pub group_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct RateRecipeRequest {
    pub rating: u8,
}

/// Query parameters of the recipe listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecipesParams {
    pub filter: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    /// Comma-separated multi-select, e.g. `1,2`.
    pub difficulty: Option<String>,
    /// Comma-separated multi-select, e.g. `Parve,Dairy`.
    pub kosher_type: Option<String>,
    pub is_yemeni: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

// Response DTOs

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: SystemRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub creator_id: i64,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        GroupResponse {
            id: group.id,
            name: group.name,
            description: group.description,
            privacy: group.privacy,
            creator_id: group.creator_id,
            invite_code: group.invite_code,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// A member row enriched with the user's email and name, the way group
/// detail pages render member lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

impl MemberResponse {
    pub fn from_parts(member: GroupMember, user: &User) -> Self {
        MemberResponse {
            user_id: member.user_id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupDetailResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: u32,
    pub difficulty: u8,
    pub average_rating: f64,
    pub image_url: Option<String>,
    pub is_yemeni: bool,
    pub kosher_type: KosherType,
    pub creator_id: Option<i64>,
    pub visibility: Visibility,
    pub group_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        RecipeResponse {
            id: recipe.id,
            title: recipe.title,
            category: recipe.category,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            prep_time: recipe.prep_time,
            difficulty: recipe.difficulty,
            average_rating: recipe.average_rating,
            image_url: recipe.image_url,
            is_yemeni: recipe.is_yemeni,
            kosher_type: recipe.kosher_type,
            creator_id: recipe.creator_id,
            visibility: recipe.visibility,
            group_ids: recipe.group_ids,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub message: String,
    pub average_rating: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub message: String,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Per-field messages, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl From<HearthError> for ErrorResponse {
    fn from(err: HearthError) -> Self {
        let code = match &err {
            HearthError::Validation(_) => "VALIDATION_ERROR",
            HearthError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            HearthError::AlreadyMember => "ALREADY_MEMBER",
            HearthError::CannotDeleteSelf => "CANNOT_DELETE_SELF",
            HearthError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            HearthError::TokenInvalid => "TOKEN_INVALID",
            HearthError::TokenExpired => "TOKEN_EXPIRED",
            HearthError::InvalidCredentials => "INVALID_CREDENTIALS",
            HearthError::Forbidden(_) => "FORBIDDEN",
            HearthError::PrivateGroup => "PRIVATE_GROUP",
            HearthError::CreatorCannotLeave => "CREATOR_CANNOT_LEAVE",
            HearthError::CannotRemoveCreator => "CANNOT_REMOVE_CREATOR",
            HearthError::NotFound => "NOT_FOUND",
            HearthError::UserNotFound => "USER_NOT_FOUND",
            HearthError::GroupNotFound(_) => "GROUP_NOT_FOUND",
            HearthError::NotAMember => "NOT_A_MEMBER",
            HearthError::PasswordHashError => "PASSWORD_HASH_ERROR",
            HearthError::DatabaseError(_) => "DATABASE_ERROR",
            HearthError::Internal(_) => "INTERNAL_ERROR",
        };

        let fields = match &err {
            HearthError::Validation(errors) => Some(errors.fields().clone()),
            _ => None,
        };

        ErrorResponse {
            error: err.to_string(),
            code: code.to_owned(),
            fields,
        }
    }
}
