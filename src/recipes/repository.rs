use async_trait::async_trait;

use super::types::{KosherType, Rating, Recipe, RecipeQuery, Visibility};
use crate::HearthError;

#[derive(Debug, Clone)]
pub struct CreateRecipe {
    pub title: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: u32,
    pub difficulty: u8,
    pub image_url: Option<String>,
    pub is_yemeni: bool,
    pub kosher_type: KosherType,
    pub creator_id: Option<i64>,
    pub visibility: Visibility,
    pub group_ids: Vec<i64>,
}

/// A recipe update. Scalar fields are patched when `Some`; visibility and
/// `group_ids` are always written together, already resolved by the caller,
/// so a non-`group` visibility can never leave stale group references
/// behind.
#[derive(Debug, Clone)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time: Option<u32>,
    pub difficulty: Option<u8>,
    pub image_url: Option<Option<String>>,
    pub is_yemeni: Option<bool>,
    pub kosher_type: Option<KosherType>,
    pub visibility: Visibility,
    pub group_ids: Vec<i64>,
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create(&self, data: CreateRecipe) -> Result<Recipe, HearthError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, HearthError>;

    /// Fetches the given recipes, preserving input order where possible.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Recipe>, HearthError>;

    async fn list(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, HearthError>;

    async fn update(&self, id: i64, data: UpdateRecipe) -> Result<Recipe, HearthError>;

    async fn delete(&self, id: i64) -> Result<(), HearthError>;

    /// Upserts the user's rating (re-rating replaces the prior value) and
    /// recomputes the average. Returns the new average, rounded to one
    /// decimal.
    async fn rate(&self, recipe_id: i64, user_id: i64, rating: u8) -> Result<f64, HearthError>;

    async fn ratings(&self, recipe_id: i64) -> Result<Vec<Rating>, HearthError>;

    /// Distinct categories across all recipes.
    async fn categories(&self) -> Result<Vec<String>, HearthError>;

    /// Group-deletion cascade over recipes: strips the group from every
    /// recipe's `group_ids`, then flips any recipe left group-visible with
    /// no groups to `private`. Runs atomically where the backend supports
    /// it.
    async fn detach_group(&self, group_id: i64) -> Result<(), HearthError>;

    /// Detaches the user as creator on all their recipes (recipes are
    /// retained, orphaned). Part of the user-deletion cascade.
    async fn orphan_creator(&self, user_id: i64) -> Result<(), HearthError>;
}

/// Average of a rating list, rounded to one decimal; 0 for no ratings.
pub(crate) fn average_of(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(sum) / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}
