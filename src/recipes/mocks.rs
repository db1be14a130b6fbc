#![allow(clippy::significant_drop_tightening)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::repository::{average_of, CreateRecipe, RecipeRepository, UpdateRecipe};
use super::types::{Rating, Recipe, RecipeQuery, RecipeSort, Visibility};
use crate::HearthError;

#[derive(Clone)]
pub struct MockRecipeRepository {
    pub recipes: Arc<RwLock<Vec<Recipe>>>,
    pub ratings: Arc<RwLock<Vec<(i64, Rating)>>>,
    next_id: Arc<AtomicI64>,
}

impl MockRecipeRepository {
    pub fn new() -> Self {
        Self {
            recipes: Arc::new(RwLock::new(vec![])),
            ratings: Arc::new(RwLock::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockRecipeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipeRepository for MockRecipeRepository {
    async fn create(&self, data: CreateRecipe) -> Result<Recipe, HearthError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let recipe = Recipe {
            id,
            title: data.title,
            category: data.category,
            ingredients: data.ingredients,
            instructions: data.instructions,
            prep_time: data.prep_time,
            difficulty: data.difficulty,
            average_rating: 0.0,
            image_url: data.image_url,
            is_yemeni: data.is_yemeni,
            kosher_type: data.kosher_type,
            creator_id: data.creator_id,
            visibility: data.visibility,
            group_ids: data.group_ids,
            created_at: now,
            updated_at: now,
        };

        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        recipes.push(recipe.clone());

        Ok(recipe)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, HearthError> {
        let recipes = self
            .recipes
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Recipe>, HearthError> {
        let recipes = self
            .recipes
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(ids
            .iter()
            .filter_map(|id| recipes.iter().find(|r| r.id == *id).cloned())
            .collect())
    }

    async fn list(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, HearthError> {
        let recipes = self
            .recipes
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        let mut found: Vec<Recipe> = recipes.iter().filter(|r| query.matches(r)).cloned().collect();

        match query.sort {
            RecipeSort::Newest => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            RecipeSort::Title => found.sort_by(|a, b| a.title.cmp(&b.title)),
            RecipeSort::Rating => found.sort_by(|a, b| {
                b.average_rating
                    .partial_cmp(&a.average_rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            RecipeSort::PrepTime => found.sort_by_key(|r| r.prep_time),
        }

        Ok(found)
    }

    async fn update(&self, id: i64, data: UpdateRecipe) -> Result<Recipe, HearthError> {
        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(HearthError::NotFound)?;

        if let Some(title) = data.title {
            recipe.title = title;
        }
        if let Some(category) = data.category {
            recipe.category = category;
        }
        if let Some(ingredients) = data.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = data.instructions {
            recipe.instructions = instructions;
        }
        if let Some(prep_time) = data.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(difficulty) = data.difficulty {
            recipe.difficulty = difficulty;
        }
        if let Some(image_url) = data.image_url {
            recipe.image_url = image_url;
        }
        if let Some(is_yemeni) = data.is_yemeni {
            recipe.is_yemeni = is_yemeni;
        }
        if let Some(kosher_type) = data.kosher_type {
            recipe.kosher_type = kosher_type;
        }
        recipe.visibility = data.visibility;
        recipe.group_ids = data.group_ids;
        recipe.updated_at = Utc::now();

        Ok(recipe.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), HearthError> {
        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        recipes.retain(|r| r.id != id);

        let mut ratings = self
            .ratings
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        ratings.retain(|(recipe_id, _)| *recipe_id != id);

        Ok(())
    }

    async fn rate(&self, recipe_id: i64, user_id: i64, rating: u8) -> Result<f64, HearthError> {
        let mut ratings = self
            .ratings
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        // re-rating replaces the prior entry in place
        if let Some((_, existing)) = ratings
            .iter_mut()
            .find(|(rid, r)| *rid == recipe_id && r.user_id == user_id)
        {
            existing.rating = rating;
        } else {
            ratings.push((recipe_id, Rating { user_id, rating }));
        }

        let recipe_ratings: Vec<Rating> = ratings
            .iter()
            .filter(|(rid, _)| *rid == recipe_id)
            .map(|(_, r)| *r)
            .collect();
        let average = average_of(&recipe_ratings);
        drop(ratings);

        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or(HearthError::NotFound)?;
        recipe.average_rating = average;
        recipe.updated_at = Utc::now();

        Ok(average)
    }

    async fn ratings(&self, recipe_id: i64) -> Result<Vec<Rating>, HearthError> {
        let ratings = self
            .ratings
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        Ok(ratings
            .iter()
            .filter(|(rid, _)| *rid == recipe_id)
            .map(|(_, r)| *r)
            .collect())
    }

    async fn categories(&self) -> Result<Vec<String>, HearthError> {
        let recipes = self
            .recipes
            .read()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;
        let mut categories: Vec<String> = recipes.iter().map(|r| r.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn detach_group(&self, group_id: i64) -> Result<(), HearthError> {
        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        for recipe in recipes.iter_mut() {
            let had_group = recipe.group_ids.contains(&group_id);
            recipe.group_ids.retain(|id| *id != group_id);

            if recipe.visibility == Visibility::Group && recipe.group_ids.is_empty() {
                recipe.visibility = Visibility::Private;
            }
            if had_group {
                recipe.updated_at = Utc::now();
            }
        }

        Ok(())
    }

    async fn orphan_creator(&self, user_id: i64) -> Result<(), HearthError> {
        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| HearthError::Internal("lock poisoned".into()))?;

        for recipe in recipes.iter_mut() {
            if recipe.creator_id == Some(user_id) {
                recipe.creator_id = None;
                recipe.updated_at = Utc::now();
            }
        }

        Ok(())
    }
}
