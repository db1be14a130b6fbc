//! `SQLite` implementation of [`RecipeRepository`].
//!
//! Ingredient and instruction lists are stored as JSON text columns;
//! group ownership and ratings live in their own tables. The listing query
//! compiles a [`RecipeQuery`] into a single `SELECT` whose scope clause is
//! one OR-union, so each matching recipe comes back exactly once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::db_error;
use crate::recipes::{
    CreateRecipe, KosherType, Rating, Recipe, RecipeQuery, RecipeRepository, RecipeScope,
    RecipeSort, UpdateRecipe, Visibility,
};
use crate::HearthError;

/// `SQLite`-backed recipe repository.
#[derive(Clone)]
pub struct SqliteRecipeRepository {
    pool: SqlitePool,
}

impl SqliteRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn group_ids_for(&self, recipe_id: i64) -> Result<Vec<i64>, HearthError> {
        sqlx::query_scalar(
            "SELECT group_id FROM recipe_groups WHERE recipe_id = ? ORDER BY group_id ASC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("recipe_group_ids"))
    }

    async fn hydrate(&self, row: RecipeRecord) -> Result<Recipe, HearthError> {
        let group_ids = self.group_ids_for(row.id).await?;
        row.into_recipe(group_ids)
    }
}

#[derive(FromRow)]
struct RecipeRecord {
    id: i64,
    title: String,
    category: String,
    ingredients: String,
    instructions: String,
    prep_time: i64,
    difficulty: i64,
    average_rating: f64,
    image_url: Option<String>,
    is_yemeni: bool,
    kosher_type: String,
    creator_id: Option<i64>,
    visibility: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecipeRecord {
    fn into_recipe(self, group_ids: Vec<i64>) -> Result<Recipe, HearthError> {
        let visibility = Visibility::parse(&self.visibility).ok_or_else(|| {
            HearthError::DatabaseError(format!("unknown visibility: {}", self.visibility))
        })?;
        let kosher_type = KosherType::parse(&self.kosher_type).ok_or_else(|| {
            HearthError::DatabaseError(format!("unknown kosher type: {}", self.kosher_type))
        })?;
        let ingredients: Vec<String> = serde_json::from_str(&self.ingredients)
            .map_err(|e| HearthError::DatabaseError(format!("bad ingredients column: {e}")))?;
        let instructions: Vec<String> = serde_json::from_str(&self.instructions)
            .map_err(|e| HearthError::DatabaseError(format!("bad instructions column: {e}")))?;

        Ok(Recipe {
            id: self.id,
            title: self.title,
            category: self.category,
            ingredients,
            instructions,
            prep_time: self.prep_time.try_into().unwrap_or(0),
            difficulty: self.difficulty.try_into().unwrap_or(0),
            average_rating: self.average_rating,
            image_url: self.image_url,
            is_yemeni: self.is_yemeni,
            kosher_type,
            creator_id: self.creator_id,
            visibility,
            group_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const RECIPE_COLUMNS: &str = "id, title, category, ingredients, instructions, prep_time, \
     difficulty, average_rating, image_url, is_yemeni, kosher_type, creator_id, visibility, \
     created_at, updated_at";

fn encode_list(list: &[String]) -> Result<String, HearthError> {
    serde_json::to_string(list).map_err(|e| HearthError::Internal(format!("encode list: {e}")))
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: &RecipeScope) {
    match scope {
        RecipeScope::Public => {
            builder.push(" AND visibility = 'public'");
        }
        RecipeScope::Mine { user_id } => {
            builder.push(" AND creator_id = ").push_bind(*user_id);
        }
        RecipeScope::MemberGroups { group_ids } => {
            builder.push(" AND visibility = 'group'");
            push_group_membership(builder, group_ids);
        }
        RecipeScope::Accessible { user_id, group_ids } => {
            builder
                .push(" AND (visibility = 'public' OR creator_id = ")
                .push_bind(*user_id);
            if !group_ids.is_empty() {
                builder.push(" OR (visibility = 'group'");
                push_group_membership(builder, group_ids);
                builder.push(")");
            }
            builder.push(")");
        }
    }
}

fn push_group_membership(builder: &mut QueryBuilder<'_, Sqlite>, group_ids: &[i64]) {
    if group_ids.is_empty() {
        // member of no groups: the clause can never match
        builder.push(" AND 0");
        return;
    }
    builder.push(
        " AND EXISTS (SELECT 1 FROM recipe_groups rg WHERE rg.recipe_id = recipes.id \
         AND rg.group_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in group_ids {
        separated.push_bind(*id);
    }
    builder.push("))");
}

#[async_trait]
impl RecipeRepository for SqliteRecipeRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateRecipe) -> Result<Recipe, HearthError> {
        let ingredients = encode_list(&data.ingredients)?;
        let instructions = encode_list(&data.instructions)?;

        let mut tx = self.pool.begin().await.map_err(db_error("create_recipe"))?;

        let row: RecipeRecord = sqlx::query_as(&format!(
            r"
            INSERT INTO recipes (title, category, ingredients, instructions, prep_time,
                                 difficulty, image_url, is_yemeni, kosher_type, creator_id,
                                 visibility)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(&data.title)
        .bind(&data.category)
        .bind(&ingredients)
        .bind(&instructions)
        .bind(i64::from(data.prep_time))
        .bind(i64::from(data.difficulty))
        .bind(&data.image_url)
        .bind(data.is_yemeni)
        .bind(data.kosher_type.as_str())
        .bind(data.creator_id)
        .bind(data.visibility.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("create_recipe"))?;

        for group_id in &data.group_ids {
            sqlx::query("INSERT INTO recipe_groups (recipe_id, group_id) VALUES (?, ?)")
                .bind(row.id)
                .bind(group_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("create_recipe_groups"))?;
        }

        tx.commit().await.map_err(db_error("create_recipe"))?;

        row.into_recipe(data.group_ids)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, HearthError> {
        let row: Option<RecipeRecord> =
            sqlx::query_as(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find_recipe_by_id"))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, ids), err))]
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Recipe>, HearthError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        builder.push(")");

        let rows: Vec<RecipeRecord> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("find_recipes_by_ids"))?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(self.hydrate(row).await?);
        }
        // preserve the requested order
        recipes.sort_by_key(|r| ids.iter().position(|id| *id == r.id));
        Ok(recipes)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn list(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, HearthError> {
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE 1 = 1"));

        push_scope(&mut builder, &query.scope);

        if let Some(category) = &query.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(search) = &query.search {
            builder
                .push(" AND LOWER(title) LIKE ")
                .push_bind(format!("%{}%", search.to_lowercase()));
        }
        if let Some(min) = query.min_time {
            builder.push(" AND prep_time >= ").push_bind(i64::from(min));
        }
        if let Some(max) = query.max_time {
            builder.push(" AND prep_time <= ").push_bind(i64::from(max));
        }
        if !query.difficulties.is_empty() {
            builder.push(" AND difficulty IN (");
            let mut separated = builder.separated(", ");
            for difficulty in &query.difficulties {
                separated.push_bind(i64::from(*difficulty));
            }
            builder.push(")");
        }
        if !query.kosher_types.is_empty() {
            builder.push(" AND kosher_type IN (");
            let mut separated = builder.separated(", ");
            for kosher in &query.kosher_types {
                separated.push_bind(kosher.as_str());
            }
            builder.push(")");
        }
        if query.yemeni_only {
            builder.push(" AND is_yemeni = 1");
        }

        builder.push(match query.sort {
            RecipeSort::Newest => " ORDER BY created_at DESC",
            RecipeSort::Title => " ORDER BY title ASC",
            RecipeSort::Rating => " ORDER BY average_rating DESC",
            RecipeSort::PrepTime => " ORDER BY prep_time ASC",
        });

        let rows: Vec<RecipeRecord> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list_recipes"))?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(self.hydrate(row).await?);
        }
        Ok(recipes)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn update(&self, id: i64, data: UpdateRecipe) -> Result<Recipe, HearthError> {
        let ingredients = data.ingredients.as_deref().map(encode_list).transpose()?;
        let instructions = data.instructions.as_deref().map(encode_list).transpose()?;

        let mut tx = self.pool.begin().await.map_err(db_error("update_recipe"))?;

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE recipes SET ");
        let mut fields = builder.separated(", ");
        if let Some(title) = &data.title {
            fields.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(category) = &data.category {
            fields.push("category = ").push_bind_unseparated(category.clone());
        }
        if let Some(encoded) = &ingredients {
            fields.push("ingredients = ").push_bind_unseparated(encoded.clone());
        }
        if let Some(encoded) = &instructions {
            fields.push("instructions = ").push_bind_unseparated(encoded.clone());
        }
        if let Some(prep_time) = data.prep_time {
            fields.push("prep_time = ").push_bind_unseparated(i64::from(prep_time));
        }
        if let Some(difficulty) = data.difficulty {
            fields.push("difficulty = ").push_bind_unseparated(i64::from(difficulty));
        }
        if let Some(image_url) = &data.image_url {
            fields.push("image_url = ").push_bind_unseparated(image_url.clone());
        }
        if let Some(is_yemeni) = data.is_yemeni {
            fields.push("is_yemeni = ").push_bind_unseparated(is_yemeni);
        }
        if let Some(kosher_type) = data.kosher_type {
            fields.push("kosher_type = ").push_bind_unseparated(kosher_type.as_str());
        }
        // visibility and group ownership are always written together
        fields.push("visibility = ").push_bind_unseparated(data.visibility.as_str());
        fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {RECIPE_COLUMNS}"));

        let row: RecipeRecord = builder
            .build_query_as()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => HearthError::NotFound,
                _ => db_error("update_recipe")(e),
            })?;

        sqlx::query("DELETE FROM recipe_groups WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("update_recipe_groups"))?;

        for group_id in &data.group_ids {
            sqlx::query("INSERT INTO recipe_groups (recipe_id, group_id) VALUES (?, ?)")
                .bind(id)
                .bind(group_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("update_recipe_groups"))?;
        }

        tx.commit().await.map_err(db_error("update_recipe"))?;

        row.into_recipe(data.group_ids)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, id: i64) -> Result<(), HearthError> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_recipe"))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn rate(&self, recipe_id: i64, user_id: i64, rating: u8) -> Result<f64, HearthError> {
        let mut tx = self.pool.begin().await.map_err(db_error("rate_recipe"))?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?)")
            .bind(recipe_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("rate_recipe"))?;
        if !exists {
            return Err(HearthError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO recipe_ratings (recipe_id, user_id, rating)
            VALUES (?, ?, ?)
            ON CONFLICT (recipe_id, user_id) DO UPDATE SET rating = excluded.rating
            ",
        )
        .bind(recipe_id)
        .bind(user_id)
        .bind(i64::from(rating))
        .execute(&mut *tx)
        .await
        .map_err(db_error("rate_recipe"))?;

        let average: f64 = sqlx::query_scalar(
            r"
            UPDATE recipes
            SET average_rating = COALESCE(
                    (SELECT ROUND(AVG(CAST(rating AS REAL)), 1)
                     FROM recipe_ratings WHERE recipe_id = ?),
                    0),
                updated_at = ?
            WHERE id = ?
            RETURNING average_rating
            ",
        )
        .bind(recipe_id)
        .bind(Utc::now())
        .bind(recipe_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("rate_recipe"))?;

        tx.commit().await.map_err(db_error("rate_recipe"))?;

        Ok(average)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn ratings(&self, recipe_id: i64) -> Result<Vec<Rating>, HearthError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT user_id, rating FROM recipe_ratings WHERE recipe_id = ? ORDER BY user_id ASC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("recipe_ratings"))?;

        Ok(rows
            .into_iter()
            .map(|(user_id, rating)| Rating {
                user_id,
                rating: rating.try_into().unwrap_or(0),
            })
            .collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn categories(&self) -> Result<Vec<String>, HearthError> {
        sqlx::query_scalar("SELECT DISTINCT category FROM recipes ORDER BY category ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("recipe_categories"))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn detach_group(&self, group_id: i64) -> Result<(), HearthError> {
        // one transaction for both cascade steps, so a crash can't leave a
        // group-visible recipe stripped but not privatized
        let mut tx = self.pool.begin().await.map_err(db_error("detach_group"))?;

        sqlx::query("DELETE FROM recipe_groups WHERE group_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("detach_group"))?;

        sqlx::query(
            r"
            UPDATE recipes
            SET visibility = 'private', updated_at = ?
            WHERE visibility = 'group'
              AND NOT EXISTS (SELECT 1 FROM recipe_groups WHERE recipe_id = recipes.id)
            ",
        )
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_error("detach_group"))?;

        tx.commit().await.map_err(db_error("detach_group"))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn orphan_creator(&self, user_id: i64) -> Result<(), HearthError> {
        sqlx::query("UPDATE recipes SET creator_id = NULL, updated_at = ? WHERE creator_id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("orphan_creator"))?;

        Ok(())
    }
}
