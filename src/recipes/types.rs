//! Core recipe types and the listing predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The access tier of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Creator only.
    Private,
    /// Members of the recipe's owning groups.
    Group,
    /// Everyone, including anonymous requesters.
    Public,
}

impl Visibility {
    /// String form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Public => "public",
        }
    }

    /// Parse from database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Self::Private),
            "group" => Some(Self::Group),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KosherType {
    Parve,
    Dairy,
    Meat,
}

impl KosherType {
    /// String form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parve => "Parve",
            Self::Dairy => "Dairy",
            Self::Meat => "Meat",
        }
    }

    /// Parse from database string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Parve" => Some(Self::Parve),
            "Dairy" => Some(Self::Dairy),
            "Meat" => Some(Self::Meat),
            _ => None,
        }
    }
}

/// One user's rating of a recipe, 0-5. At most one per (recipe, user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: i64,
    pub rating: u8,
}

/// A recipe. Effective access is computed from `visibility`, `group_ids`,
/// and the requester's group memberships, not from ownership alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier.
    pub id: i64,
    pub title: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Preparation time in minutes, at least 1.
    pub prep_time: u32,
    /// 1 (easy) to 5 (hard).
    pub difficulty: u8,
    /// Mean of all ratings rounded to one decimal; 0 when unrated.
    pub average_rating: f64,
    pub image_url: Option<String>,
    pub is_yemeni: bool,
    pub kosher_type: KosherType,
    /// Orphaned (set to `None`) when the creator is deleted.
    pub creator_id: Option<i64>,
    pub visibility: Visibility,
    /// Owning groups; non-empty iff `visibility` is `Group`.
    pub group_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Whether the recipe belongs to at least one of the given groups.
    pub fn shared_with_any(&self, group_ids: &[i64]) -> bool {
        self.group_ids.iter().any(|id| group_ids.contains(id))
    }
}

/// The access clause of a listing query. Computed by the access evaluator;
/// interpreted by repositories (SQL `EXISTS` clauses or the in-memory
/// predicate below). An item matching several clauses of the union appears
/// exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeScope {
    /// Public recipes only. The anonymous view of the catalog.
    Public,
    /// Recipes created by the requester, any visibility.
    Mine { user_id: i64 },
    /// Group-visible recipes shared with any of the requester's groups.
    MemberGroups { group_ids: Vec<i64> },
    /// Everything the requester can view: public, own, and member-group
    /// recipes.
    Accessible { user_id: i64, group_ids: Vec<i64> },
}

impl RecipeScope {
    /// Pure membership test for one recipe.
    pub fn permits(&self, recipe: &Recipe) -> bool {
        match self {
            Self::Public => recipe.visibility == Visibility::Public,
            Self::Mine { user_id } => recipe.creator_id == Some(*user_id),
            Self::MemberGroups { group_ids } => {
                recipe.visibility == Visibility::Group && recipe.shared_with_any(group_ids)
            }
            Self::Accessible { user_id, group_ids } => {
                recipe.visibility == Visibility::Public
                    || recipe.creator_id == Some(*user_id)
                    || (recipe.visibility == Visibility::Group
                        && recipe.shared_with_any(group_ids))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeSort {
    /// Newest first. The default.
    #[default]
    Newest,
    /// Title, ascending.
    Title,
    /// Average rating, descending.
    Rating,
    /// Prep time, ascending.
    PrepTime,
}

/// A full listing query: access scope plus content filters.
#[derive(Debug, Clone)]
pub struct RecipeQuery {
    pub scope: RecipeScope,
    pub category: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    /// Multi-select; empty means no difficulty filter.
    pub difficulties: Vec<u8>,
    /// Multi-select; empty means no kosher filter.
    pub kosher_types: Vec<KosherType>,
    pub yemeni_only: bool,
    pub sort: RecipeSort,
}

impl RecipeQuery {
    pub fn for_scope(scope: RecipeScope) -> Self {
        Self {
            scope,
            category: None,
            search: None,
            min_time: None,
            max_time: None,
            difficulties: vec![],
            kosher_types: vec![],
            yemeni_only: false,
            sort: RecipeSort::default(),
        }
    }

    /// Pure filter predicate, shared by the mock repository and tests. The
    /// SQLite repository compiles the same conditions to SQL.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if !self.scope.permits(recipe) {
            return false;
        }
        if let Some(category) = &self.category {
            if recipe.category != *category {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !recipe.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_time {
            if recipe.prep_time < min {
                return false;
            }
        }
        if let Some(max) = self.max_time {
            if recipe.prep_time > max {
                return false;
            }
        }
        if !self.difficulties.is_empty() && !self.difficulties.contains(&recipe.difficulty) {
            return false;
        }
        if !self.kosher_types.is_empty() && !self.kosher_types.contains(&recipe.kosher_type) {
            return false;
        }
        if self.yemeni_only && !recipe.is_yemeni {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i64, visibility: Visibility, creator: Option<i64>, group_ids: Vec<i64>) -> Recipe {
        let now = Utc::now();
        Recipe {
            id,
            title: format!("Recipe {id}"),
            category: "Soups".into(),
            ingredients: vec!["water".into()],
            instructions: vec!["boil".into()],
            prep_time: 30,
            difficulty: 2,
            average_rating: 0.0,
            image_url: None,
            is_yemeni: false,
            kosher_type: KosherType::Parve,
            creator_id: creator,
            visibility,
            group_ids,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_scope_public() {
        let scope = RecipeScope::Public;
        assert!(scope.permits(&recipe(1, Visibility::Public, Some(1), vec![])));
        assert!(!scope.permits(&recipe(2, Visibility::Private, Some(1), vec![])));
        assert!(!scope.permits(&recipe(3, Visibility::Group, Some(1), vec![9])));
    }

    #[test]
    fn test_scope_mine_includes_all_visibilities() {
        let scope = RecipeScope::Mine { user_id: 1 };
        assert!(scope.permits(&recipe(1, Visibility::Private, Some(1), vec![])));
        assert!(scope.permits(&recipe(2, Visibility::Public, Some(1), vec![])));
        assert!(!scope.permits(&recipe(3, Visibility::Public, Some(2), vec![])));
        assert!(!scope.permits(&recipe(4, Visibility::Public, None, vec![])));
    }

    #[test]
    fn test_scope_member_groups() {
        let scope = RecipeScope::MemberGroups {
            group_ids: vec![5, 6],
        };
        assert!(scope.permits(&recipe(1, Visibility::Group, Some(2), vec![6])));
        assert!(!scope.permits(&recipe(2, Visibility::Group, Some(2), vec![7])));
        // only group-visible recipes belong to this scope
        assert!(!scope.permits(&recipe(3, Visibility::Public, Some(2), vec![])));
    }

    #[test]
    fn test_scope_accessible_union() {
        let scope = RecipeScope::Accessible {
            user_id: 1,
            group_ids: vec![5],
        };
        // public clause
        assert!(scope.permits(&recipe(1, Visibility::Public, Some(9), vec![])));
        // own clause, even private
        assert!(scope.permits(&recipe(2, Visibility::Private, Some(1), vec![])));
        // member-group clause
        assert!(scope.permits(&recipe(3, Visibility::Group, Some(9), vec![5])));
        // none of the clauses
        assert!(!scope.permits(&recipe(4, Visibility::Private, Some(9), vec![])));
        assert!(!scope.permits(&recipe(5, Visibility::Group, Some(9), vec![6])));
        // a recipe matching several clauses is still one membership test
        assert!(scope.permits(&recipe(6, Visibility::Public, Some(1), vec![])));
    }

    #[test]
    fn test_query_content_filters() {
        let mut query = RecipeQuery::for_scope(RecipeScope::Public);
        let r = recipe(1, Visibility::Public, Some(1), vec![]);

        assert!(query.matches(&r));

        query.search = Some("RECIPE".into());
        assert!(query.matches(&r));

        query.search = Some("pasta".into());
        assert!(!query.matches(&r));

        query.search = None;
        query.difficulties = vec![1, 2];
        assert!(query.matches(&r));
        query.difficulties = vec![4, 5];
        assert!(!query.matches(&r));

        query.difficulties = vec![];
        query.min_time = Some(40);
        assert!(!query.matches(&r));
        query.min_time = Some(10);
        query.max_time = Some(20);
        assert!(!query.matches(&r));

        query.max_time = None;
        query.yemeni_only = true;
        assert!(!query.matches(&r));
    }
}
