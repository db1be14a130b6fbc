mod repository;
mod types;

pub use repository::{CreateRecipe, RecipeRepository, UpdateRecipe};
pub use types::{KosherType, Rating, Recipe, RecipeQuery, RecipeScope, RecipeSort, Visibility};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::MockRecipeRepository;
