//! Embedded database migrations for `SQLite`.
//!
//! Migrations are embedded at compile time, run in order, and tracked in the
//! `_hearth_migrations` table so reruns are no-ops.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

/// Identity and token tables.
const CORE_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250601000001_create_users_table",
        include_str!("../../migrations_sqlite/core/20250601000001_create_users_table.sql"),
    ),
    (
        "20250601000002_create_access_tokens_table",
        include_str!("../../migrations_sqlite/core/20250601000002_create_access_tokens_table.sql"),
    ),
    (
        "20250601000003_create_favorites_table",
        include_str!("../../migrations_sqlite/core/20250601000003_create_favorites_table.sql"),
    ),
];

/// Group and membership tables.
const GROUP_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250601000004_create_groups_table",
        include_str!("../../migrations_sqlite/groups/20250601000004_create_groups_table.sql"),
    ),
    (
        "20250601000005_create_group_members_table",
        include_str!(
            "../../migrations_sqlite/groups/20250601000005_create_group_members_table.sql"
        ),
    ),
];

/// Recipe, ownership, and rating tables.
const RECIPE_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250601000006_create_recipes_table",
        include_str!("../../migrations_sqlite/recipes/20250601000006_create_recipes_table.sql"),
    ),
    (
        "20250601000007_create_recipe_groups_table",
        include_str!(
            "../../migrations_sqlite/recipes/20250601000007_create_recipe_groups_table.sql"
        ),
    ),
    (
        "20250601000008_create_recipe_ratings_table",
        include_str!(
            "../../migrations_sqlite/recipes/20250601000008_create_recipe_ratings_table.sql"
        ),
    ),
];

/// Runs all migrations in order.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _hearth_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    run_migrations(pool, CORE_MIGRATIONS).await?;
    run_migrations(pool, GROUP_MIGRATIONS).await?;
    run_migrations(pool, RECIPE_MIGRATIONS).await?;

    Ok(())
}

/// Runs a set of migrations against the database.
///
/// # Limitations
///
/// SQL statements are split by semicolons (`;`), so migrations must not
/// contain semicolons inside string literals. The bundled migrations are
/// written with that in mind.
async fn run_migrations(pool: &SqlitePool, migrations: &[(&str, &str)]) -> Result<(), sqlx::Error> {
    for (name, sql) in migrations {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _hearth_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if !applied {
            // SQLite doesn't run multiple statements in one execute, so
            // split and run each.
            for statement in sql.split(';') {
                let trimmed = statement.trim();
                if !trimmed.is_empty() {
                    pool.execute(trimmed).await?;
                }
            }

            sqlx::query("INSERT INTO _hearth_migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}
