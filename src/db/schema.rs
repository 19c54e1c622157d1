//! Table bootstrap
//!
//! Creates the catalog tables when they do not exist yet. Every statement is
//! idempotent; there is no column diffing or versioned migration here.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::Result;

/// Bootstrap statements, in dependency order
const SCHEMA: &[(&str, &str)] = &[
    (
        "studios",
        r#"
        CREATE TABLE IF NOT EXISTS studios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    ),
    (
        "scenes",
        r#"
        CREATE TABLE IF NOT EXISTS scenes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT
        )
        "#,
    ),
    (
        "movies",
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            checksum TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            aliases TEXT,
            duration INTEGER,
            date TEXT,
            rating INTEGER,
            studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
            director TEXT,
            synopsis TEXT,
            url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "index_movies_on_name",
        "CREATE INDEX IF NOT EXISTS index_movies_on_name ON movies(name)",
    ),
    (
        "index_movies_on_studio_id",
        "CREATE INDEX IF NOT EXISTS index_movies_on_studio_id ON movies(studio_id)",
    ),
    // No ON DELETE on movie_id: destroying a movie must clear its rows first.
    (
        "movies_scenes",
        r#"
        CREATE TABLE IF NOT EXISTS movies_scenes (
            movie_id INTEGER NOT NULL REFERENCES movies(id),
            scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
            scene_index INTEGER,
            PRIMARY KEY (movie_id, scene_id)
        )
        "#,
    ),
    (
        "index_movies_scenes_on_scene_id",
        "CREATE INDEX IF NOT EXISTS index_movies_scenes_on_scene_id ON movies_scenes(scene_id)",
    ),
    (
        "movies_images",
        r#"
        CREATE TABLE IF NOT EXISTS movies_images (
            movie_id INTEGER PRIMARY KEY REFERENCES movies(id) ON DELETE CASCADE,
            front_image BLOB,
            back_image BLOB
        )
        "#,
    ),
];

/// Create any missing catalog tables and indexes
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for (name, sql) in SCHEMA {
        debug!(object = *name, "Ensuring schema object");
        sqlx::query(sql).execute(pool).await?;
    }
    info!(objects = SCHEMA.len(), "Catalog schema ready");
    Ok(())
}
