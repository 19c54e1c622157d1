//! Shared fixtures for integration tests
//!
//! Each test gets its own SQLite file in a temporary directory so pooled
//! connections and transactions behave as they do against a real database.

#![allow(dead_code)]

use std::time::Duration;

use movie_catalog::db::{Database, HydrationPolicy, MovieRepository};
use movie_catalog::models::{Movie, NewMovie};
use movie_catalog::Catalog;
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;
use tempfile::TempDir;

pub struct TestDb {
    pub db: Database,
    // Dropped last; removes the database file
    _dir: TempDir,
}

impl TestDb {
    pub async fn conn(&self) -> PoolConnection<Sqlite> {
        self.db.acquire().await.unwrap()
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.db.clone(), MovieRepository::default())
    }
}

pub async fn setup() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let db = Database::connect_with(path.to_str().unwrap(), 4, Duration::from_secs(5))
        .await
        .unwrap();
    db.ensure_schema().await.unwrap();
    TestDb { db, _dir: dir }
}

pub fn repo() -> MovieRepository {
    MovieRepository::new(HydrationPolicy::BestEffort)
}

pub async fn create_movie(test: &TestDb, name: &str) -> Movie {
    let mut conn = test.conn().await;
    repo().create(&mut conn, &NewMovie::named(name)).await.unwrap()
}

pub async fn insert_studio(test: &TestDb, name: &str) -> i64 {
    sqlx::query("INSERT INTO studios (name) VALUES (?)")
        .bind(name)
        .execute(test.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn insert_scene(test: &TestDb, title: &str) -> i64 {
    sqlx::query("INSERT INTO scenes (title) VALUES (?)")
        .bind(title)
        .execute(test.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn link_scene(test: &TestDb, movie_id: i64, scene_id: i64) {
    sqlx::query("INSERT INTO movies_scenes (movie_id, scene_id) VALUES (?, ?)")
        .bind(movie_id)
        .bind(scene_id)
        .execute(test.db.pool())
        .await
        .unwrap();
}

pub async fn set_studio(test: &TestDb, movie_id: i64, studio_id: i64) {
    sqlx::query("UPDATE movies SET studio_id = ? WHERE id = ?")
        .bind(studio_id)
        .bind(movie_id)
        .execute(test.db.pool())
        .await
        .unwrap();
}

pub fn ids(movies: &[Movie]) -> Vec<i64> {
    movies.iter().map(|m| m.id).collect()
}

pub fn names(movies: &[Movie]) -> Vec<&str> {
    movies.iter().map(|m| m.name.as_str()).collect()
}
