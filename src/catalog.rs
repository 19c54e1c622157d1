//! Catalog operations
//!
//! The entry points a transport layer calls. Every write runs in one
//! transaction, so a movie row and its images or scene links are never left
//! half written. Reads check out a pooled connection and run without one.

use chrono::Utc;
use tracing::info;

use crate::changeset::{FieldPresence, MovieCreateInput, MovieUpdateInput};
use crate::db::{with_transaction, Database, MovieQueryResult, MovieRepository};
use crate::error::Result;
use crate::models::{FindFilter, Movie, MovieFilter, MovieImages};

#[derive(Clone)]
pub struct Catalog {
    db: Database,
    movies: MovieRepository,
}

impl Catalog {
    pub fn new(db: Database, movies: MovieRepository) -> Self {
        Self { db, movies }
    }

    /// Create a movie and its images.
    ///
    /// A back image without a front image gets the default front image.
    pub async fn create_movie(&self, input: MovieCreateInput) -> Result<Movie> {
        let repo = self.movies;
        let new_movie = input.to_new_movie(Utc::now());
        let images = MovieImages::new(input.front_image, input.back_image).with_default_front();

        let movie = with_transaction(self.db.pool(), move |conn| {
            Box::pin(async move {
                let movie = repo.create(conn, &new_movie).await?;
                if !images.is_empty() {
                    repo.update_images(conn, movie.id, images.front, images.back)
                        .await?;
                }
                Ok(movie)
            })
        })
        .await?;

        info!(id = movie.id, name = %movie.name, "Movie created");
        Ok(movie)
    }

    /// Apply the fields named in `presence`.
    ///
    /// When either image is present the stored value of the other one is kept,
    /// then the pair is rewritten, or removed if both end up empty.
    pub async fn update_movie(&self, input: MovieUpdateInput, presence: FieldPresence) -> Result<Movie> {
        let repo = self.movies;
        let patch = input.to_patch(&presence, Utc::now());
        let front_present = presence.has("front_image");
        let back_present = presence.has("back_image");
        let MovieUpdateInput {
            front_image,
            back_image,
            ..
        } = input;

        let movie = with_transaction(self.db.pool(), move |conn| {
            Box::pin(async move {
                let movie = repo.update(conn, &patch).await?;

                if front_present || back_present {
                    let front = if front_present {
                        front_image.unwrap_or_default()
                    } else {
                        repo.get_front_image(conn, movie.id).await?
                    };
                    let back = if back_present {
                        back_image.unwrap_or_default()
                    } else {
                        repo.get_back_image(conn, movie.id).await?
                    };

                    if front.is_empty() && back.is_empty() {
                        repo.destroy_images(conn, movie.id).await?;
                    } else {
                        repo.update_images(conn, movie.id, Some(front), Some(back))
                            .await?;
                    }
                }

                Ok(movie)
            })
        })
        .await?;

        info!(id = movie.id, fields = presence.len(), "Movie updated");
        Ok(movie)
    }

    pub async fn destroy_movie(&self, id: i64) -> Result<()> {
        let repo = self.movies;
        with_transaction(self.db.pool(), move |conn| {
            Box::pin(async move { repo.destroy(conn, id).await })
        })
        .await?;

        info!(id, "Movie destroyed");
        Ok(())
    }

    /// Destroy every id in order; the first failure rolls back the whole batch.
    pub async fn destroy_movies(&self, ids: &[i64]) -> Result<()> {
        let repo = self.movies;
        let batch = ids.to_vec();
        let count = batch.len();

        with_transaction(self.db.pool(), move |conn| {
            Box::pin(async move {
                for id in batch {
                    repo.destroy(conn, id).await?;
                }
                Ok(())
            })
        })
        .await?;

        info!(count, "Movies destroyed");
        Ok(())
    }

    pub async fn find_movie(&self, id: i64) -> Result<Option<Movie>> {
        let mut conn = self.db.acquire().await?;
        self.movies.find(&mut conn, id).await
    }

    pub async fn find_movies(&self, ids: &[i64]) -> Result<Vec<Movie>> {
        let mut conn = self.db.acquire().await?;
        self.movies.find_many(&mut conn, ids).await
    }

    pub async fn find_movie_by_name(&self, name: &str, nocase: bool) -> Result<Option<Movie>> {
        let mut conn = self.db.acquire().await?;
        self.movies.find_by_name(&mut conn, name, nocase).await
    }

    pub async fn find_movies_by_scene(&self, scene_id: i64) -> Result<Vec<Movie>> {
        let mut conn = self.db.acquire().await?;
        self.movies.find_by_scene_id(&mut conn, scene_id).await
    }

    pub async fn query_movies(&self, filter: &MovieFilter, find: &FindFilter) -> Result<MovieQueryResult> {
        let mut conn = self.db.acquire().await?;
        self.movies.query(&mut conn, filter, find).await
    }

    pub async fn count_movies(&self) -> Result<i64> {
        let mut conn = self.db.acquire().await?;
        self.movies.count(&mut conn).await
    }

    pub async fn all_movies(&self) -> Result<Vec<Movie>> {
        let mut conn = self.db.acquire().await?;
        self.movies.all(&mut conn).await
    }

    pub async fn movie_front_image(&self, id: i64) -> Result<Vec<u8>> {
        let mut conn = self.db.acquire().await?;
        self.movies.get_front_image(&mut conn, id).await
    }

    pub async fn movie_back_image(&self, id: i64) -> Result<Vec<u8>> {
        let mut conn = self.db.acquire().await?;
        self.movies.get_back_image(&mut conn, id).await
    }
}
