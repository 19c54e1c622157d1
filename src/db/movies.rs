//! Movie database repository

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::db::collation::NATURAL_COLLATION;
use crate::db::sqlite_helpers::{execute_delete_by, fetch_ids, get_blob, in_binding, run_count_query};
use crate::error::{CatalogError, Result};
use crate::models::{FindFilter, Movie, MovieFilter, MovieImages, MovieName, MoviePatch, NewMovie};
use crate::orm::{
    bind_all, is_missing_clause, multi_criterion_clause, search_clause, sort_clause,
    AssembledQuery, EntityDef, MissingField, Relation, RelationLink, SelectQuery, SqlValue,
};

const ENTITY: &str = "movie";

const MOVIE_COLUMNS: &str = "movies.id, movies.checksum, movies.name, movies.aliases, \
    movies.duration, movies.date, movies.rating, movies.studio_id, movies.director, \
    movies.synopsis, movies.url, movies.created_at, movies.updated_at";

/// Filterable shape of the `movies` table
pub const MOVIES: EntityDef = EntityDef {
    table: "movies",
    entity_name: ENTITY,
    columns: &[
        "id",
        "checksum",
        "name",
        "aliases",
        "duration",
        "date",
        "rating",
        "studio_id",
        "director",
        "synopsis",
        "url",
        "created_at",
        "updated_at",
    ],
    search_columns: &["movies.name", "movies.aliases"],
    sortable: &[
        "name",
        "date",
        "rating",
        "duration",
        "created_at",
        "updated_at",
    ],
    default_sort: "name",
    natural_sort: &["name"],
    relations: &[
        Relation {
            name: "studios",
            link: RelationLink::Column("studio_id"),
            join: "LEFT JOIN studios AS studio ON studio.id = movies.studio_id",
            key: "studio.id",
        },
        Relation {
            name: "scenes",
            link: RelationLink::JoinTable {
                table: "movies_scenes",
                owner_column: "movie_id",
                target_column: "scene_id",
            },
            join: "LEFT JOIN movies_scenes AS scenes_join ON scenes_join.movie_id = movies.id",
            key: "scenes_join.scene_id",
        },
    ],
    missing_fields: &[
        MissingField {
            name: "front_image",
            join: "LEFT JOIN movies_images ON movies_images.movie_id = movies.id",
            column: "movies_images.front_image",
        },
        MissingField {
            name: "back_image",
            join: "LEFT JOIN movies_images ON movies_images.movie_id = movies.id",
            column: "movies_images.back_image",
        },
        MissingField {
            name: "scenes",
            join: "LEFT JOIN movies_scenes ON movies_scenes.movie_id = movies.id",
            column: "movies_scenes.scene_id",
        },
    ],
};

/// What `query` does when an id from the listing no longer resolves to a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationPolicy {
    /// Fail the whole query with `NotFound`
    Strict,
    /// Skip the id and report it in [`MovieQueryResult::warnings`]
    #[default]
    BestEffort,
}

/// An id that matched the filter but could not be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsistencyWarning {
    pub id: i64,
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieQueryResult {
    pub movies: Vec<Movie>,
    /// Total matches, ignoring pagination
    pub count: i64,
    pub warnings: Vec<ConsistencyWarning>,
}

/// Build the id and count statements for a filtered movie listing.
///
/// Every identifier is resolved against [`MOVIES`] here, so an unknown
/// relation or is-missing field fails before anything is executed.
pub fn build_movie_query(filter: &MovieFilter, find: &FindFilter) -> Result<AssembledQuery> {
    let mut query = SelectQuery::new(MOVIES.table);

    if let Some(clause) = find
        .search_term()
        .and_then(|term| search_clause(MOVIES.search_columns, term))
    {
        query = query.clause(clause);
    }

    let criteria = filter
        .criteria
        .iter()
        .map(|criterion| multi_criterion_clause(&MOVIES, criterion))
        .collect::<Result<Vec<_>>>()?;
    query = query.clauses(criteria.into_iter().flatten());

    if let Some(field) = filter.is_missing.as_deref() {
        query = query.clause(is_missing_clause(&MOVIES, field)?);
    }

    Ok(query
        .order_by(sort_clause(&MOVIES, find))
        .paginate(find.pagination())
        .assemble())
}

/// Movie persistence.
///
/// Holds no connection: every method runs on the connection it is given, so
/// the same calls work on a pooled connection or inside a transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieRepository {
    hydration: HydrationPolicy,
}

impl MovieRepository {
    pub fn new(hydration: HydrationPolicy) -> Self {
        Self { hydration }
    }

    /// Insert a movie and return the stored row
    pub async fn create(&self, conn: &mut SqliteConnection, input: &NewMovie) -> Result<Movie> {
        let params: Vec<SqlValue> = vec![
            input.checksum.clone().into(),
            input.name.clone().into(),
            input.aliases.clone().into(),
            input.duration.into(),
            input.date.into(),
            input.rating.into(),
            input.studio_id.into(),
            input.director.clone().into(),
            input.synopsis.clone().into(),
            input.url.clone().into(),
            input.created_at.into(),
            input.updated_at.into(),
        ];

        let sql = r#"
            INSERT INTO movies (
                checksum, name, aliases, duration, date, rating, studio_id,
                director, synopsis, url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;
        let result = bind_all(sql, &params).execute(&mut *conn).await?;
        let id = result.last_insert_rowid();
        debug!(id, name = %input.name, "Created movie");

        self.find(conn, id)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, id))
    }

    /// Apply a partial update. Only fields the patch mentions are written.
    pub async fn update(&self, conn: &mut SqliteConnection, patch: &MoviePatch) -> Result<Movie> {
        let set = patch.set_list();
        debug!(id = patch.id, columns = ?set.columns(), "Updating movie");
        let (assignments, params) = set.into_sql();
        self.apply_update(conn, patch.id, assignments, params).await
    }

    /// Replace every column of an existing movie
    pub async fn update_full(&self, conn: &mut SqliteConnection, movie: &Movie) -> Result<Movie> {
        let (assignments, params) = movie.full_set_list().into_sql();
        self.apply_update(conn, movie.id, assignments, params).await
    }

    async fn apply_update(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        assignments: String,
        mut params: Vec<SqlValue>,
    ) -> Result<Movie> {
        let sql = format!("UPDATE movies SET {assignments} WHERE id = ?");
        params.push(SqlValue::Int(id));

        let result = bind_all(&sql, &params).execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found(ENTITY, id));
        }

        self.find(conn, id)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, id))
    }

    pub async fn find(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movies.id = ?");
        let movie = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(movie)
    }

    /// Load movies in the order given; the first missing id aborts with `NotFound`
    pub async fn find_many(&self, conn: &mut SqliteConnection, ids: &[i64]) -> Result<Vec<Movie>> {
        let mut movies = Vec::with_capacity(ids.len());
        for &id in ids {
            let movie = self
                .find(conn, id)
                .await?
                .ok_or_else(|| CatalogError::not_found(ENTITY, id))?;
            movies.push(movie);
        }
        Ok(movies)
    }

    pub async fn find_by_name(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
        nocase: bool,
    ) -> Result<Option<Movie>> {
        let collate = if nocase { " COLLATE NOCASE" } else { "" };
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movies.name = ?{collate} LIMIT 1");
        let movie = sqlx::query_as::<_, Movie>(&sql)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(movie)
    }

    pub async fn find_by_names(
        &self,
        conn: &mut SqliteConnection,
        names: &[String],
        nocase: bool,
    ) -> Result<Vec<Movie>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let collate = if nocase { " COLLATE NOCASE" } else { "" };
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE movies.name{collate} IN {} \
             ORDER BY movies.name COLLATE {NATURAL_COLLATION} ASC, movies.id ASC",
            in_binding(names.len())
        );
        let query = names
            .iter()
            .fold(sqlx::query_as::<_, Movie>(&sql), |q, name| q.bind(name.as_str()));
        Ok(query.fetch_all(&mut *conn).await?)
    }

    /// Movies that contain the given scene
    pub async fn find_by_scene_id(&self, conn: &mut SqliteConnection, scene_id: i64) -> Result<Vec<Movie>> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             INNER JOIN movies_scenes ON movies_scenes.movie_id = movies.id \
             WHERE movies_scenes.scene_id = ? \
             ORDER BY movies.name COLLATE {NATURAL_COLLATION} ASC, movies.id ASC"
        );
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(scene_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(movies)
    }

    pub async fn count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        run_count_query(conn, "SELECT COUNT(*) FROM movies", &[]).await
    }

    pub async fn all(&self, conn: &mut SqliteConnection) -> Result<Vec<Movie>> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             ORDER BY movies.name COLLATE {NATURAL_COLLATION} ASC, movies.id ASC"
        );
        Ok(sqlx::query_as::<_, Movie>(&sql).fetch_all(&mut *conn).await?)
    }

    /// Id and name of every movie, for pickers
    pub async fn all_slim(&self, conn: &mut SqliteConnection) -> Result<Vec<MovieName>> {
        let sql = format!(
            "SELECT movies.id, movies.name FROM movies \
             ORDER BY movies.name COLLATE {NATURAL_COLLATION} ASC, movies.id ASC"
        );
        Ok(sqlx::query_as::<_, MovieName>(&sql).fetch_all(&mut *conn).await?)
    }

    /// Filtered, sorted, paginated listing.
    ///
    /// Runs the count and id statements, then loads each id. An id that has
    /// vanished in between is handled according to the hydration policy.
    pub async fn query(
        &self,
        conn: &mut SqliteConnection,
        filter: &MovieFilter,
        find: &FindFilter,
    ) -> Result<MovieQueryResult> {
        let assembled = build_movie_query(filter, find)?;

        let count = run_count_query(conn, &assembled.count.sql, &assembled.count.params).await?;
        let ids = fetch_ids(conn, &assembled.ids.sql, &assembled.ids.params).await?;

        let (movies, warnings) = self.hydrate(conn, &ids).await?;

        Ok(MovieQueryResult {
            movies,
            count,
            warnings,
        })
    }

    /// Load listed ids in order, applying the hydration policy to ids that no
    /// longer exist. Storage errors always propagate.
    pub async fn hydrate(
        &self,
        conn: &mut SqliteConnection,
        ids: &[i64],
    ) -> Result<(Vec<Movie>, Vec<ConsistencyWarning>)> {
        let mut movies = Vec::with_capacity(ids.len());
        let mut warnings = Vec::new();
        for &id in ids {
            match self.find(conn, id).await? {
                Some(movie) => movies.push(movie),
                None => match self.hydration {
                    HydrationPolicy::Strict => return Err(CatalogError::not_found(ENTITY, id)),
                    HydrationPolicy::BestEffort => {
                        warn!(id, "Movie matched the listing but could not be loaded");
                        warnings.push(ConsistencyWarning { id });
                    }
                },
            }
        }
        Ok((movies, warnings))
    }

    /// Delete a movie together with its scene links and images.
    /// Deleting an id that does not exist is a no-op.
    pub async fn destroy(&self, conn: &mut SqliteConnection, id: i64) -> Result<()> {
        let links = execute_delete_by(conn, "movies_scenes", "movie_id", id).await?;
        let images = execute_delete_by(conn, "movies_images", "movie_id", id).await?;
        let rows = execute_delete_by(conn, "movies", "id", id).await?;
        debug!(id, links, images, rows, "Destroyed movie");
        Ok(())
    }

    /// Replace the stored images of a movie.
    ///
    /// Empty payloads count as absent. A back image without a front image gets
    /// the default front image. With neither, the images row is only removed.
    pub async fn update_images(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        front: Option<Vec<u8>>,
        back: Option<Vec<u8>>,
    ) -> Result<()> {
        self.destroy_images(conn, id).await?;

        let images = MovieImages::new(front, back).with_default_front();
        if images.is_empty() {
            return Ok(());
        }

        let params = [SqlValue::Int(id), images.front.into(), images.back.into()];
        bind_all(
            "INSERT INTO movies_images (movie_id, front_image, back_image) VALUES (?, ?, ?)",
            &params,
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn destroy_images(&self, conn: &mut SqliteConnection, id: i64) -> Result<()> {
        execute_delete_by(conn, "movies_images", "movie_id", id).await?;
        Ok(())
    }

    /// Front image bytes; empty when there is none
    pub async fn get_front_image(&self, conn: &mut SqliteConnection, id: i64) -> Result<Vec<u8>> {
        get_blob(conn, "SELECT front_image FROM movies_images WHERE movie_id = ?", id).await
    }

    /// Back image bytes; empty when there is none
    pub async fn get_back_image(&self, conn: &mut SqliteConnection, id: i64) -> Result<Vec<u8>> {
        get_blob(conn, "SELECT back_image FROM movies_images WHERE movie_id = ?", id).await
    }
}
