//! Movie catalog - query the catalog from the command line
//!
//! Loads configuration from the environment, opens the database and prints
//! one filtered page of movies as JSON.

use anyhow::Context;

use movie_catalog::cli::CliOptions;
use movie_catalog::config::Config;
use movie_catalog::db::{Database, MovieRepository};
use movie_catalog::logging::init_tracing;
use movie_catalog::Catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Starting movie catalog");
    tracing::info!(path = %config.database_path, hydration = ?config.hydration, "Configuration loaded");

    let db = Database::connect(&config)
        .await
        .context("Failed to open database")?;
    db.ensure_schema().await.context("Failed to bootstrap schema")?;

    let options = CliOptions::from_args();
    let catalog = Catalog::new(db.clone(), MovieRepository::new(config.hydration));

    let result = catalog
        .query_movies(&options.filter, &options.find)
        .await
        .context("Movie query failed")?;

    tracing::info!(
        count = result.count,
        returned = result.movies.len(),
        warnings = result.warnings.len(),
        "Query complete"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    db.close().await;
    Ok(())
}
