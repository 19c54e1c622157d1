//! Transaction coordinator
//!
//! Runs a unit of work on one transaction: commit when it succeeds, roll back
//! when it fails. The work receives a plain `&mut SqliteConnection`, so every
//! repository method can take part in it unchanged.

use futures::future::BoxFuture;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::Result;

/// Run `work` inside a transaction.
///
/// On `Ok` the transaction is committed and the value returned. On `Err` it is
/// rolled back and the work's own error is returned unchanged; a failure of the
/// rollback itself is only logged. If the returned future is dropped before it
/// completes, sqlx rolls the transaction back when it is dropped.
///
/// ```rust,ignore
/// let movie = with_transaction(&pool, move |conn| {
///     Box::pin(async move { repo.create(conn, &input).await })
/// })
/// .await?;
/// ```
pub async fn with_transaction<T, F>(pool: &SqlitePool, work: F) -> Result<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
{
    let mut tx = pool.begin().await?;

    match work(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after error: {}", err);
            } else {
                debug!(error = %err, "Transaction rolled back");
            }
            Err(err)
        }
    }
}
