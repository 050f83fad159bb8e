//! Database transaction utilities
//!
//! Multi-row writes (a schedule's topics and their due items) run through
//! [`with_transaction`] so they either all land or none do.

use std::future::Future;
use std::pin::Pin;

use sqlx::{PgPool, Postgres, Transaction};
use studybuddy_core::AppError;

/// Boxed future returned by a transactional closure
pub type TxFuture<'a, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'a>>;

/// Execute a closure within a database transaction
///
/// Begins a transaction, runs the closure, and commits on success. On error the
/// transaction is rolled back and the closure's error is returned unchanged.
///
/// # Example
///
/// ```ignore
/// use studybuddy_db::with_transaction;
///
/// async fn example(pool: &sqlx::PgPool) -> Result<(), AppError> {
///     with_transaction(pool, |tx| Box::pin(async move {
///         sqlx::query("INSERT INTO ...").execute(&mut **tx).await?;
///         Ok(())
///     })).await
/// }
/// ```
pub async fn with_transaction<F, R>(pool: &PgPool, f: F) -> Result<R, AppError>
where
    F: for<'a> FnOnce(&'a mut Transaction<'static, Postgres>) -> TxFuture<'a, R>,
{
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin database transaction");
        AppError::Database(e)
    })?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to commit database transaction");
                AppError::Database(e)
            })?;
            Ok(result)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Failed to rollback database transaction");
            }
            Err(err)
        }
    }
}
