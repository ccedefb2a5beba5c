//! Application context shared by all request handlers.
//!
//! [`AppContext`] is handed to Axum as router state. It only holds the
//! connection pool and an immutable configuration snapshot, so it is cheap to
//! clone per request.

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;
use vt_core::config::Config;
use vt_core::{Error, Result};
use vt_db::pool::DbPool;

#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db: DbPool, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Run `f` on a pooled connection inside a blocking task.
    ///
    /// Each call checks out its own connection, so independent queries can
    /// be awaited together.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = vt_db::pool::get_conn(&db)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("Blocking task failed: {e}")))?
    }

    /// Reference date for label classification.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_conn_runs_queries() {
        let db = vt_db::pool::init_memory_pool().unwrap();
        let ctx = AppContext::new(db, Arc::new(Config::default()));

        let (a, b) = tokio::try_join!(
            ctx.with_conn(|conn| vt_db::queries::contents::years(conn)),
            ctx.with_conn(|conn| vt_db::queries::genres::list_genres(conn)),
        )
        .unwrap();
        assert!(a.is_empty());
        assert!(b.is_empty());
    }

    #[tokio::test]
    async fn with_conn_propagates_errors() {
        let db = vt_db::pool::init_memory_pool().unwrap();
        let ctx = AppContext::new(db, Arc::new(Config::default()));

        let err = ctx
            .with_conn(|_| -> Result<()> { Err(Error::validation("nope")) })
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}
