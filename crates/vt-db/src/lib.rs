//! vt-db: catalog storage and the query engine.
//!
//! SQLite-backed storage with connection pooling, embedded migrations, typed
//! models, a parameter-tracking [`sql::QueryBuilder`], and query modules for
//! search, related content, TV structure, facets and analytics.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod sql;
