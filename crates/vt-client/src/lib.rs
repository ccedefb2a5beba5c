//! vt-client: consumer side of the catalog API.
//!
//! [`api::HttpContentsApi`] talks to `GET /api/contents`; [`loader::ListLoader`]
//! drives it as an infinite list, accumulating de-duplicated pages as the
//! viewer scrolls or changes filters.

pub mod api;
pub mod error;
pub mod loader;

pub use api::{ContentItem, ContentPage, ContentQuery, ContentsApi, HttpContentsApi, PageInfo};
pub use error::ClientError;
pub use loader::{ListLoader, LoadStatus, LoaderSnapshot, ScrollMetrics};
