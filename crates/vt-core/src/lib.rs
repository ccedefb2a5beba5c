//! vt-core: shared error type, configuration, and catalog domain types.
//!
//! This crate is the foundational dependency for all other vt-* crates. It
//! owns the pure parts of the catalog engine: title normalization, search
//! relevance tiers, and new-content label classification.

pub mod config;
pub mod error;
pub mod media;
pub mod text;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
