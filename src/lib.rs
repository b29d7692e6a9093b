//! Prospect search - filter-to-query compilation engine
//!
//! Compiles a loosely-typed set of contact/company search filters into an
//! executable, paginated query plan:
//! - Strongly-typed filter specification over a fixed field catalog
//! - Predicate planning (which related-entity checks a request needs)
//! - EXISTS-based query compilation with deterministic ordering
//! - Opaque cursor and offset pagination
//! - Apollo search-URL translation
//! - Bounded batched execution for large result windows

pub mod config;
pub mod error;
pub mod schema;
pub mod search;

pub use config::SearchConfig;
pub use error::{Error, Result};
