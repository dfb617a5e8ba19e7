//! Activity catalog for Huddle.
//!
//! - [`loader`]: reads the JSON search index once and caches it for the
//!   life of the process
//! - [`search`]: deterministic lexical scoring over the cached corpus

pub mod loader;
pub mod search;

pub use loader::{ActivityCatalog, Corpus};
pub use search::{MAX_RESULTS, MIN_QUERY_CHARS, search};
