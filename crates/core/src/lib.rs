//! # Huddle Core
//!
//! Domain types, traits, and error definitions for Huddle, the facilitator's
//! activity finder. This crate has **zero framework dependencies**; it
//! defines the domain model that all other crates implement against.
//!
//! - [`activity`]: the immutable activity record and scored results
//! - [`metadata`]: typed details extracted from an activity's detail lines
//! - [`provider`]: the completion backend trait
//! - [`error`]: one error enum per bounded context

pub mod activity;
pub mod error;
pub mod message;
pub mod metadata;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use activity::{ActivityRecord, ScoredResult};
pub use error::{CatalogError, Error, PromptError, ProviderError, Result};
pub use message::{Message, Role};
pub use metadata::{ActivityMetadata, CategoryMap};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
