//! Completion providers for Huddle.
//!
//! All providers implement the `huddle_core::Provider` trait.
//! [`build_from_config`] picks the backend described by configuration.

pub mod builder;
pub mod openai_compat;

pub use builder::{build_from_config, default_base_url};
pub use openai_compat::OpenAiCompatProvider;
