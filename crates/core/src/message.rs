//! Message domain types.
//!
//! A generation request is always a two-message exchange: the assembled
//! system prompt followed by the assembled user prompt.

use serde::{Deserialize, Serialize};

/// Chat role in an OpenAI-style exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Carries the filled user template
    User,
    /// Generated text coming back
    Assistant,
    /// Shared context plus the feature system fragment
    System,
}

/// One chat message exchanged with a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}
