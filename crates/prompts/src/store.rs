//! Template store: named prompt fragments with a process-wide cache.
//!
//! Fragments live one per file as `<dir>/<name>.<ext>`. Resolution depends on
//! the [`PromptMode`]:
//!
//! - **production**: a cached fragment is returned without touching disk.
//! - **development**: every call re-reads the file (so prompt text can be
//!   edited while the server runs) and refreshes the cache.
//!
//! A fragment that cannot be read is a hard error: no prompt can be assembled
//! without it.

use async_trait::async_trait;
use huddle_config::PromptMode;
use huddle_core::error::PromptError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::template::{self, Variables};

/// Backing store for prompt fragments.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Read the full text of fragment `name`.
    async fn read(&self, name: &str) -> Result<String, PromptError>;

    /// Human-readable location, for logs and diagnostics.
    fn describe(&self) -> String;
}

/// Fragments stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a fragment name resolves to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{}", self.extension))
    }
}

/// Fragment names are plain file stems: no separators, no parent references.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != ".."
        && !name.starts_with('.')
}

#[async_trait]
impl FragmentSource for DirectorySource {
    async fn read(&self, name: &str) -> Result<String, PromptError> {
        if !is_valid_name(name) {
            return Err(PromptError::NotFound {
                name: name.to_string(),
                reason: "invalid fragment name".into(),
            });
        }

        let path = self.path_for(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PromptError::NotFound {
                name: name.to_string(),
                reason: format!("{}: {e}", path.display()),
            })
    }

    fn describe(&self) -> String {
        format!("{}/*.{}", self.dir.display(), self.extension)
    }
}

/// Owner of the fragment cache.
pub struct TemplateStore {
    source: Arc<dyn FragmentSource>,
    mode: PromptMode,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl TemplateStore {
    pub fn new(source: Arc<dyn FragmentSource>, mode: PromptMode) -> Self {
        Self {
            source,
            mode,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A store over `<dir>/<name>.<extension>` files.
    pub fn from_dir(dir: impl Into<PathBuf>, extension: impl Into<String>, mode: PromptMode) -> Self {
        Self::new(Arc::new(DirectorySource::new(dir, extension)), mode)
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Resolve a fragment by name.
    pub async fn get_fragment(&self, name: &str) -> Result<Arc<str>, PromptError> {
        if self.mode == PromptMode::Production {
            if let Some(hit) = self.cache.read().await.get(name) {
                return Ok(hit.clone());
            }
        }

        match self.source.read(name).await {
            Ok(content) => {
                let content: Arc<str> = Arc::from(content);
                debug!(fragment = name, len = content.len(), mode = %self.mode, "Loaded prompt fragment");
                self.cache
                    .write()
                    .await
                    .insert(name.to_string(), content.clone());
                Ok(content)
            }
            Err(e) => {
                error!(fragment = name, error = %e, "Failed to load prompt");
                Err(e)
            }
        }
    }

    /// Substitute `variables` into `template`.
    pub fn format(template: &str, variables: &Variables) -> String {
        template::format(template, variables)
    }

    #[cfg(test)]
    async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}
