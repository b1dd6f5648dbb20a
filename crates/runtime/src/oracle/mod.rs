//! Runtime wrapper around the static definition tables.
//!
//! The [`OracleManager`] shares one immutable [`ContentBundle`] and hands out
//! [`ProgressionEnv`] views on demand. Dynamic state lives in the roster and
//! the snapshot repositories, never here.

use std::sync::Arc;

use progression_content::ContentBundle;
use progression_core::{ProgressionConfig, ProgressionEnv};

#[derive(Clone, Debug)]
pub struct OracleManager {
    content: Arc<ContentBundle>,
}

impl OracleManager {
    pub fn new(content: Arc<ContentBundle>) -> Self {
        Self { content }
    }

    /// Converts the manager into the engine's oracle view.
    pub fn as_env(&self) -> ProgressionEnv<'_> {
        self.content.env()
    }

    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    pub fn config(&self) -> &ProgressionConfig {
        self.content.config()
    }
}

impl From<ContentBundle> for OracleManager {
    fn from(content: ContentBundle) -> Self {
        Self::new(Arc::new(content))
    }
}
