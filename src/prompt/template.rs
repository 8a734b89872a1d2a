//! Prompt template files, one per task.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::{self, ParameterOverrides};
use crate::error::TemplateError;

/// Extension of template files in the prompts directory.
const TEMPLATE_EXTENSION: &str = "yml";

/// A task's prompt pair plus optional call-parameter overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptTemplate {
    /// Empty when the template has no system prompt.
    #[serde(default)]
    pub system_prompt: String,
    pub user_prompt: String,
    #[serde(default)]
    pub parameters: ParameterOverrides,
}

/// Reads templates from a fixed directory, keyed by task name.
///
/// No caching: each `load` re-reads the file, which keeps repeated loads
/// idempotent without any shared state.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `<asset_dir>/prompts`.
    pub fn in_asset_dir(asset_dir: &Path) -> Self {
        Self::new(asset_dir.join(config::PROMPTS_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the template for `task` is expected at.
    pub fn path_for(&self, task: &str) -> PathBuf {
        self.dir.join(format!("{task}.{TEMPLATE_EXTENSION}"))
    }

    /// Load the template for `task`.
    ///
    /// A missing file is a packaging defect and is reported as
    /// [`TemplateError::NotFound`].
    pub fn load(&self, task: &str) -> Result<PromptTemplate, TemplateError> {
        let path = self.path_for(task);

        if !is_plain_task_name(task) || !path.is_file() {
            return Err(TemplateError::NotFound {
                task: task.to_string(),
                path,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
            path: path.clone(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| TemplateError::Parse { path, source })
    }
}

/// Task names map straight to file names, so they must not walk the tree.
fn is_plain_task_name(task: &str) -> bool {
    !task.is_empty()
        && !task.contains(['/', '\\'])
        && task != "."
        && task != ".."
}
