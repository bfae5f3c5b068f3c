use crate::error::{MinifyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which rewriting passes run over a source file.
///
/// Keys use the packager's spelling (`code-optimize`, `rename-variable`,
/// `remove-comment`, `remove-whitespace`); missing keys fall back to
/// [`TransformOptions::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TransformOptions {
    pub code_optimize: bool,
    pub rename_variable: bool,
    pub remove_comment: bool,
    pub remove_whitespace: bool,
}

impl TransformOptions {
    /// Every pass disabled; the pipeline returns its input unchanged.
    pub fn none() -> Self {
        Self {
            code_optimize: false,
            rename_variable: false,
            remove_comment: false,
            remove_whitespace: false,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.code_optimize || self.rename_variable || self.remove_comment || self.remove_whitespace
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MinifyError::io(path, e))?;
        Self::from_json_str(&content)
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            code_optimize: true,
            rename_variable: true,
            remove_comment: true,
            remove_whitespace: true,
        }
    }
}
