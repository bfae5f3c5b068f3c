//! Minification pipeline: runs the enabled passes in a fixed order.

use crate::{pass1_qualify, pass2_rename, pass3_comments, pass4_whitespace};
use pm_core::{SymbolOracle, TransformOptions};
use pm_lexer::{PhpLexer, Tokenizer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A rewriting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    CodeOptimize,
    RenameVariable,
    RemoveComment,
    RemoveWhitespace,
}

impl Pass {
    /// Execution order.
    pub const ORDER: [Pass; 4] = [
        Pass::CodeOptimize,
        Pass::RenameVariable,
        Pass::RemoveComment,
        Pass::RemoveWhitespace,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CodeOptimize => "code-optimize",
            Self::RenameVariable => "rename-variable",
            Self::RemoveComment => "remove-comment",
            Self::RemoveWhitespace => "remove-whitespace",
        }
    }

    pub fn is_enabled(self, options: &TransformOptions) -> bool {
        match self {
            Self::CodeOptimize => options.code_optimize,
            Self::RenameVariable => options.rename_variable,
            Self::RemoveComment => options.remove_comment,
            Self::RemoveWhitespace => options.remove_whitespace,
        }
    }
}

/// Minification result with statistics.
#[derive(Debug, Clone)]
pub struct MinifyResult {
    pub output: String,
    pub original_len: usize,
    pub minified_len: usize,
    pub reduction_pct: f64,
    pub passes_applied: Vec<String>,
    pub renamed_variables: usize,
    /// Original to replacement name, when the rename pass ran.
    pub rename_map: Option<HashMap<String, String>>,
}

impl MinifyResult {
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            return 1.0;
        }
        self.minified_len as f64 / self.original_len as f64
    }
}

/// The main minifier pipeline.
pub struct MinifyPipeline {
    pub options: TransformOptions,
    oracle: Arc<dyn SymbolOracle>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl MinifyPipeline {
    pub fn new(options: TransformOptions, oracle: impl SymbolOracle + 'static) -> Self {
        Self {
            options,
            oracle: Arc::new(oracle),
            tokenizer: Arc::new(PhpLexer),
        }
    }

    /// Replace the default lexer.
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Minify one source unit. Each pass re-tokenizes the previous output.
    pub fn minify(&self, source: &str) -> MinifyResult {
        let original_len = source.len();
        let mut result = source.to_string();
        let mut passes = Vec::new();
        let mut rename_map = None;
        let mut renamed_variables = 0;

        for pass in Pass::ORDER {
            if !pass.is_enabled(&self.options) {
                continue;
            }
            let next = {
                let stream = self.tokenizer.tokenize(&result);
                match pass {
                    Pass::CodeOptimize => pass1_qualify::rewrite(&stream, self.oracle.as_ref()),
                    Pass::RenameVariable => {
                        let outcome = pass2_rename::rewrite(&stream);
                        renamed_variables = outcome.table.len();
                        rename_map = Some(outcome.table.into_map());
                        outcome.output
                    }
                    Pass::RemoveComment => pass3_comments::rewrite(&stream),
                    Pass::RemoveWhitespace => pass4_whitespace::rewrite(&stream),
                }
            };
            debug!(pass = pass.name(), before = result.len(), after = next.len(), "pass applied");
            result = next;
            passes.push(pass.name().to_string());
        }

        let minified_len = result.len();
        let reduction = if original_len > 0 {
            (original_len as f64 - minified_len as f64) / original_len as f64 * 100.0
        } else {
            0.0
        };

        MinifyResult {
            output: result,
            original_len,
            minified_len,
            reduction_pct: reduction,
            passes_applied: passes,
            renamed_variables,
            rename_map,
        }
    }
}

impl Default for MinifyPipeline {
    fn default() -> Self {
        Self::new(TransformOptions::default(), pm_core::SymbolTable::builtin())
    }
}
