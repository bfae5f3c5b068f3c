//! PHP source minifier: four token-level rewriting passes.
//!
//! Passes, in the order the pipeline runs them:
//! 1. Code optimize: qualify known globals, normalize `and` / `or`
//! 2. Rename variables to short generated names
//! 3. Remove comments, keeping handler annotations
//! 4. Remove whitespace

pub mod alphabet;
pub mod glue;
pub mod pass1_qualify;
pub mod pass2_rename;
pub mod pass3_comments;
pub mod pass4_whitespace;
pub mod pipeline;

pub use alphabet::NameAlphabet;
pub use pass2_rename::{RenameOutcome, RenameTable};
pub use pass3_comments::{Annotation, Directive};
pub use pipeline::{MinifyPipeline, MinifyResult, Pass};

use pm_core::TokenStream;

pub(crate) fn source_len(stream: &TokenStream<'_>) -> usize {
    stream.iter().map(|t| t.text.len()).sum()
}
