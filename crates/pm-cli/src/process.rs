//! Per-file minification.

use pm_compactor::{MinifyPipeline, MinifyResult};
use pm_core::{MinifyError, Result};
use pm_lexer::Tokenizer;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub enum Outcome {
    Minified(MinifyResult),
    /// Not a PHP source; carried through byte for byte.
    Copied(Vec<u8>),
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: Outcome,
}

impl FileReport {
    pub fn content(&self) -> &[u8] {
        match &self.outcome {
            Outcome::Minified(result) => result.output.as_bytes(),
            Outcome::Copied(bytes) => bytes,
        }
    }

    /// Write the result next to its siblings in `out_dir`.
    pub fn write_to(&self, out_dir: &Path) -> Result<PathBuf> {
        let dest = output_path(&self.input, out_dir);
        fs::write(&dest, self.content()).map_err(|e| MinifyError::io(&dest, e))?;
        Ok(dest)
    }
}

pub fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.join(input),
    }
}

/// Fail when two inputs would be written to the same file in `out_dir`.
pub fn check_destinations(inputs: &[PathBuf], out_dir: &Path) -> Result<()> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for input in inputs {
        let dest = output_path(input, out_dir);
        if let Some(first) = seen.insert(dest.clone(), input) {
            return Err(anyhow::anyhow!(
                "{} and {} both write to {}",
                first.display(),
                input.display(),
                dest.display()
            )
            .into());
        }
    }
    Ok(())
}

/// Minify `input` if the pipeline's lexer handles it, otherwise read it for copying.
pub fn process_file(pipeline: &MinifyPipeline, input: &Path) -> Result<FileReport> {
    let outcome = if pipeline.tokenizer().can_tokenize(input) {
        let source = fs::read_to_string(input).map_err(|e| MinifyError::io(input, e))?;
        let result = pipeline.minify(&source);
        info!(
            file = %input.display(),
            before = result.original_len,
            after = result.minified_len,
            reduction_pct = result.reduction_pct,
            "minified"
        );
        Outcome::Minified(result)
    } else {
        let bytes = fs::read(input).map_err(|e| MinifyError::io(input, e))?;
        debug!(file = %input.display(), "copying unchanged");
        Outcome::Copied(bytes)
    };
    Ok(FileReport {
        input: input.to_path_buf(),
        outcome,
    })
}
