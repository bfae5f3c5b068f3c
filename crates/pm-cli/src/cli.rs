//! Command-line arguments for phpmin.

use clap::Parser;
use pm_core::{Result, SymbolTable, TransformOptions};
use std::path::PathBuf;

/// phpmin - shrink PHP sources before packaging
#[derive(Parser, Debug)]
#[command(name = "phpmin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source files; `.php` files are minified, anything else is copied unchanged
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write results into this directory instead of stdout
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// JSON file with pass switches (`code-optimize`, `rename-variable`, ...)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file listing extra global constants and functions
    #[arg(long)]
    pub symbols: Option<PathBuf>,

    /// Start from an empty symbol table instead of the core PHP symbols
    #[arg(long)]
    pub no_builtin_symbols: bool,

    #[arg(long)]
    pub no_code_optimize: bool,

    #[arg(long)]
    pub no_rename_variable: bool,

    #[arg(long)]
    pub no_remove_comment: bool,

    #[arg(long)]
    pub no_remove_whitespace: bool,

    /// Write every file's variable rename map to this JSON file
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Print each input's token stream as JSON instead of minifying
    #[arg(long)]
    pub tokens: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Config file (or defaults) with the `--no-*` switches applied on top.
    pub fn options(&self) -> Result<TransformOptions> {
        let mut options = match &self.config {
            Some(path) => TransformOptions::load(path)?,
            None => TransformOptions::default(),
        };
        if self.no_code_optimize {
            options.code_optimize = false;
        }
        if self.no_rename_variable {
            options.rename_variable = false;
        }
        if self.no_remove_comment {
            options.remove_comment = false;
        }
        if self.no_remove_whitespace {
            options.remove_whitespace = false;
        }
        Ok(options)
    }

    pub fn symbols(&self) -> Result<SymbolTable> {
        let mut table = if self.no_builtin_symbols {
            SymbolTable::new()
        } else {
            SymbolTable::builtin()
        };
        if let Some(path) = &self.symbols {
            table.extend(SymbolTable::load(path)?);
        }
        Ok(table)
    }
}
