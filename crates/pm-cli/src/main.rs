//! phpmin - token-level PHP minifier.

use clap::Parser;
use pm_compactor::MinifyPipeline;
use pm_core::{MinifyError, Result};
use pm_lexer::Tokenizer;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod process;

use cli::Cli;
use process::{check_destinations, process_file, FileReport, Outcome};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            error!(failures, "some files could not be processed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Process every input; returns the number of files that failed.
fn run(cli: &Cli) -> Result<usize> {
    if cli.out_dir.is_none() && cli.inputs.len() > 1 && !cli.tokens {
        return Err(anyhow::anyhow!("more than one input needs --out-dir").into());
    }
    let pipeline = MinifyPipeline::new(cli.options()?, cli.symbols()?);
    if cli.tokens {
        return dump_tokens(cli, &pipeline);
    }
    if let Some(dir) = &cli.out_dir {
        check_destinations(&cli.inputs, dir)?;
        fs::create_dir_all(dir).map_err(|e| MinifyError::io(dir, e))?;
    }

    let results: Vec<(PathBuf, Result<FileReport>)> = cli
        .inputs
        .par_iter()
        .map(|input| {
            let report = process_file(&pipeline, input).and_then(|report| {
                if let Some(dir) = &cli.out_dir {
                    report.write_to(dir)?;
                }
                Ok(report)
            });
            (input.clone(), report)
        })
        .collect();

    let mut failures = 0;
    let mut maps: BTreeMap<String, HashMap<String, String>> = BTreeMap::new();
    for (input, result) in results {
        match result {
            Ok(report) => {
                if cli.out_dir.is_none() {
                    std::io::stdout()
                        .write_all(report.content())
                        .map_err(|e| MinifyError::io("<stdout>", e))?;
                }
                if let Outcome::Minified(minified) = report.outcome {
                    if let Some(map) = minified.rename_map {
                        maps.insert(input.display().to_string(), map);
                    }
                }
            }
            Err(e) => {
                error!(file = %input.display(), "{e}");
                failures += 1;
            }
        }
    }

    if let Some(path) = &cli.map {
        let json = serde_json::to_string_pretty(&maps).map_err(anyhow::Error::from)?;
        fs::write(path, json).map_err(|e| MinifyError::io(path, e))?;
    }
    Ok(failures)
}

/// One JSON array of tokens per input line.
fn dump_tokens(cli: &Cli, pipeline: &MinifyPipeline) -> Result<usize> {
    let mut stdout = std::io::stdout().lock();
    for input in &cli.inputs {
        let source = fs::read_to_string(input).map_err(|e| MinifyError::io(input, e))?;
        let stream = pipeline.tokenizer().tokenize(&source);
        let json = serde_json::to_string(stream.tokens()).map_err(anyhow::Error::from)?;
        writeln!(stdout, "{json}").map_err(|e| MinifyError::io("<stdout>", e))?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests;
