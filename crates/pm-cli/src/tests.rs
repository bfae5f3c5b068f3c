use crate::cli::Cli;
use crate::process::{check_destinations, output_path, process_file, Outcome};
use crate::run;
use clap::Parser;
use pm_compactor::MinifyPipeline;
use pm_core::{SymbolOracle, TransformOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("phpmin").chain(args.iter().copied())).unwrap()
}

// ========== Arguments ==========

#[test]
fn test_requires_inputs() {
    assert!(Cli::try_parse_from(["phpmin"]).is_err());
}

#[test]
fn test_default_options_enable_everything() {
    let cli = parse(&["a.php"]);
    assert_eq!(cli.options().unwrap(), TransformOptions::default());
    assert!(cli.out_dir.is_none());
}

#[test]
fn test_no_flags_disable_passes() {
    let cli = parse(&["a.php", "--no-rename-variable", "--no-code-optimize"]);
    let options = cli.options().unwrap();
    assert!(!options.rename_variable);
    assert!(!options.code_optimize);
    assert!(options.remove_comment);
    assert!(options.remove_whitespace);
}

#[test]
fn test_config_file_then_flags() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("minify.json");
    fs::write(&config, r#"{"remove-comment": false}"#).unwrap();
    let cli = parse(&["a.php", "-c", config.to_str().unwrap(), "--no-remove-whitespace"]);
    let options = cli.options().unwrap();
    assert!(!options.remove_comment);
    assert!(!options.remove_whitespace);
    assert!(options.rename_variable);
}

#[test]
fn test_symbols_file_extends_builtins() {
    let dir = TempDir::new().unwrap();
    let symbols = dir.path().join("symbols.json");
    fs::write(&symbols, r#"{"constants": ["MY_FLAG"], "functions": ["my_helper"]}"#).unwrap();

    let cli = parse(&["a.php", "--symbols", symbols.to_str().unwrap()]);
    let table = cli.symbols().unwrap();
    assert!(table.is_constant("MY_FLAG"));
    assert!(table.is_function("my_helper"));
    assert!(table.is_function("strlen"));

    let bare = parse(&["a.php", "--no-builtin-symbols", "--symbols", symbols.to_str().unwrap()]);
    let table = bare.symbols().unwrap();
    assert!(table.is_function("my_helper"));
    assert!(!table.is_function("strlen"));
}

#[test]
fn test_missing_config_is_an_error() {
    let cli = parse(&["a.php", "-c", "/nonexistent/minify.json"]);
    assert!(cli.options().is_err());
}

// ========== Files ==========

#[test]
fn test_output_path_keeps_file_name() {
    assert_eq!(
        output_path(Path::new("src/plugin/Main.php"), Path::new("out")),
        Path::new("out/Main.php")
    );
}

#[test]
fn test_check_destinations_rejects_same_file_name() {
    let inputs = vec![PathBuf::from("a/x.php"), PathBuf::from("b/x.php")];
    let err = check_destinations(&inputs, Path::new("out")).unwrap_err();
    assert!(err.to_string().contains("x.php"));

    let distinct = vec![PathBuf::from("a/x.php"), PathBuf::from("a/y.php")];
    assert!(check_destinations(&distinct, Path::new("out")).is_ok());
}

#[test]
fn test_process_php_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("Main.php");
    fs::write(&input, "<?php\n// hi\n$value = 1;\necho $value;\n").unwrap();

    let report = process_file(&MinifyPipeline::default(), &input).unwrap();
    assert_eq!(report.content(), b"<?php $a=1;echo $a;");
    assert!(matches!(report.outcome, Outcome::Minified(_)));
}

#[test]
fn test_process_other_file_copies_bytes() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("plugin.yml");
    fs::write(&input, "name: Demo\n  version: 1\n").unwrap();

    let report = process_file(&MinifyPipeline::default(), &input).unwrap();
    assert_eq!(report.content(), b"name: Demo\n  version: 1\n");
    assert!(matches!(report.outcome, Outcome::Copied(_)));
}

#[test]
fn test_process_missing_file_fails() {
    let result = process_file(&MinifyPipeline::default(), Path::new("/nonexistent/x.php"));
    assert!(result.is_err());
}

#[test]
fn test_run_writes_out_dir_and_map() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("A.php"), "<?php $first = 1;").unwrap();
    fs::write(src.join("README.txt"), "keep   me").unwrap();
    let map = dir.path().join("map.json");

    let cli = parse(&[
        src.join("A.php").to_str().unwrap(),
        src.join("README.txt").to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--map",
        map.to_str().unwrap(),
    ]);
    assert_eq!(run(&cli).unwrap(), 0);
    assert_eq!(fs::read_to_string(out.join("A.php")).unwrap(), "<?php $a=1;");
    assert_eq!(fs::read_to_string(out.join("README.txt")).unwrap(), "keep   me");

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
    let file_key = src.join("A.php").display().to_string();
    assert_eq!(written[file_key.as_str()]["$first"], "$a");
}

#[test]
fn test_run_counts_failures() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let good = dir.path().join("good.php");
    fs::write(&good, "<?php echo 1;").unwrap();

    let cli = parse(&[
        good.to_str().unwrap(),
        "/nonexistent/bad.php",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(run(&cli).unwrap(), 1);
    assert!(out.join("good.php").exists());
}

#[test]
fn test_run_rejects_many_inputs_without_out_dir() {
    let cli = parse(&["a.php", "b.php"]);
    assert!(run(&cli).is_err());
}

#[test]
fn test_run_rejects_colliding_outputs() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    for sub in ["a", "b"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join("x.php"), "<?php echo 1;").unwrap();
    }

    let cli = parse(&[
        dir.path().join("a/x.php").to_str().unwrap(),
        dir.path().join("b/x.php").to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(run(&cli).is_err());
    assert!(!out.join("x.php").exists());
}
