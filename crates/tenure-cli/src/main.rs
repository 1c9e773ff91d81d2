//! `tenure` — command-line front end for the tenure intent-resolution engine.
//!
//! Reads one JSON request (from `--input`, or stdin by default), resolves it,
//! and prints the JSON result on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! tenure validate --input capability.json
//! tenure append --input new_version.json --pretty
//! echo '{"as_of":"2026-02-13","versions":[]}' | tenure resolve-date
//! ```
//!
//! A refused request prints `null` and exits with status 2.

mod command;
mod config;

use std::{
  io::{self, Read},
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use command::Command;
use config::CliConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
  name = "tenure",
  author,
  version,
  about = "Resolve edit intents for effective-dated records"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tenure.toml", global = true)]
  config: PathBuf,

  /// JSON request file; `-` reads stdin.
  #[arg(short, long, default_value = "-", global = true)]
  input: PathBuf,

  /// Pretty-print the JSON output.
  #[arg(long, global = true)]
  pretty: bool,

  #[command(subcommand)]
  command: Command,
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = CliConfig::load(&cli.config)?;

  let raw = read_input(&cli.input)?;
  let outcome = command::run(cli.command, &raw)?;

  let rendered = if cli.pretty || settings.pretty {
    serde_json::to_string_pretty(&outcome.output)
  } else {
    serde_json::to_string(&outcome.output)
  }
  .context("failed to serialise output")?;
  println!("{rendered}");

  Ok(outcome.exit_code())
}

fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut raw = String::new();
    io::stdin()
      .read_to_string(&mut raw)
      .context("failed to read request from stdin")?;
    return Ok(raw);
  }
  std::fs::read_to_string(path)
    .with_context(|| format!("failed to read request file {}", path.display()))
}
