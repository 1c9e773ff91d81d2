//! Layered CLI settings: optional TOML file, then `TENURE_*` environment
//! variables.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
  /// Pretty-print JSON output.
  #[serde(default)]
  pub pretty: bool,
}

impl CliConfig {
  /// Load settings from `path` (missing file is fine) and the environment.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("TENURE"))
      .build()
      .with_context(|| format!("failed to read config {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;

  fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("tenure-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn missing_file_yields_defaults() {
    let path = std::env::temp_dir().join("tenure-does-not-exist.toml");
    let cfg = CliConfig::load(&path).unwrap();
    assert!(!cfg.pretty);
  }

  #[test]
  fn file_sets_pretty() {
    let path = scratch_file("pretty", "pretty = true\n");
    let cfg = CliConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(cfg.pretty);
  }
}
