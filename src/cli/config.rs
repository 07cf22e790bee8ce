//! Configuration files for the CLI.
//!
//! Files are TOML renderings of `EvolutionConfig`; every key is optional and
//! falls back to its default. Parsing does not validate, so command-line
//! overrides can still repair a setting before the run checks it.

use crate::cli::CliError;
use exprgp::EvolutionConfig;
use std::fs;
use std::path::Path;

/// Parse a configuration file without validating it.
pub(crate) fn parse(path: &Path) -> Result<EvolutionConfig, CliError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("failed to read {}: {e}", path.display())))?;
    let config: EvolutionConfig = toml::from_str(&contents)?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Render a configuration as TOML.
pub(crate) fn to_toml(config: &EvolutionConfig) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Execute the config command: print the default configuration.
pub(crate) fn execute() -> Result<(), CliError> {
    print!("{}", to_toml(&EvolutionConfig::default())?);
    Ok(())
}
