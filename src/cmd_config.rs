//! `check-config` subcommand.

use std::path::Path;

use tracing::warn;

use colkeeper_config::{Config, ConfigValidator};

/// Validate `config` and print the findings. Errors make the command fail.
pub(crate) fn handle_check_config(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);

    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        return Err(format!(
            "{} is invalid ({} error(s))",
            path.display(),
            result.errors.len()
        )
        .into());
    }

    println!("{} is valid", path.display());
    Ok(())
}
