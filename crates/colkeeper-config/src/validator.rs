//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const STORAGE_BACKENDS: [&str; 2] = ["memory", "sqlite"];
const SUGGESTION_ACTIONS: [&str; 2] = ["hide", "reorder"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_scheduler(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_ai(config, &mut result);
        Self::validate_snapshot(config, &mut result);

        result
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        let scheduler = &config.scheduler;
        if scheduler.max_iterations == 0 {
            result.add_error(ValidationError::new(
                "scheduler.max_iterations",
                "max_iterations must be greater than 0",
            ));
        }

        if scheduler.max_iterations > 200 {
            result.add_warning(ValidationWarning::new(
                "scheduler.max_iterations",
                "max_iterations is very high (>200), a run may keep the page busy for minutes",
            ));
        }

        if scheduler.retry_interval_ms == 0 || scheduler.settle_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "scheduler",
                "retry_interval_ms and settle_interval_ms must be greater than 0",
            ));
        }

        if scheduler.root_refresh_ms == 0 {
            result.add_error(ValidationError::new(
                "scheduler.root_refresh_ms",
                "root_refresh_ms must be greater than 0",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        let backend = config.storage.backend.as_str();
        if !STORAGE_BACKENDS.contains(&backend) {
            result.add_error(ValidationError::new(
                "storage.backend",
                format!(
                    "Unknown storage backend '{}', valid values: {:?}",
                    backend, STORAGE_BACKENDS
                ),
            ));
        }

        if backend == "sqlite" && config.storage.path.is_none() {
            result.add_warning(ValidationWarning::new(
                "storage.path",
                "SQLite storage path not set, will use default location",
            ));
        }
    }

    fn validate_ai(config: &Config, result: &mut ValidationResult) {
        let ai = &config.ai;
        if ai.api_key().is_none() {
            result.add_warning(ValidationWarning::new(
                "ai.api_key",
                "API key is not set, page analysis will report TOKEN_MISSING",
            ));
        }

        if !ai.endpoint.starts_with("http://") && !ai.endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "ai.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if ai.model.trim().is_empty() {
            result.add_error(ValidationError::new("ai.model", "model cannot be empty"));
        }

        if ai.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "ai.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }
    }

    fn validate_snapshot(config: &Config, result: &mut ValidationResult) {
        let snapshot = &config.snapshot;
        if snapshot.max_tables == 0 || snapshot.max_columns == 0 {
            result.add_warning(ValidationWarning::new(
                "snapshot",
                "max_tables or max_columns is 0, analysis will see no tables",
            ));
        }

        for action in &snapshot.allowed_actions {
            if !SUGGESTION_ACTIONS.contains(&action.as_str()) {
                result.add_error(ValidationError::new(
                    "snapshot.allowed_actions",
                    format!("Unsupported action '{}'", action),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
