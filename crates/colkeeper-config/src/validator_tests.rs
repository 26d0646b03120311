use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "ai.api_key"));
}

#[test]
fn test_validate_zero_iterations() {
    let mut config = Config::default();
    config.scheduler.max_iterations = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "scheduler.max_iterations"));
}

#[test]
fn test_validate_high_iterations_warning() {
    let mut config = Config::default();
    config.scheduler.max_iterations = 5000;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "scheduler.max_iterations"));
}

#[test]
fn test_validate_unknown_backend() {
    let mut config = Config::default();
    config.storage.backend = "redis".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "storage.backend"));
}

#[test]
fn test_validate_sqlite_without_path_warns() {
    let mut config = Config::default();
    config.storage.backend = "sqlite".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "storage.path"));
}

#[test]
fn test_validate_bad_endpoint() {
    let mut config = Config::default();
    config.ai.endpoint = "ftp://example.com".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "ai.endpoint"));
}

#[test]
fn test_validate_unsupported_action() {
    let mut config = Config::default();
    config.snapshot.allowed_actions.push("delete".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_validate_api_key_present() {
    let mut config = Config::default();
    config.ai.api_key = Some("sk-test".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(!result.warnings.iter().any(|w| w.path == "ai.api_key"));
}
