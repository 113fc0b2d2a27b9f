// ABOUTME: Tests for config parsing, validation, overrides, and the
// ABOUTME: validators built from a config.

use std::collections::HashMap;
use std::time::Duration;

use super::*;
use crate::security::CommandClass;

#[test]
fn test_empty_config_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.default_approval, ApprovalPolicy::Ask);
    assert_eq!(config.agent.max_iterations, 5);
    assert_eq!(config.agent.max_input_chars, 8000);
    assert_eq!(config.agent.max_history_pairs, 20);
    assert_eq!(config.agent.context_mode, ContextMode::Off);
    assert_eq!(config.rate_limits.default, RateLimit::default());
    assert_eq!(config.sandbox.root, PathBuf::from("."));
}

#[test]
fn test_full_config() {
    let config = Config::from_toml_str(
        r#"
        default_approval = "never"

        [agent]
        max_iterations = 3
        llm_timeout_secs = 10
        context_mode = "rag"
        system_prompt = "You are careful."

        [approvals]
        read_file = "auto_conservative"
        shell_execute = "always"
        "mcp_*" = "ask"

        [commands]
        safe = ["ls"]
        blocked = ["rm"]

        [rate_limits]
        default = { window_seconds = 30, max_calls = 4 }

        [rate_limits.tools.shell_execute]
        window_seconds = 60
        max_calls = 1

        [sandbox]
        root = "/srv/project"
        "#,
    )
    .unwrap();

    assert_eq!(config.default_approval, ApprovalPolicy::Never);
    assert_eq!(config.agent.max_iterations, 3);
    assert_eq!(config.agent.llm_timeout(), Duration::from_secs(10));
    assert_eq!(config.agent.context_mode, ContextMode::Rag);
    assert_eq!(config.agent.system_prompt.as_deref(), Some("You are careful."));
    assert_eq!(config.approvals.len(), 3);
    assert_eq!(
        config.rate_limits.tools["shell_execute"],
        RateLimit::new(1, Duration::from_secs(60))
    );
    assert_eq!(config.sandbox.root, PathBuf::from("/srv/project"));

    let table = config.policy_table();
    assert_eq!(table.resolve("shell_execute"), ApprovalPolicy::Always);
    assert_eq!(table.resolve("mcp_search"), ApprovalPolicy::Ask);
    assert_eq!(table.resolve("other"), ApprovalPolicy::Never);
}

#[test]
fn test_unknown_policy_is_parse_error() {
    let err = Config::from_toml_str("[approvals]\nread_file = \"sometimes\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_iterations_rejected() {
    let err = Config::from_toml_str("[agent]\nmax_iterations = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("max_iterations")));
}

#[test]
fn test_zero_timeouts_rejected() {
    let err = Config::from_toml_str("[agent]\nllm_timeout_secs = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("llm_timeout_secs")));

    let err = Config::from_toml_str("[agent]\nshell_timeout_secs = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("shell_timeout_secs")));
}

#[test]
fn test_zero_rate_limit_rejected() {
    let err = Config::from_toml_str(
        "[rate_limits.tools.shell_execute]\nwindow_seconds = 0\nmax_calls = 2",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("shell_execute")));

    let err = Config::from_toml_str(
        "[rate_limits]\ndefault = { window_seconds = 10, max_calls = 0 }",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("max_calls")));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toolgate.toml");
    std::fs::write(&path, "[agent]\nmax_iterations = 7\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.agent.max_iterations, 7);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_overrides() {
    let vars: HashMap<&str, &str> = [
        ("TOOLGATE_SANDBOX_ROOT", "/tmp/work"),
        ("TOOLGATE_MAX_ITERATIONS", "9"),
        ("TOOLGATE_DEFAULT_APPROVAL", "auto_permissive"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(config.sandbox.root, PathBuf::from("/tmp/work"));
    assert_eq!(config.agent.max_iterations, 9);
    assert_eq!(config.default_approval, ApprovalPolicy::AutoPermissive);
}

#[test]
fn test_invalid_overrides_ignored() {
    let mut config = Config::default();
    config.apply_overrides(|key| match key {
        "TOOLGATE_MAX_ITERATIONS" => Some("0".to_string()),
        "TOOLGATE_DEFAULT_APPROVAL" => Some("maybe".to_string()),
        _ => None,
    });

    assert_eq!(config.agent.max_iterations, 5);
    assert_eq!(config.default_approval, ApprovalPolicy::Ask);
}

#[test]
fn test_classifier_overlap_stays_blocked() {
    let config = Config::from_toml_str(
        r#"
        [commands]
        safe = ["ls", "rm"]
        blocked = ["rm"]
        "#,
    )
    .unwrap();

    let classifier = config.command_classifier();
    assert_eq!(classifier.classify("ls -la").class, CommandClass::Safe);
    assert_eq!(classifier.classify("rm file").class, CommandClass::Blocked);
    // Not on the replaced allow-list.
    assert_eq!(classifier.classify("pwd").class, CommandClass::Unknown);
}

#[test]
fn test_default_classifier_lists() {
    let classifier = Config::default().command_classifier();
    assert_eq!(classifier.classify("rm -rf /").class, CommandClass::Blocked);
    assert_eq!(classifier.classify("echo hi").class, CommandClass::Safe);
}

#[test]
fn test_rate_limiter_overrides() {
    let config = Config::from_toml_str(
        r#"
        [rate_limits]
        default = { window_seconds = 10, max_calls = 2 }
        [rate_limits.tools.write_file]
        window_seconds = 5
        max_calls = 1
        "#,
    )
    .unwrap();

    let limiter = config.rate_limiter();
    assert_eq!(limiter.limit_for("write_file"), RateLimit::new(1, Duration::from_secs(5)));
    assert_eq!(limiter.limit_for("read_file"), RateLimit::new(2, Duration::from_secs(10)));
}
