// ABOUTME: Configuration loaded from TOML: agent limits, approval policies,
// ABOUTME: command lists, rate limits, and the sandbox root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::agent::ContextMode;
use crate::error::ConfigError;
use crate::permission::{ApprovalPolicy, PolicyTable};
use crate::security::{CommandClassifier, DEFAULT_BLOCKED, DEFAULT_SAFE, RateLimit, RateLimiter};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policy applied when no approval entry matches a tool.
    pub default_approval: ApprovalPolicy,
    pub agent: AgentSettings,
    /// Tool name or wildcard pattern to policy.
    pub approvals: HashMap<String, ApprovalPolicy>,
    pub commands: CommandsConfig,
    pub rate_limits: RateLimitsConfig,
    pub sandbox: SandboxConfig,
}

/// Limits and behavior of the agent loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub max_input_chars: usize,
    pub max_history_pairs: usize,
    pub llm_timeout_secs: u64,
    pub approval_timeout_secs: u64,
    pub shell_timeout_secs: u64,
    pub context_mode: ContextMode,
    pub system_prompt: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            max_input_chars: 8000,
            max_history_pairs: 20,
            llm_timeout_secs: 120,
            approval_timeout_secs: 300,
            shell_timeout_secs: 30,
            context_mode: ContextMode::Off,
            system_prompt: None,
        }
    }
}

impl AgentSettings {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn approval_timeout(&self) -> Duration {
        Duration::from_secs(self.approval_timeout_secs)
    }

    pub fn shell_timeout(&self) -> Duration {
        Duration::from_secs(self.shell_timeout_secs)
    }
}

/// Allow-list and deny-list of program names.
///
/// A list that is present replaces the built-in one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub safe: Option<Vec<String>>,
    pub blocked: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    pub default: RateLimit,
    pub tools: HashMap<String, RateLimit>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub root: PathBuf,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.agent.max_input_chars == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_input_chars must be at least 1".into(),
            ));
        }
        if self.agent.llm_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "agent.llm_timeout_secs must be at least 1".into(),
            ));
        }
        if self.agent.shell_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "agent.shell_timeout_secs must be at least 1".into(),
            ));
        }
        check_limit("rate_limits.default", &self.rate_limits.default)?;
        for (tool, limit) in &self.rate_limits.tools {
            check_limit(&format!("rate_limits.tools.{}", tool), limit)?;
        }
        Ok(())
    }

    /// Apply `TOOLGATE_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TOOLGATE_SANDBOX_ROOT") {
            self.sandbox.root = PathBuf::from(v);
        }
        if let Some(v) = lookup("TOOLGATE_MAX_ITERATIONS") {
            match v.parse::<usize>() {
                Ok(n) if n > 0 => self.agent.max_iterations = n,
                _ => tracing::warn!("ignoring invalid TOOLGATE_MAX_ITERATIONS value: {v}"),
            }
        }
        if let Some(v) = lookup("TOOLGATE_DEFAULT_APPROVAL") {
            match v.parse::<ApprovalPolicy>() {
                Ok(policy) => self.default_approval = policy,
                Err(e) => tracing::warn!("ignoring TOOLGATE_DEFAULT_APPROVAL: {e}"),
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn policy_table(&self) -> PolicyTable {
        PolicyTable::builder()
            .entries(&self.approvals)
            .default(self.default_approval)
            .build()
    }

    /// Build the command classifier. Overlapping entries stay blocked.
    pub fn command_classifier(&self) -> CommandClassifier {
        let safe: Vec<String> = match &self.commands.safe {
            Some(list) => list.clone(),
            None => DEFAULT_SAFE.iter().map(|s| s.to_string()).collect(),
        };
        let blocked: Vec<String> = match &self.commands.blocked {
            Some(list) => list.clone(),
            None => DEFAULT_BLOCKED.iter().map(|s| s.to_string()).collect(),
        };
        let classifier = CommandClassifier::new(safe, blocked);
        let overlap = classifier.overlap();
        if !overlap.is_empty() {
            tracing::warn!(commands = ?overlap, "commands listed as both safe and blocked; treating as blocked");
        }
        classifier
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        self.rate_limits
            .tools
            .iter()
            .fold(RateLimiter::new(self.rate_limits.default), |limiter, (tool, limit)| {
                limiter.with_limit(tool.clone(), *limit)
            })
    }
}

fn check_limit(name: &str, limit: &RateLimit) -> Result<(), ConfigError> {
    if limit.max_calls == 0 {
        return Err(ConfigError::Invalid(format!("{name}.max_calls must be at least 1")));
    }
    if limit.window.is_zero() {
        return Err(ConfigError::Invalid(format!(
            "{name}.window_seconds must be at least 1"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod config_test;
