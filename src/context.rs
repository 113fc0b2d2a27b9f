// ABOUTME: AgentContext - the explicit handle to shared state (tools,
// ABOUTME: approval engine, sandbox, settings) passed into every agent.

use std::sync::Arc;

use crate::config::{AgentSettings, Config};
use crate::error::ToolgateError;
use crate::permission::ApprovalEngine;
use crate::security::PathSandbox;
use crate::tool::Registry;
use crate::tools;

/// Shared state for agent sessions.
///
/// Cloning is cheap and clones share the registry, the approval engine,
/// and its rate-limit state. Each session keeps its own history.
#[derive(Clone)]
pub struct AgentContext {
    pub registry: Registry,
    pub approvals: Arc<ApprovalEngine>,
    pub sandbox: Arc<PathSandbox>,
    pub settings: AgentSettings,
}

impl AgentContext {
    pub fn new(
        registry: Registry,
        approvals: Arc<ApprovalEngine>,
        sandbox: Arc<PathSandbox>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            registry,
            approvals,
            sandbox,
            settings,
        }
    }

    /// Build the validators from `config` and register the built-in tools.
    pub async fn from_config(config: &Config) -> Result<Self, ToolgateError> {
        let sandbox = Arc::new(PathSandbox::new(&config.sandbox.root)?);
        let approvals = ApprovalEngine::new(
            config.policy_table(),
            config.command_classifier(),
            config.rate_limiter(),
        )
        .with_sandbox(Arc::clone(&sandbox))
        .with_confirm_timeout(config.agent.approval_timeout());

        let registry = Registry::new();
        tools::register_builtins(&registry, Arc::clone(&sandbox), config.agent.shell_timeout())
            .await?;

        tracing::info!(
            root = %sandbox.root().display(),
            tools = registry.count().await,
            "agent context ready"
        );

        Ok(Self::new(
            registry,
            Arc::new(approvals),
            sandbox,
            config.agent.clone(),
        ))
    }
}
