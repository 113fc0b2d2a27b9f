// ABOUTME: The approval engine - combines policies, command classification,
// ABOUTME: path sandboxing, rate limiting, and user confirmation per tool call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ApprovalContext, ApprovalHandler, ApprovalPolicy, PolicyTable, RiskHint};
use crate::security::{CommandClass, CommandClassifier, PathSandbox, RateLimiter};
use crate::tool::{Tool, ToolEffect};

/// Default time the user gets to answer a confirmation prompt.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(300);

/// Why a call was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The resolved policy is `Never`.
    Policy,
    /// A command segment names a deny-listed program.
    BlockedCommand { program: String },
    /// A path argument resolves outside the sandbox root.
    SandboxEscape { path: String },
    /// The tool's call budget for the window is used up.
    RateLimited { max_calls: u32, window: Duration },
    /// The user said no.
    UserDeclined,
    /// The user did not answer in time.
    ApprovalTimeout,
    /// The approval handler failed.
    HandlerFailed,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Policy => write!(f, "tool is disabled by policy"),
            Denial::BlockedCommand { program } => {
                write!(f, "command '{}' is blocked", program)
            }
            Denial::SandboxEscape { path } => {
                write!(f, "path '{}' is outside the allowed directory", path)
            }
            Denial::RateLimited { max_calls, window } => write!(
                f,
                "rate limit of {} calls per {}s exceeded",
                max_calls,
                window.as_secs()
            ),
            Denial::UserDeclined => write!(f, "user declined"),
            Denial::ApprovalTimeout => write!(f, "no answer from user in time"),
            Denial::HandlerFailed => write!(f, "approval could not be requested"),
        }
    }
}

/// The engine's answer for one tool call, computed fresh every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
    /// Ask the user, with the prompt to show.
    AskUser(String),
}

/// The final outcome after any user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Denied(Denial),
}

/// Decides whether each tool call may run.
///
/// The policy table and rate limiter are shared by every session using the
/// engine and are guarded internally.
pub struct ApprovalEngine {
    policies: RwLock<PolicyTable>,
    classifier: CommandClassifier,
    limiter: RateLimiter,
    sandbox: Option<Arc<PathSandbox>>,
    confirm_timeout: Duration,
}

impl ApprovalEngine {
    /// Create an engine from its validators.
    pub fn new(policies: PolicyTable, classifier: CommandClassifier, limiter: RateLimiter) -> Self {
        Self {
            policies: RwLock::new(policies),
            classifier,
            limiter,
            sandbox: None,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    /// Check declared path arguments against a sandbox.
    pub fn with_sandbox(mut self, sandbox: Arc<PathSandbox>) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Set how long a confirmation may take before it counts as a denial.
    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// The policy currently resolved for a tool.
    pub async fn policy_for(&self, tool: &str) -> ApprovalPolicy {
        self.policies.read().await.resolve(tool)
    }

    /// Change a policy at runtime, e.g. after the user picks "always allow".
    pub async fn set_policy(&self, name: &str, policy: ApprovalPolicy) {
        self.policies.write().await.set(name, policy);
    }

    /// The shared rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Decide on a call without prompting the user or recording it.
    pub async fn check(&self, tool: &dyn Tool, params: &serde_json::Value) -> Decision {
        self.evaluate(tool, params).await.0
    }

    async fn evaluate(&self, tool: &dyn Tool, params: &serde_json::Value) -> (Decision, RiskHint) {
        let name = tool.name();
        let policy = self.policy_for(name).await;

        // The deny-list overrides every policy, `Always` included.
        let mut unrecognized = false;
        if let Some(command) = tool.command(params) {
            let classification = self.classifier.classify(&command);
            match classification.class {
                CommandClass::Blocked => {
                    let denial = Denial::BlockedCommand {
                        program: classification.program.unwrap_or_default(),
                    };
                    return (Decision::Deny(denial), RiskHint::Destructive);
                }
                CommandClass::Unknown => unrecognized = true,
                CommandClass::Safe => {}
            }
        }

        let risk = risk_for(tool, unrecognized);

        if let Some(sandbox) = &self.sandbox {
            for path in tool.paths(params) {
                if let Err(e) = sandbox.validate(&path) {
                    tracing::debug!(tool = %name, error = %e, "path failed sandbox check");
                    return (Decision::Deny(Denial::SandboxEscape { path }), risk);
                }
            }
        }

        if !self.limiter.allow(name).await {
            return (Decision::Deny(self.rate_limited(name)), risk);
        }

        let allow = match policy {
            ApprovalPolicy::Always => true,
            ApprovalPolicy::Never => return (Decision::Deny(Denial::Policy), risk),
            ApprovalPolicy::Ask => false,
            ApprovalPolicy::AutoConservative => tool.effect() == ToolEffect::ReadOnly,
            ApprovalPolicy::AutoPermissive => tool.effect() != ToolEffect::Destructive,
        };

        let decision = if allow && !unrecognized {
            Decision::Allow
        } else {
            Decision::AskUser(prompt_for(tool, params, risk))
        };
        (decision, risk)
    }

    /// Run the full approval pipeline for a call.
    ///
    /// `AskUser` decisions go to `handler` and must be answered within the
    /// confirmation timeout. No answer, a handler error, or a decline all
    /// deny. An approved call is counted against the tool's rate limit.
    pub async fn authorize(
        &self,
        tool: &dyn Tool,
        params: &serde_json::Value,
        handler: &dyn ApprovalHandler,
    ) -> Verdict {
        let name = tool.name();
        let (decision, risk) = self.evaluate(tool, params).await;
        let verdict = match decision {
            Decision::Allow => self.acquire(name).await,
            Decision::Deny(denial) => Verdict::Denied(denial),
            Decision::AskUser(prompt) => {
                let context = ApprovalContext {
                    tool_description: tool.description().to_string(),
                    request_id: Uuid::new_v4().to_string(),
                    risk,
                    prompt,
                };
                self.confirm(name, params, &context, handler).await
            }
        };

        if let Verdict::Denied(denial) = &verdict {
            tracing::warn!(tool = %name, reason = %denial, "tool call denied");
        }
        verdict
    }

    async fn confirm(
        &self,
        name: &str,
        params: &serde_json::Value,
        context: &ApprovalContext,
        handler: &dyn ApprovalHandler,
    ) -> Verdict {
        let answer = tokio::time::timeout(
            self.confirm_timeout,
            handler.request_approval(name, params, context),
        )
        .await;

        match answer {
            Ok(Ok(true)) => self.acquire(name).await,
            Ok(Ok(false)) => Verdict::Denied(Denial::UserDeclined),
            Ok(Err(e)) => {
                tracing::error!(tool = %name, request_id = %context.request_id, error = %e, "approval handler failed");
                Verdict::Denied(Denial::HandlerFailed)
            }
            Err(_) => Verdict::Denied(Denial::ApprovalTimeout),
        }
    }

    async fn acquire(&self, name: &str) -> Verdict {
        // The window may have filled while the user was deciding.
        if self.limiter.try_acquire(name).await {
            Verdict::Approved
        } else {
            Verdict::Denied(self.rate_limited(name))
        }
    }

    fn rate_limited(&self, name: &str) -> Denial {
        let limit = self.limiter.limit_for(name);
        Denial::RateLimited {
            max_calls: limit.max_calls,
            window: limit.window,
        }
    }
}

fn risk_for(tool: &dyn Tool, unrecognized: bool) -> RiskHint {
    if unrecognized {
        return RiskHint::UnrecognizedCommand;
    }
    match tool.effect() {
        ToolEffect::ReadOnly => RiskHint::ReadOnly,
        ToolEffect::Mutating => RiskHint::Mutating,
        ToolEffect::Destructive => RiskHint::Destructive,
    }
}

fn prompt_for(tool: &dyn Tool, params: &serde_json::Value, risk: RiskHint) -> String {
    match tool.command(params) {
        Some(command) => format!("Run command `{}` ({})?", command, risk),
        None => format!("Allow '{}' with {} ({})?", tool.name(), params, risk),
    }
}
