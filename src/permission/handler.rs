// ABOUTME: Defines the ApprovalHandler trait for async user confirmation.
// ABOUTME: Called when the approval engine needs the user to decide.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// How risky the pending call looks, shown to the user with the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskHint {
    ReadOnly,
    Mutating,
    Destructive,
    /// A shell command whose program is on neither list.
    UnrecognizedCommand,
}

impl fmt::Display for RiskHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskHint::ReadOnly => "read-only",
            RiskHint::Mutating => "modifies files or state",
            RiskHint::Destructive => "potentially destructive",
            RiskHint::UnrecognizedCommand => "unrecognized command",
        };
        f.write_str(s)
    }
}

/// Context provided to approval handlers.
#[derive(Debug, Clone)]
pub struct ApprovalContext {
    /// Description of the tool being executed.
    pub tool_description: String,

    /// Unique identifier for this approval request.
    pub request_id: String,

    /// Risk classification of the call.
    pub risk: RiskHint,

    /// Prompt text to show the user.
    pub prompt: String,
}

/// Trait for handling approval requests.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    /// Request approval for a tool execution.
    ///
    /// Returns `Ok(true)` if approved, `Ok(false)` if rejected. Errors and
    /// timeouts are treated as rejection by the caller.
    async fn request_approval(
        &self,
        tool: &str,
        params: &serde_json::Value,
        context: &ApprovalContext,
    ) -> Result<bool, anyhow::Error>;
}

/// An approval handler that always approves.
pub struct AlwaysApprove;

#[async_trait]
impl ApprovalHandler for AlwaysApprove {
    async fn request_approval(
        &self,
        _tool: &str,
        _params: &serde_json::Value,
        _context: &ApprovalContext,
    ) -> Result<bool, anyhow::Error> {
        Ok(true)
    }
}

/// An approval handler that always rejects.
pub struct AlwaysReject;

#[async_trait]
impl ApprovalHandler for AlwaysReject {
    async fn request_approval(
        &self,
        _tool: &str,
        _params: &serde_json::Value,
        _context: &ApprovalContext,
    ) -> Result<bool, anyhow::Error> {
        Ok(false)
    }
}

/// An approval waiting for the presentation layer to answer.
///
/// Dropping it without answering counts as a rejection.
#[derive(Debug)]
pub struct PendingApproval {
    pub tool: String,
    pub params: serde_json::Value,
    pub context: ApprovalContext,
    responder: oneshot::Sender<bool>,
}

impl PendingApproval {
    /// Approve the call.
    pub fn approve(self) {
        self.respond(true);
    }

    /// Reject the call.
    pub fn reject(self) {
        self.respond(false);
    }

    /// Answer the request.
    pub fn respond(self, approved: bool) {
        // The agent may have stopped waiting already.
        let _ = self.responder.send(approved);
    }
}

/// Forwards approval requests over a channel to a UI task.
///
/// The agent loop awaits the answer without knowing whether a blocking CLI
/// prompt or a GUI dialog produces it.
#[derive(Clone)]
pub struct ChannelApprovalHandler {
    tx: mpsc::Sender<PendingApproval>,
}

/// Create a channel-backed handler and the receiver the UI reads from.
pub fn approval_channel(buffer: usize) -> (ChannelApprovalHandler, mpsc::Receiver<PendingApproval>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (ChannelApprovalHandler { tx }, rx)
}

#[async_trait]
impl ApprovalHandler for ChannelApprovalHandler {
    async fn request_approval(
        &self,
        tool: &str,
        params: &serde_json::Value,
        context: &ApprovalContext,
    ) -> Result<bool, anyhow::Error> {
        let (responder, answer) = oneshot::channel();
        let pending = PendingApproval {
            tool: tool.to_string(),
            params: params.clone(),
            context: context.clone(),
            responder,
        };
        self.tx
            .send(pending)
            .await
            .map_err(|_| anyhow::anyhow!("approval receiver closed"))?;

        // A dropped PendingApproval closes the channel: treat as a rejection.
        Ok(answer.await.unwrap_or(false))
    }
}
