// ABOUTME: Agent runner - the bounded think-act loop for one session.
// ABOUTME: Alternates model calls and approved tool calls, then trims and persists history.

use std::borrow::Cow;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::history::{trim_history, validate_input};
use super::retrieval::{ContextMode, ContextRetriever};
use super::store::{HistoryStore, MemoryHistoryStore};
use crate::context::AgentContext;
use crate::error::{AgentError, ToolError};
use crate::llm::{LlmClient, Message, ToolCall};
use crate::permission::{AlwaysReject, ApprovalHandler, Verdict};
use crate::tool::ToolResult;

/// Text returned when the iteration cap is hit without a final answer.
pub const MAX_ITERATIONS_MESSAGE: &str =
    "Maximum iterations reached without a final answer. Try a narrower request.";

/// Why a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStop {
    /// The model answered without requesting tools.
    FinalAnswer,
    /// The iteration cap was reached.
    MaxIterations,
}

/// Outcome of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Final text for the user.
    pub text: String,

    /// Number of model invocations made.
    pub iterations: usize,

    /// Number of tool calls requested by the model, denied ones included.
    pub tool_calls: usize,

    pub stop: TurnStop,
}

/// One conversation session driven by a model client.
pub struct Agent {
    ctx: AgentContext,
    client: Arc<dyn LlmClient>,
    handler: Arc<dyn ApprovalHandler>,
    retriever: Option<Arc<dyn ContextRetriever>>,
    store: Arc<dyn HistoryStore>,
    session_id: String,
    cancel: CancellationToken,
    history: Vec<Message>,
}

/// Builder for [`Agent`].
pub struct AgentBuilder {
    ctx: AgentContext,
    client: Arc<dyn LlmClient>,
    handler: Arc<dyn ApprovalHandler>,
    retriever: Option<Arc<dyn ContextRetriever>>,
    store: Arc<dyn HistoryStore>,
    session_id: Option<String>,
    cancel: CancellationToken,
}

impl AgentBuilder {
    /// Who answers confirmation prompts. Defaults to rejecting them all.
    pub fn approval_handler(mut self, handler: Arc<dyn ApprovalHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Source of retrieval context, used when the context mode is `rag`.
    pub fn retriever(mut self, retriever: Arc<dyn ContextRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Load any stored history for the session and build the agent.
    pub async fn build(self) -> Result<Agent, AgentError> {
        let session_id = self
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut history = self
            .store
            .load(&session_id)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "failed to load history");
                AgentError::Storage(e)
            })?
            .unwrap_or_default();

        if history.is_empty()
            && let Some(prompt) = &self.ctx.settings.system_prompt
        {
            history.push(Message::system(prompt.clone()));
        }

        Ok(Agent {
            ctx: self.ctx,
            client: self.client,
            handler: self.handler,
            retriever: self.retriever,
            store: self.store,
            session_id,
            cancel: self.cancel,
            history,
        })
    }
}

impl Agent {
    pub fn builder(ctx: AgentContext, client: Arc<dyn LlmClient>) -> AgentBuilder {
        AgentBuilder {
            ctx,
            client,
            handler: Arc::new(AlwaysReject),
            retriever: None,
            store: MemoryHistoryStore::shared(),
            session_id: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The conversation so far.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Token that cancels the running turn before its next model call.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one user turn to completion.
    ///
    /// Invalid input is rejected before history changes. Otherwise history
    /// is trimmed and persisted whether the turn succeeds or fails.
    pub async fn run_turn(&mut self, input: &str) -> Result<TurnResult, AgentError> {
        let input = validate_input(input, self.ctx.settings.max_input_chars).map_err(|e| {
            tracing::warn!(session_id = %self.session_id, error = %e, "rejected user input");
            AgentError::from(e)
        })?;

        tracing::info!(session_id = %self.session_id, "turn started");
        let human_index = self.history.len();
        self.history.push(Message::human(input.clone()));

        let augmented = self.augment(&input).await;
        let outcome = self.run_loop(human_index, augmented.as_deref()).await;
        let persisted = self.persist().await;

        match outcome {
            Ok(result) => {
                persisted?;
                tracing::info!(
                    session_id = %self.session_id,
                    iterations = result.iterations,
                    tool_calls = result.tool_calls,
                    stop = ?result.stop,
                    "turn finished"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "turn aborted");
                Err(e)
            }
        }
    }

    /// Input text with retrieved context appended, when retrieval is on.
    async fn augment(&self, input: &str) -> Option<String> {
        if self.ctx.settings.context_mode == ContextMode::Off {
            return None;
        }
        let retriever = self.retriever.as_ref()?;
        match retriever.get_context(input).await {
            Ok(context) if !context.trim().is_empty() => {
                Some(format!("{}\n\nRelevant context:\n{}", input, context))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "context retrieval failed, continuing without it");
                None
            }
        }
    }

    async fn run_loop(
        &mut self,
        human_index: usize,
        augmented: Option<&str>,
    ) -> Result<TurnResult, AgentError> {
        let max_iterations = self.ctx.settings.max_iterations;
        let timeout = self.ctx.settings.llm_timeout();
        let tools = self.ctx.registry.definitions().await;
        let mut tool_calls = 0;

        for iteration in 1..=max_iterations {
            if self.cancel.is_cancelled() {
                return Err(AgentError::Cancelled { iteration });
            }

            tracing::debug!(session_id = %self.session_id, iteration, "invoking model");
            let response = {
                let view = model_view(&self.history, human_index, augmented);
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        return Err(AgentError::Cancelled { iteration });
                    }
                    r = tokio::time::timeout(timeout, self.client.invoke(&view, &tools)) => r,
                }
            };

            let response = match response {
                Ok(Ok(response)) => response,
                Ok(Err(source)) => {
                    tracing::error!(session_id = %self.session_id, iteration, error = %source, "model request failed");
                    return Err(AgentError::Llm { iteration, source });
                }
                Err(_) => {
                    tracing::error!(session_id = %self.session_id, iteration, ?timeout, "model timed out");
                    return Err(AgentError::LlmTimeout { iteration, timeout });
                }
            };

            if !response.has_tool_calls() {
                let text = response.text.clone();
                self.history.push(response.into_message());
                return Ok(TurnResult {
                    text,
                    iterations: iteration,
                    tool_calls,
                    stop: TurnStop::FinalAnswer,
                });
            }

            let calls = response.tool_calls.clone();
            self.history.push(response.into_message());

            // File contents go after every ToolResult so each result
            // directly follows the AI message that requested it.
            let mut outputs = Vec::new();
            for call in &calls {
                tool_calls += 1;
                let (result, inject) = self.dispatch(call, iteration).await;
                self.history
                    .push(Message::tool_result(&call.id, result.to_payload().to_string()));
                outputs.extend(inject.map(Message::tool_output));
            }
            self.history.extend(outputs);
        }

        tracing::warn!(session_id = %self.session_id, max_iterations, "max iterations reached");
        Ok(TurnResult {
            text: MAX_ITERATIONS_MESSAGE.to_string(),
            iterations: max_iterations,
            tool_calls,
            stop: TurnStop::MaxIterations,
        })
    }

    /// Approve and run one call. Returns the result and any text to inject.
    async fn dispatch(&self, call: &ToolCall, iteration: usize) -> (ToolResult, Option<String>) {
        let Some(tool) = self.ctx.registry.get(&call.name).await else {
            tracing::warn!(
                session_id = %self.session_id,
                iteration,
                tool = %call.name,
                call_id = %call.id,
                "model requested an unknown tool"
            );
            return (ToolResult::error(format!("Unknown tool '{}'", call.name)), None);
        };

        let verdict = self
            .ctx
            .approvals
            .authorize(tool.as_ref(), &call.arguments, self.handler.as_ref())
            .await;
        if let Verdict::Denied(denial) = verdict {
            return (ToolResult::error(format!("Approval denied: {}", denial)), None);
        }

        tracing::debug!(
            session_id = %self.session_id,
            iteration,
            tool = %call.name,
            call_id = %call.id,
            "executing tool"
        );
        match self
            .ctx
            .registry
            .execute(&call.name, call.arguments.clone())
            .await
        {
            Ok(result) => {
                let inject = (tool.injects_output() && result.success())
                    .then(|| injected_text(&call.name, &result));
                (result, inject)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %self.session_id,
                    iteration,
                    tool = %call.name,
                    call_id = %call.id,
                    error = ?e,
                    "tool execution failed"
                );
                (ToolResult::error(failure_message(&call.name, &e)), None)
            }
        }
    }

    async fn persist(&mut self) -> Result<(), AgentError> {
        let removed = trim_history(&mut self.history, self.ctx.settings.max_history_pairs);
        if removed > 0 {
            tracing::debug!(session_id = %self.session_id, removed, "trimmed history");
        }
        self.store
            .save(&self.session_id, &self.history)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %self.session_id, error = %e, "failed to save history");
                AgentError::Storage(e)
            })
    }
}

/// History as the model sees it: the turn's Human message carries retrieved context.
fn model_view<'a>(
    history: &'a [Message],
    human_index: usize,
    augmented: Option<&str>,
) -> Cow<'a, [Message]> {
    match augmented {
        Some(text) if human_index < history.len() => {
            let mut view = history.to_vec();
            view[human_index].content = text.to_string();
            Cow::Owned(view)
        }
        _ => Cow::Borrowed(history),
    }
}

fn injected_text(tool: &str, result: &ToolResult) -> String {
    let source = result
        .metadata
        .get("path")
        .and_then(|v| v.as_str())
        .unwrap_or(tool);
    format!("Contents of {}:\n\n{}", source, result.content)
}

/// Short user-facing text for a failed execution. Details go to the log.
fn failure_message(tool: &str, err: &ToolError) -> String {
    match err {
        ToolError::NotFound(_) => format!("Unknown tool '{}'", tool),
        ToolError::InvalidParams(msg) => format!("Invalid parameters for '{}': {}", tool, msg),
        ToolError::Panicked(_) => format!("Tool '{}' failed unexpectedly", tool),
        ToolError::Execution(_) | ToolError::AlreadyRegistered(_) => {
            format!("Tool '{}' failed", tool)
        }
    }
}
