// ABOUTME: Defines the ToolResult type - a unified structure for tool
// ABOUTME: execution outcomes with content, error state, and metadata.

use std::collections::HashMap;

use serde::Serialize;

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The output content.
    pub content: String,

    /// Whether this result represents an error.
    pub is_error: bool,

    /// Optional metadata about the execution.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    /// Create a successful text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            metadata: HashMap::new(),
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }

    /// Whether the tool succeeded.
    pub fn success(&self) -> bool {
        !self.is_error
    }

    /// Structured payload recorded as the ToolResult message.
    ///
    /// Successful results carry `output`, failed ones carry `error`.
    /// Metadata keys are copied in without overwriting those fields.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        payload.insert("success".into(), self.success().into());
        let key = if self.is_error { "error" } else { "output" };
        payload.insert(key.into(), self.content.clone().into());

        let mut keys: Vec<_> = self.metadata.keys().collect();
        keys.sort();
        for k in keys {
            if !payload.contains_key(k.as_str()) {
                payload.insert(k.clone(), self.metadata[k].clone());
            }
        }
        serde_json::Value::Object(payload)
    }
}

impl Default for ToolResult {
    fn default() -> Self {
        Self::text("")
    }
}
