// ABOUTME: Defines approval policies and the policy table that resolves a
// ABOUTME: tool name to a policy via exact names, wildcards, and a default.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Configured disposition for a tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
    /// Run without asking.
    Always,
    /// Never run.
    Never,
    /// Ask the user every time.
    #[default]
    Ask,
    /// Run read-only tools, ask for anything else.
    AutoConservative,
    /// Run everything except destructive tools, ask for those.
    AutoPermissive,
}

impl fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalPolicy::Always => "always",
            ApprovalPolicy::Never => "never",
            ApprovalPolicy::Ask => "ask",
            ApprovalPolicy::AutoConservative => "auto_conservative",
            ApprovalPolicy::AutoPermissive => "auto_permissive",
        };
        f.write_str(s)
    }
}

impl FromStr for ApprovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(ApprovalPolicy::Always),
            "never" => Ok(ApprovalPolicy::Never),
            "ask" => Ok(ApprovalPolicy::Ask),
            "auto_conservative" => Ok(ApprovalPolicy::AutoConservative),
            "auto_permissive" => Ok(ApprovalPolicy::AutoPermissive),
            other => Err(format!("unknown approval policy '{}'", other)),
        }
    }
}

/// A wildcard entry such as `mcp_*`.
struct WildcardRule {
    pattern: glob::Pattern,
    policy: ApprovalPolicy,
}

impl WildcardRule {
    /// Literal characters in the pattern; more literals means more specific.
    fn specificity(&self) -> usize {
        self.pattern
            .as_str()
            .chars()
            .filter(|c| !matches!(c, '*' | '?' | '[' | ']'))
            .count()
    }
}

/// Resolves tool names to approval policies.
///
/// An exact name always beats a wildcard. Among wildcards the most specific
/// match wins, with ties broken by pattern text, so the result never depends
/// on the order entries were added in.
pub struct PolicyTable {
    exact: HashMap<String, ApprovalPolicy>,
    wildcards: Vec<WildcardRule>,
    default: ApprovalPolicy,
}

impl PolicyTable {
    /// Create a new table builder.
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::new()
    }

    /// Resolve the policy for a tool.
    pub fn resolve(&self, tool: &str) -> ApprovalPolicy {
        if let Some(policy) = self.exact.get(tool) {
            return *policy;
        }
        self.wildcards
            .iter()
            .filter(|rule| rule.pattern.matches(tool))
            .max_by(|a, b| {
                a.specificity()
                    .cmp(&b.specificity())
                    .then_with(|| b.pattern.as_str().cmp(a.pattern.as_str()))
            })
            .map_or(self.default, |rule| rule.policy)
    }

    /// Insert or replace an entry. Names containing glob characters become wildcards.
    pub fn set(&mut self, name: &str, policy: ApprovalPolicy) {
        if !is_wildcard(name) {
            self.exact.insert(name.to_string(), policy);
            return;
        }
        match glob::Pattern::new(name) {
            Ok(pattern) => {
                self.wildcards.retain(|r| r.pattern.as_str() != name);
                self.wildcards.push(WildcardRule { pattern, policy });
            }
            Err(e) => {
                tracing::warn!(pattern = %name, error = %e, "ignoring invalid approval pattern");
            }
        }
    }

    /// The policy used when nothing matches.
    pub fn default_policy(&self) -> ApprovalPolicy {
        self.default
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            wildcards: Vec::new(),
            default: ApprovalPolicy::Ask,
        }
    }
}

fn is_wildcard(name: &str) -> bool {
    name.contains(['*', '?', '['])
}

/// Builder for constructing policy tables.
pub struct PolicyTableBuilder {
    table: PolicyTable,
}

impl Default for PolicyTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTableBuilder {
    /// Create a new builder with default `Ask`.
    pub fn new() -> Self {
        Self {
            table: PolicyTable::default(),
        }
    }

    /// Set the policy for a tool name or wildcard pattern.
    pub fn set(mut self, name: &str, policy: ApprovalPolicy) -> Self {
        self.table.set(name, policy);
        self
    }

    /// Add every entry of a name-to-policy map.
    pub fn entries<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a String, &'a ApprovalPolicy)>,
    ) -> Self {
        for (name, policy) in entries {
            self.table.set(name, *policy);
        }
        self
    }

    /// Set the policy for unmatched tools.
    pub fn default(mut self, policy: ApprovalPolicy) -> Self {
        self.table.default = policy;
        self
    }

    /// Build the table.
    pub fn build(self) -> PolicyTable {
        self.table
    }
}
