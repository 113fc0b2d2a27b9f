// ABOUTME: Command classifier - sorts shell command strings into safe,
// ABOUTME: blocked, or unknown using program-name allow and deny lists.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Programs that can destroy data, escalate privileges, or reach the network.
pub const DEFAULT_BLOCKED: &[&str] = &[
    "rm", "rmdir", "sudo", "su", "mkfs", "dd", "shutdown", "reboot", "halt", "poweroff", "chmod",
    "chown", "kill", "killall", "curl", "wget", "nc", "ncat", "netcat",
];

/// Programs that only inspect state.
pub const DEFAULT_SAFE: &[&str] = &[
    "ls", "cat", "echo", "pwd", "head", "tail", "grep", "wc", "sort", "uniq", "diff", "date",
    "whoami", "which", "file", "stat", "tree",
];

static SEGMENT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\||&&|[|;&\n]").expect("separator regex is valid"));

static ENV_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").expect("assignment regex is valid"));

/// Classification of a command. Ordered so that the worst class is the max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandClass {
    Safe,
    Unknown,
    Blocked,
}

impl fmt::Display for CommandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandClass::Safe => "safe",
            CommandClass::Unknown => "unknown",
            CommandClass::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// The outcome of classifying a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub class: CommandClass,

    /// The program that decided the outcome, if any list matched it.
    pub program: Option<String>,
}

impl Classification {
    fn unknown(program: Option<String>) -> Self {
        Self {
            class: CommandClass::Unknown,
            program,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.class == CommandClass::Blocked
    }
}

/// Classifies shell-like command strings against fixed program lists.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    safe: BTreeSet<String>,
    blocked: BTreeSet<String>,
}

impl Default for CommandClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_SAFE.iter().copied(),
            DEFAULT_BLOCKED.iter().copied(),
        )
    }
}

impl CommandClassifier {
    /// Build a classifier from allow and deny lists. Names are lowercased.
    /// A program on both lists is treated as blocked.
    pub fn new<S, B>(safe: S, blocked: B) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let normalize = |s: &str| s.trim().to_lowercase();
        Self {
            safe: safe.into_iter().map(|s| normalize(s.as_ref())).collect(),
            blocked: blocked.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    /// Programs present on both lists.
    pub fn overlap(&self) -> Vec<String> {
        self.safe.intersection(&self.blocked).cloned().collect()
    }

    /// Classify a full command string.
    ///
    /// Each operator-separated segment is classified on its own and the worst
    /// result wins, so one blocked segment blocks the whole command.
    pub fn classify(&self, command: &str) -> Classification {
        let mut worst: Option<Classification> = None;

        for segment in SEGMENT_SEPARATOR.split(command) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let current = self.classify_segment(segment);
            let replace = match &worst {
                None => true,
                Some(w) => current.class > w.class,
            };
            if replace {
                worst = Some(current);
            }
            if worst.as_ref().is_some_and(Classification::is_blocked) {
                break;
            }
        }

        worst.unwrap_or_else(|| Classification::unknown(None))
    }

    fn classify_segment(&self, segment: &str) -> Classification {
        let Some(program) = leading_program(segment) else {
            return Classification::unknown(None);
        };

        if self.is_blocked(&program) {
            return Classification {
                class: CommandClass::Blocked,
                program: Some(program),
            };
        }

        // Substitutions run programs the leading token doesn't show.
        let substitutes = segment.contains("$(") || segment.contains('`');
        if !substitutes && self.safe.contains(&program) {
            return Classification {
                class: CommandClass::Safe,
                program: Some(program),
            };
        }

        Classification::unknown(Some(program))
    }

    fn is_blocked(&self, program: &str) -> bool {
        if self.blocked.contains(program) {
            return true;
        }
        // mkfs.ext4 and friends
        program
            .split_once('.')
            .is_some_and(|(base, _)| self.blocked.contains(base))
    }
}

/// Extract the program name of a segment: skips `VAR=value` prefixes and
/// grouping or quoting characters, strips directories, lowercases.
fn leading_program(segment: &str) -> Option<String> {
    let token = segment
        .split_whitespace()
        .filter(|t| !ENV_ASSIGNMENT.is_match(t))
        .map(|t| {
            t.trim_start_matches(['(', '{', '!', '\\'])
                .trim_matches(['"', '\''])
        })
        .find(|t| !t.is_empty())?;
    let name = token.rsplit('/').next().unwrap_or(token);
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}
