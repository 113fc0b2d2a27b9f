// ABOUTME: Input validation and sanitizing for user turns, plus the
// ABOUTME: history trimming applied before a conversation is persisted.

use crate::error::InputError;
use crate::llm::Message;

/// Strip control characters, keeping newlines, tabs, and carriage returns.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

/// Sanitize user input and check it is non-empty and at most `max_chars` long.
pub fn validate_input(text: &str, max_chars: usize) -> Result<String, InputError> {
    let clean = sanitize(text);
    if clean.trim().is_empty() {
        return Err(InputError::Empty);
    }
    let len = clean.chars().count();
    if len > max_chars {
        return Err(InputError::TooLong {
            len,
            max: max_chars,
        });
    }
    Ok(clean)
}

/// Trim history to at most `max_pairs` exchanges, oldest first.
///
/// A leading system message is always kept. The retained tail always starts
/// at a user turn, so no ToolResult loses the AI message it answers and no
/// injected tool output is left without its question. When the newest turn
/// alone exceeds the budget it is kept whole. Returns how many messages
/// were removed.
pub fn trim_history(history: &mut Vec<Message>, max_pairs: usize) -> usize {
    let start = usize::from(history.first().is_some_and(Message::is_system));
    let limit = max_pairs.saturating_mul(2);
    let body = history.len() - start;
    if body <= limit {
        return 0;
    }

    let target = start + (body - limit);
    let cut = (target..history.len())
        .find(|&i| history[i].is_turn_start())
        .or_else(|| (start..target).rev().find(|&i| history[i].is_turn_start()));
    let Some(cut) = cut else {
        return 0;
    };

    history.drain(start..cut);
    cut - start
}
