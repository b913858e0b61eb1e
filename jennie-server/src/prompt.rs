//! Prompt rendering.

use crate::session::Turn;
use std::fmt::Write;

/// Render prior turns plus the new message into a single completion prompt.
///
/// ```text
/// Me: <older user turn>
/// Assistant: <older reply>
/// Me: <message>
/// Assistant:
/// ```
///
/// Callers pass only the context window; this function does not truncate.
pub fn build_prompt(history: &[Turn], message: &str) -> String {
    let mut prompt = String::new();
    for turn in history {
        let _ = writeln!(prompt, "{}: {}", turn.role().prompt_label(), turn.content());
    }
    let _ = write!(prompt, "Me: {message}\nAssistant:");
    prompt
}
