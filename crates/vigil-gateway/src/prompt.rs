// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::types::ChatMessage;

/// Trailer that cues the upstream model to answer.
pub const ASSISTANT_CUE: &str = "\nASSISTANT:";

/// Flatten chat messages into the single prompt string sent upstream.
///
/// Each message becomes `ROLE: content`; lines are joined with `\n`, outer
/// whitespace is trimmed and [`ASSISTANT_CUE`] is appended.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    let joined = messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_ascii_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    let mut prompt = joined.trim().to_string();
    prompt.push_str(ASSISTANT_CUE);
    prompt
}
