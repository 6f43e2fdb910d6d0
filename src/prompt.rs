// ABOUTME: Pure system-prompt assembly from request parameters and the knowledge base
// ABOUTME: Deterministic line ordering with fixed behavioral rules, no I/O and no error path
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly
//!
//! Builds the system turn seeded into every conversation. Output is fully
//! deterministic: a fixed-order block of parameter lines, a fixed behavioral
//! rules block, and the knowledge-base text appended only when non-empty.
//! The builder always returns a string, even with every input absent.

/// Default script duration in seconds when the request omits one
const DEFAULT_DURATION_SECS: &str = "30";

/// Formatting directive used when the request carries no style override.
/// Plain text only; markdown emphasis symbols are forbidden downstream.
const DEFAULT_STYLE_DIRECTIVE: &str = "Formatting requirements: clear paragraphs, short sentences, \
one line break between sections, light use of emoji (for example ✅ ✨ 🔥 📌), no filler phrases. \
Organize content with numbered points (1. 2. 3.) or bullets (•). Never use markdown symbols such \
as asterisks for bold or italics.";

/// Fixed behavioral rules seeded into every conversation
const BEHAVIOR_RULES: &str = "\
You are a short-video script and copywriting assistant. Keep answers conversational, in short \
sentences with a fast rhythm, and avoid verbal tics.
Answer from the provided knowledge base first; when a question falls outside it, supplement with \
general experience and mark those parts with [general experience].

Response flow:
1. Understand and answer the user's question or need first
2. Offer relevant suggestions and angles
3. Provide a complete script only when the user explicitly asks to generate, produce, or write one
4. A complete script must carry explicit Hook, Value, and CTA markers

Content formatting requirements:
• Organize content with numbered points (1. 2. 3.) or bullets (•)
• Use emoji to separate sections and highlight key points (for example 🚀 💡 ✅ 📌)
• Never use markdown symbols such as asterisks; no bold or italic markers of any kind
• Separate paragraphs with line breaks and keep everything plain text

Script structure: align with Hook, then Value, then CTA; keep Value to at most three points and \
give the CTA one clear action.
A complete script should include:
1. A title for the topic
2. The script body (spoken lines, timing in seconds, and the CTA only; no shot descriptions)
3. Visual direction (camera and sound suggestions)
4. Publishing copy";

/// Header prefixed to the knowledge-base text when it is non-empty
const KB_HEADER: &str = "Short-video knowledge base (excerpt):";

/// Optional request parameters that shape the system prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptParams<'a> {
    /// Target platform (e.g. TikTok, Reels)
    pub platform: Option<&'a str>,
    /// Account positioning / persona
    pub profile: Option<&'a str>,
    /// Content topic
    pub topic: Option<&'a str>,
    /// Style/formatting directive override
    pub style: Option<&'a str>,
    /// Target script duration in seconds
    pub duration: Option<&'a str>,
}

/// Build the system prompt from the cached knowledge base and request parameters
///
/// Line order is fixed: platform, profile, topic, duration, style directive,
/// behavioral rules, then the knowledge base (header included only when the
/// document is non-empty).
#[must_use]
pub fn build_system_prompt(kb_text: &str, params: &PromptParams<'_>) -> String {
    let platform_line = params
        .platform
        .map_or_else(|| "Platform: unspecified".to_owned(), |p| format!("Platform: {p}"));
    let profile_line = params.profile.map_or_else(
        || "Account positioning: unspecified".to_owned(),
        |p| format!("Account positioning: {p}"),
    );
    let topic_line = params
        .topic
        .map_or_else(|| "Topic: unspecified".to_owned(), |t| format!("Topic: {t}"));
    let duration_line = format!(
        "Script duration: {} seconds",
        params.duration.unwrap_or(DEFAULT_DURATION_SECS)
    );
    let style_line = params.style.unwrap_or(DEFAULT_STYLE_DIRECTIVE);

    let kb_section = if kb_text.is_empty() {
        String::new()
    } else {
        format!("{KB_HEADER}\n{kb_text}")
    };

    format!(
        "{platform_line}\n{profile_line}\n{topic_line}\n{duration_line}\n{style_line}\n\n{BEHAVIOR_RULES}\n{kb_section}"
    )
}
