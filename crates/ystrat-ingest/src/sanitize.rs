//! Free-text sanitizer for model-bound strings.
//!
//! Applied to brief fields and keywords before prompt assembly, and to the
//! rendered prompt before it leaves the process. Sanitization never fails;
//! hostile fragments are removed or neutralized.

/// Hard cap on sanitized output length, matching the prompt budget.
pub const MAX_SANITIZED_CHARS: usize = 10_000;

/// Phrases associated with prompt-injection attempts. Matched
/// ASCII-case-insensitively and replaced with `[filtered]`.
const INJECTION_PHRASES: &[&str] = &[
    "ignore all previous instructions",
    "ignore previous instructions",
    "ignore the above",
    "forget everything",
    "you are now",
    "new instructions",
    "system:",
    "assistant:",
    "human:",
];

/// URL protocols collapsed out of model-bound text.
const URL_PROTOCOLS: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Sanitizes free text for inclusion in a prompt.
///
/// Strips HTML-like tags and control characters, neutralizes known
/// prompt-injection phrases, removes dangerous URL protocols, collapses
/// whitespace and enforces the length cap.
pub fn sanitize_text(input: &str) -> String {
    let mut text = strip_tags(input);

    for phrase in INJECTION_PHRASES {
        text = replace_ascii_ci(&text, phrase, "[filtered]");
    }
    for protocol in URL_PROTOCOLS {
        text = replace_ascii_ci(&text, protocol, "");
    }

    let collapsed = collapse_whitespace(&text);
    if collapsed.chars().count() > MAX_SANITIZED_CHARS {
        collapsed.chars().take(MAX_SANITIZED_CHARS).collect()
    } else {
        collapsed
    }
}

/// Removes `<...>` runs that look like markup tags. Unclosed `<` at end of
/// input is dropped along with whatever follows it.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => out.push(c),
        }
    }
    out
}

/// Collapses all whitespace and control characters into single spaces.
fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for c in input.chars() {
        if c.is_whitespace() || c.is_control() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Replaces every ASCII-case-insensitive occurrence of `needle` (which must
/// be ASCII) in `haystack` with `replacement`.
fn replace_ascii_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    debug_assert!(needle.is_ascii());
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut i = 0;
    while i < hay.len() {
        if i + pat.len() <= hay.len() && hay[i..i + pat.len()].eq_ignore_ascii_case(pat) {
            out.push_str(replacement);
            i += pat.len();
        } else {
            // Advance one full UTF-8 character to keep boundaries valid.
            let ch_len = haystack[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            out.push_str(&haystack[i..i + ch_len]);
            i += ch_len;
        }
    }
    out
}
