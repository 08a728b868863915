use std::sync::LazyLock;

use regex::Regex;

const MAX_VISIBLE_CHARS: usize = 100;

static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)bearer\s+[^\s'&]+", "Bearer [REDACTED]"),
        (r"\bsk-[A-Za-z0-9_\-]{8,}", "[REDACTED_KEY]"),
        (
            r"(?i)\b(api_key|apikey|password|secret|token)\s*[=:]\s*[^\s'&]+",
            "$1=[REDACTED]",
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Makes user text safe to log: secrets are redacted first, then the text is
/// cut to a fixed number of characters.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let redacted = SECRET_PATTERNS
        .iter()
        .fold(trimmed.to_string(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        });

    let total_chars = redacted.chars().count();
    if total_chars > MAX_VISIBLE_CHARS {
        let visible: String = redacted.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{visible}... ({total_chars} chars total)")
    } else {
        redacted
    }
}
