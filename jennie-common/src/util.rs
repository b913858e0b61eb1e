//! Utility functions for the JENNIE backend.

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Multi-byte UTF-8 characters are handled by cutting on character boundaries.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Sanitize a string for safe logging (redact credential-like patterns).
pub fn sanitize_for_log(s: &str) -> String {
    let patterns: &[(&str, &str)] = &[
        (r"AIza[0-9A-Za-z_\-]{35}", "***REDACTED_GOOGLE_KEY***"),
        (r"([?&]key=)[^&\s]+", "${1}***REDACTED***"),
        (r"(?i)(x-goog-api-key|api[_-]?key|apikey)\s*[=:]\s*\S{10,}", "$1=***REDACTED***"),
        (r"(?i)(token|secret|bearer)\s*[=:]\s*\S{10,}", "$1=***REDACTED***"),
    ];

    let mut result = s.to_string();
    for (pattern, replacement) in patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            result = re.replace_all(&result, *replacement).to_string();
        }
    }
    result
}
