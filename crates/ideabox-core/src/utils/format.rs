use chrono::NaiveDateTime;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a parsed timestamp for display, falling back to the raw text
pub fn format_timestamp(parsed: Option<NaiveDateTime>, raw: &str) -> String {
    match parsed {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => raw.to_string(),
    }
}

/// Show only the first few characters of a token (first 8 chars + ...)
pub fn mask_token(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{}...", head)
    } else {
        "*".repeat(token.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 2), "he");
        // Multi-byte characters are counted as one
        assert_eq!(truncate_string("创意提交系统", 5), "创意...");
    }

    #[test]
    fn test_format_timestamp() {
        let parsed = NaiveDateTime::parse_from_str("2024-05-01 13:45", "%Y-%m-%d %H:%M").ok();
        assert_eq!(format_timestamp(parsed, "2024-05-01 13:45"), "May 01, 2024 13:45");
        assert_eq!(format_timestamp(None, "soon"), "soon");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci...");
        assert_eq!(mask_token("short"), "*****");
    }
}
