//! Helper functions and utilities
//!
//! Small formatting helpers shared by the storage and logging code.

use std::time::Duration;

/// Maximum number of characters of a stored payload quoted in error messages
pub const PAYLOAD_PREVIEW_LENGTH: usize = 128;

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render raw stored bytes for an error message or log line
pub fn payload_preview(raw: &[u8]) -> String {
    if raw.is_empty() {
        return "<empty>".to_string();
    }
    truncate_text(&String::from_utf8_lossy(raw), PAYLOAD_PREVIEW_LENGTH)
}

/// Convert a TTL into whole seconds for SETEX, rounding partial seconds up
pub fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 8), "hello...");
        assert_eq!(truncate_text("привет мир", 6), "при...");
    }

    #[test]
    fn test_payload_preview() {
        assert_eq!(payload_preview(b""), "<empty>");
        assert_eq!(payload_preview(b"{}"), "{}");
        let long = vec![b'a'; 500];
        assert_eq!(payload_preview(&long).chars().count(), PAYLOAD_PREVIEW_LENGTH);
    }

    #[test]
    fn test_ttl_seconds() {
        assert_eq!(ttl_seconds(Duration::from_secs(300)), 300);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ttl_seconds(Duration::ZERO), 0);
    }
}
