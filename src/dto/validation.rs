//! Validation helpers for DTOs.

use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateUrl, ValidationError};

static YOUTUBE_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(https?://)?(www\.)?(youtube\.com/(watch\?v=|embed/|v/|live/)|youtu\.be/)",
        r"[A-Za-z0-9_-]+([?&][A-Za-z0-9_&=%-]*)?$",
    ))
    .ok()
});

/// Whether `url` is a YouTube video or livestream link. The empty string clears the link
/// and is accepted.
///
/// # Examples
///
/// ```ignore
/// is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ") // true
/// is_youtube_url("youtu.be/dQw4w9WgXcQ?t=42")                  // true
/// is_youtube_url("https://vimeo.com/123")                      // false
/// ```
pub fn is_youtube_url(url: &str) -> bool {
    if url.is_empty() {
        return true;
    }
    YOUTUBE_URL
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(url))
}

/// `validator` adapter for [`is_youtube_url`].
pub fn validate_youtube_url(url: &str) -> Result<(), ValidationError> {
    if is_youtube_url(url) {
        return Ok(());
    }
    let mut err = ValidationError::new("youtube_url");
    err.message = Some("URL do YouTube inválida".into());
    Err(err)
}

/// Rejects strings that are blank once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Accepts an absolute URL, or the empty string used to clear an optional link.
pub fn validate_optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        return Ok(());
    }
    let mut err = ValidationError::new("url");
    err.message = Some("URL inválida".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_youtube_links() {
        for url in [
            "",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/live/abc_DEF-123?si=x1",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ?t=42",
        ] {
            assert!(is_youtube_url(url), "{url} should be accepted");
        }
    }

    #[test]
    fn rejects_other_links() {
        for url in [
            "https://vimeo.com/123",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=",
            "https://youtu.be/abc def",
            "javascript:alert(1)",
            "https://evil.com/youtube.com/watch?v=abc",
        ] {
            assert!(!is_youtube_url(url), "{url} should be rejected");
        }
    }

    #[test]
    fn validator_adapter_reports_a_message() {
        let err = validate_youtube_url("nope").unwrap_err();
        assert_eq!(err.code, "youtube_url");
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank("Ana").is_ok());
    }

    #[test]
    fn optional_urls_may_be_cleared() {
        assert!(validate_optional_url("").is_ok());
        assert!(validate_optional_url("https://cdn.example.com/tv.png").is_ok());
        assert!(validate_optional_url("not a url").is_err());
    }
}
