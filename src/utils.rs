use tracing::warn;
use url::Url;


#[inline]
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}


#[inline]
pub fn safe_truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}


/// Canonical form of a vendor base URL, without a trailing slash.
///
/// An unparsable URL is kept as given: the provider is still built and its
/// health probe will simply fail.
pub fn normalize_base_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => url.as_str().trim_end_matches('/').to_string(),
        Err(e) => {
            warn!("Invalid provider base URL '{}': {}", raw, e);
            raw.trim().trim_end_matches('/').to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_ascii() {
        assert_eq!(safe_truncate("hello world", 5), "hello");
    }

    #[test]
    fn test_safe_truncate_multibyte() {
        assert_eq!(safe_truncate("Résumé parsing", 6), "Résumé");
    }

    #[test]
    fn test_safe_truncate_shorter() {
        assert_eq!(safe_truncate("hi", 10), "hi");
    }

    #[test]
    fn test_safe_truncate_ellipsis() {
        assert_eq!(safe_truncate_ellipsis("hello world", 5), "hello...");
        assert_eq!(safe_truncate_ellipsis("hi", 10), "hi");
    }

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:11434/"),
            "http://localhost:11434"
        );
        assert_eq!(
            normalize_base_url("https://api.groq.com/openai/v1/"),
            "https://api.groq.com/openai/v1"
        );
    }

    #[test]
    fn test_normalize_base_url_keeps_invalid_input() {
        assert_eq!(normalize_base_url("not a url/"), "not a url");
    }
}
