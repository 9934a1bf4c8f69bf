use url::Url;

use crate::ValidationError;

/// Suggestions offered on an empty dashboard.
pub const SEED_URLS: [&str; 8] = [
    "https://www.example.com",
    "https://www.github.com",
    "https://www.stackoverflow.com",
    "https://www.medium.com",
    "https://www.reddit.com",
    "https://x.com",
    "https://x.com/messages",
    "https://x.com/home",
];

/// URLs staged for the next bulk submission, in insertion order and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingSendList {
    urls: Vec<String>,
}

impl PendingSendList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|existing| existing == url)
    }

    /// Returns false when the URL was already staged.
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.contains(&url) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.urls.len();
        self.urls.retain(|existing| existing != url);
        before != self.urls.len()
    }

    pub fn replace(&mut self, urls: impl IntoIterator<Item = String>) {
        self.urls.clear();
        for url in urls {
            self.push(url);
        }
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }
}

/// Trim and check a manually entered URL.
///
/// Accepts `http://` or `https://` followed by a dotted host whose last label has at
/// least two characters; ports and credentials are rejected.
pub fn validate_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ValidationError::InvalidUrl);
    }
    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl)?;
    if parsed.port().is_some() || !parsed.username().is_empty() || parsed.password().is_some()
    {
        return Err(ValidationError::InvalidUrl);
    }
    let host = parsed.host_str().ok_or(ValidationError::InvalidUrl)?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Err(ValidationError::InvalidUrl);
    }
    let label_ok = |label: &&str| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    };
    if !labels.iter().all(label_ok) {
        return Err(ValidationError::InvalidUrl);
    }
    if labels.last().map_or(0, |tld| tld.chars().count()) < 2 {
        return Err(ValidationError::InvalidUrl);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_websites() {
        assert_eq!(
            validate_url("  https://www.example.com/path?q=1 "),
            Ok("https://www.example.com/path?q=1".to_string())
        );
        assert!(validate_url("http://a.test").is_ok());
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in [
            "example.com",
            "ftp://example.com",
            "https://localhost",
            "https://example.c",
            "https://example.com:8080",
            "https://user@example.com",
            "https://exa mple.com",
        ] {
            assert_eq!(validate_url(raw), Err(ValidationError::InvalidUrl), "{raw}");
        }
    }

    #[test]
    fn push_keeps_order_and_skips_duplicates() {
        let mut list = PendingSendList::new();
        assert!(list.push("https://b.test"));
        assert!(list.push("https://a.test"));
        assert!(!list.push("https://b.test"));
        assert_eq!(list.urls(), ["https://b.test", "https://a.test"]);
    }
}
