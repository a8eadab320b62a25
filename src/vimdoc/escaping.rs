//! HTML escaping
//!
//! Every piece of source text that reaches the output goes through [`escape_html`],
//! usually via an [`EscapeCache`]. Help files repeat the same short fragments
//! (tag names, single spaces, punctuation runs) thousands of times, so the cache
//! keeps the escaped form of each distinct input.

use std::collections::HashMap;

/// Escape `&`, `<` and `>` for inclusion in HTML text or attribute values.
///
/// Each input character is looked at once, so the entities introduced for `<`
/// and `>` are never escaped a second time within the same call.
pub fn escape_html(text: &str) -> String {
    if !text.contains(['&', '<', '>']) {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Grow-only memo in front of [`escape_html`].
///
/// A lookup either returns the stored result or computes, stores and returns it.
/// With a limit set, inputs seen after the cache is full are escaped directly and
/// not stored; the returned text is the same either way.
#[derive(Debug, Default, Clone)]
pub struct EscapeCache {
    entries: HashMap<String, String>,
    limit: Option<usize>,
    scratch: String,
}

impl EscapeCache {
    /// Create an unbounded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Escaped form of `text`.
    pub fn escape(&mut self, text: &str) -> &str {
        if self.entries.contains_key(text) {
            return &self.entries[text];
        }
        let escaped = escape_html(text);
        if self.limit.is_some_and(|limit| self.entries.len() >= limit) {
            self.scratch = escaped;
            return &self.scratch;
        }
        self.entries.entry(text.to_string()).or_insert(escaped)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_metacharacters() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn test_escape_plain_text_untouched() {
        assert_eq!(escape_html("plain words"), "plain words");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_escape_runs_once_per_call() {
        let once = escape_html("<&>");
        assert_eq!(once, "&lt;&amp;&gt;");
        // A second call escapes the entities it is handed, it does not undo them.
        assert_eq!(escape_html(&once), "&amp;lt;&amp;amp;&amp;gt;");
    }

    #[test]
    fn test_cache_stores_each_input_once() {
        let mut cache = EscapeCache::new();
        assert_eq!(cache.escape("<CR>"), "&lt;CR&gt;");
        assert_eq!(cache.escape("<CR>"), "&lt;CR&gt;");
        assert_eq!(cache.escape("word"), "word");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_bounded_cache_stops_growing() {
        let mut cache = EscapeCache::with_limit(1);
        assert_eq!(cache.escape("a<"), "a&lt;");
        assert_eq!(cache.escape("b>"), "b&gt;");
        assert_eq!(cache.escape("c&"), "c&amp;");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.escape("a<"), "a&lt;");
    }

    proptest! {
        #[test]
        fn escaped_text_has_no_raw_angle_brackets(text in ".*") {
            let escaped = escape_html(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
        }

        #[test]
        fn cache_matches_direct_escaping(
            texts in proptest::collection::vec("[a-z<>& ]{0,6}", 0..40),
            limit in proptest::option::of(0usize..8),
        ) {
            let mut cache = match limit {
                Some(limit) => EscapeCache::with_limit(limit),
                None => EscapeCache::new(),
            };
            for text in &texts {
                let expected = escape_html(text);
                prop_assert_eq!(cache.escape(text), expected.as_str());
            }
        }
    }
}
