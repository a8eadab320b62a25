//! Tag registry
//!
//! The registry is built once per conversion job from a tag index (one
//! `tag<whitespace>file` record per line) and a URL map. For every tag it
//! precomputes the two anchors a document may need: the one used for `|tag|`
//! references and the one used when the tag shows up as a plain word, styled by
//! the tag's lexical shape.
//!
//! Lookups never fail. A tag that is not in the registry degrades to a styled
//! span or to plain escaped text; `|tag|` misses are additionally recorded, once
//! per tag, together with any known tags that differ only in case.
//!
//! The link tables are immutable after construction. The miss set and the
//! diagnostic log sit behind a mutex so one registry can serve several
//! converters at once.

use super::config::UrlMap;
use super::diagnostics::Diagnostic;
use super::escaping::{escape_html, EscapeCache};
use super::patterns::{CTRL_KEY, OPTION_WORD, SPECIAL, TAG_LINE};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Bytes left alone in anchor names, besides ASCII alphanumerics.
const ANCHOR_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Encode a tag for use as an anchor name or URL fragment.
///
/// Form-style: spaces become `+`, everything outside `[A-Za-z0-9_.~-]` is
/// percent-encoded.
pub fn anchor_name(tag: &str) -> String {
    tag.split(' ')
        .map(|part| utf8_percent_encode(part, ANCHOR_SAFE).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// One record of the tag index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub tag: String,
    pub filename: String,
}

impl TagEntry {
    pub fn new(tag: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            filename: filename.into(),
        }
    }
}

/// Parse tag index text. Lines that do not start with two fields are skipped.
pub fn parse_tag_index(text: &str) -> Vec<TagEntry> {
    text.split(['\r', '\n'])
        .filter_map(|line| TAG_LINE.captures(line))
        .map(|caps| TagEntry::new(&caps[1], &caps[2]))
        .collect()
}

/// Visual style of a tag, decided by its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStyle {
    /// `'option'`
    Option,
    /// `CTRL-x`
    ControlKey,
    /// `<key>`, `{arg}`, `[range]`
    Special,
    Default,
}

impl LinkStyle {
    /// Classify a tag by the construct its start looks like.
    pub fn classify(tag: &str) -> Self {
        if OPTION_WORD.is_match(tag) {
            LinkStyle::Option
        } else if CTRL_KEY.is_match(tag) {
            LinkStyle::ControlKey
        } else if SPECIAL.is_match(tag) {
            LinkStyle::Special
        } else {
            LinkStyle::Default
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            LinkStyle::Option => "o",
            LinkStyle::ControlKey => "k",
            LinkStyle::Special => "s",
            LinkStyle::Default => "d",
        }
    }
}

/// How a tag was referenced in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `|tag|`
    Piped,
    /// An option, key or placeholder that may or may not be a known tag
    Styled(LinkStyle),
    /// Any other word
    Bare,
}

/// The two precomputed anchors of a known tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pipe: String,
    plain: String,
    style: LinkStyle,
}

impl ResolvedLink {
    fn new(url: &str, tag: &str, style: LinkStyle, escapes: &mut EscapeCache) -> Self {
        let head = format!("<a href=\"{url}#{}\"", anchor_name(tag));
        let tail = format!(">{}</a>", escapes.escape(tag));
        Self {
            pipe: format!("{head} class=\"l\"{tail}"),
            plain: format!("{head} class=\"{}\"{tail}", style.css_class()),
            style,
        }
    }

    /// Anchor used for `|tag|` references
    pub fn pipe(&self) -> &str {
        &self.pipe
    }

    /// Anchor used when the tag appears as a word
    pub fn plain(&self) -> &str {
        &self.plain
    }

    pub fn style(&self) -> LinkStyle {
        self.style
    }
}

#[derive(Debug, Default)]
struct ResolutionLog {
    unresolved: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

/// Tag → link tables plus the record of what failed to resolve
#[derive(Debug, Default)]
pub struct TagRegistry {
    links: HashMap<String, ResolvedLink>,
    /// Lowercased tag → every spelling registered under it
    case_index: HashMap<String, BTreeSet<String>>,
    log: Mutex<ResolutionLog>,
}

impl TagRegistry {
    /// Build a registry from raw tag index text.
    ///
    /// Files missing from `url_map` are added to it with an empty URL.
    pub fn new(index: &str, url_map: &mut UrlMap) -> Self {
        Self::from_entries(parse_tag_index(index), url_map)
    }

    /// Build a registry from already parsed index records.
    pub fn from_entries(entries: impl IntoIterator<Item = TagEntry>, url_map: &mut UrlMap) -> Self {
        let mut registry = Self::default();
        let mut escapes = EscapeCache::new();
        for entry in entries {
            let url = url_map.entry(entry.filename).or_insert_with_key(|filename| {
                registry.record(Diagnostic::UnmappedFilename {
                    filename: filename.clone(),
                });
                String::new()
            });
            registry.add_tag(url, entry.tag, &mut escapes);
        }
        debug!(tags = registry.links.len(), "tag registry built");
        registry
    }

    fn add_tag(&mut self, url: &str, tag: String, escapes: &mut EscapeCache) {
        let link = ResolvedLink::new(url, &tag, LinkStyle::classify(&tag), escapes);
        self.case_index
            .entry(tag.to_lowercase())
            .or_default()
            .insert(tag.clone());
        self.links.insert(tag, link);
    }

    /// HTML for a reference to `tag`.
    ///
    /// Known tags always use their own style for plain references, whatever
    /// style the caller guessed. Unknown tags become a styled span (class `d`
    /// for `|tag|`) or, for bare words, just the escaped text.
    pub fn resolve(&self, tag: &str, kind: RefKind) -> Cow<'_, str> {
        if let Some(link) = self.links.get(tag) {
            return match kind {
                RefKind::Piped => Cow::Borrowed(link.pipe()),
                RefKind::Styled(_) | RefKind::Bare => Cow::Borrowed(link.plain()),
            };
        }
        let style = match kind {
            RefKind::Piped => {
                self.note_unresolved(tag);
                LinkStyle::Default
            }
            RefKind::Styled(style) => style,
            RefKind::Bare => return Cow::Owned(escape_html(tag)),
        };
        Cow::Owned(format!(
            "<span class=\"{}\">{}</span>",
            style.css_class(),
            escape_html(tag)
        ))
    }

    fn note_unresolved(&self, tag: &str) {
        let mut log = self.lock_log();
        if log.unresolved.contains(tag) {
            return;
        }
        log.unresolved.insert(tag.to_string());
        let diagnostic = Diagnostic::UnresolvedReference {
            tag: tag.to_string(),
            case_variants: self.case_variants(tag),
        };
        diagnostic.emit();
        log.diagnostics.push(diagnostic);
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.log
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .diagnostics
            .push(diagnostic);
    }

    fn lock_log(&self) -> MutexGuard<'_, ResolutionLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Known tags equal to `tag` ignoring case, sorted. May include `tag` itself.
    pub fn case_variants(&self, tag: &str) -> Vec<String> {
        self.case_index
            .get(&tag.to_lowercase())
            .map(|variants| variants.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn link(&self, tag: &str) -> Option<&ResolvedLink> {
        self.links.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.links.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// `|tag|` references that failed to resolve so far, sorted
    pub fn unresolved(&self) -> Vec<String> {
        let mut tags: Vec<_> = self.lock_log().unresolved.iter().cloned().collect();
        tags.sort();
        tags
    }

    /// Every diagnostic recorded so far, in the order it was found
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock_log().diagnostics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registry(index: &str) -> (TagRegistry, UrlMap) {
        let mut urls = UrlMap::new();
        urls.insert("options.txt".to_string(), "options.html".to_string());
        let registry = TagRegistry::new(index, &mut urls);
        (registry, urls)
    }

    #[rstest]
    #[case("'tabstop'", LinkStyle::Option)]
    #[case("'t_kb'", LinkStyle::Option)]
    #[case("CTRL-W", LinkStyle::ControlKey)]
    #[case("CTRL-W_<Down>", LinkStyle::ControlKey)]
    #[case("<CR>", LinkStyle::Special)]
    #[case("{motion}", LinkStyle::Special)]
    #[case("[count]", LinkStyle::Special)]
    #[case("[abc]", LinkStyle::Default)]
    #[case("'a'", LinkStyle::Default)]
    #[case("help", LinkStyle::Default)]
    #[case(":help", LinkStyle::Default)]
    fn test_classify(#[case] tag: &str, #[case] expected: LinkStyle) {
        assert_eq!(LinkStyle::classify(tag), expected);
    }

    #[test]
    fn test_anchor_name() {
        assert_eq!(anchor_name("foo"), "foo");
        assert_eq!(anchor_name("'ai'"), "%27ai%27");
        assert_eq!(anchor_name("<C-R>"), "%3CC-R%3E");
        assert_eq!(anchor_name("a b/c"), "a+b%2Fc");
        assert_eq!(anchor_name("x_y.z~"), "x_y.z~");
        assert_eq!(anchor_name("é"), "%C3%A9");
    }

    #[test]
    fn test_parse_index_skips_malformed_lines() {
        let entries = parse_tag_index("foo\tfoo.txt\t/*foo*\nbroken\n\n  indented x\r\nbar bar.txt");
        assert_eq!(
            entries,
            vec![TagEntry::new("foo", "foo.txt"), TagEntry::new("bar", "bar.txt")]
        );
    }

    #[test]
    fn test_links_for_known_tag() {
        let (registry, _) = registry("'ai'\toptions.txt\n");
        let link = registry.link("'ai'").unwrap();
        assert_eq!(
            link.pipe(),
            "<a href=\"options.html#%27ai%27\" class=\"l\">'ai'</a>"
        );
        assert_eq!(
            link.plain(),
            "<a href=\"options.html#%27ai%27\" class=\"o\">'ai'</a>"
        );
        assert_eq!(link.style(), LinkStyle::Option);
    }

    #[test]
    fn test_label_is_escaped() {
        let (registry, _) = registry("<Esc>\toptions.txt\n");
        assert_eq!(
            registry.resolve("<Esc>", RefKind::Piped),
            "<a href=\"options.html#%3CEsc%3E\" class=\"l\">&lt;Esc&gt;</a>"
        );
    }

    #[test]
    fn test_unmapped_file_is_added_and_reported_once() {
        let (registry, urls) = registry("foo\tfile.txt\nbar\tfile.txt\n");
        assert_eq!(urls.get("file.txt").map(String::as_str), Some(""));
        assert_eq!(
            registry.diagnostics(),
            vec![Diagnostic::UnmappedFilename {
                filename: "file.txt".to_string()
            }]
        );
        assert_eq!(
            registry.resolve("foo", RefKind::Piped),
            "<a href=\"#foo\" class=\"l\">foo</a>"
        );
    }

    #[test]
    fn test_registry_style_beats_caller_hint() {
        let (registry, _) = registry("CTRL-A\toptions.txt\n");
        assert_eq!(
            registry.resolve("CTRL-A", RefKind::Styled(LinkStyle::Special)),
            "<a href=\"options.html#CTRL-A\" class=\"k\">CTRL-A</a>"
        );
        assert_eq!(
            registry.resolve("CTRL-A", RefKind::Bare),
            registry.resolve("CTRL-A", RefKind::Styled(LinkStyle::Option))
        );
    }

    #[test]
    fn test_unknown_tags_degrade() {
        let (registry, _) = registry("");
        assert_eq!(
            registry.resolve("'nosuch'", RefKind::Styled(LinkStyle::Option)),
            "<span class=\"o\">'nosuch'</span>"
        );
        assert_eq!(registry.resolve("a<b", RefKind::Bare), "a&lt;b");
        assert_eq!(
            registry.resolve("missing-tag", RefKind::Piped),
            "<span class=\"d\">missing-tag</span>"
        );
        // Only piped misses are tracked.
        assert_eq!(registry.unresolved(), vec!["missing-tag".to_string()]);
    }

    #[test]
    fn test_unresolved_reported_once_with_case_variants() {
        let (registry, _) = registry("Foo\toptions.txt\nFOO\toptions.txt\n");
        registry.resolve("foo", RefKind::Piped);
        registry.resolve("foo", RefKind::Piped);
        assert_eq!(
            registry.diagnostics(),
            vec![Diagnostic::UnresolvedReference {
                tag: "foo".to_string(),
                case_variants: vec!["FOO".to_string(), "Foo".to_string()],
            }]
        );
    }

    #[test]
    fn test_duplicate_tag_keeps_last_record() {
        let (registry, _) = registry("dup\toptions.txt\ndup\tother.txt\n");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.link("dup").unwrap().plain(), "<a href=\"#dup\" class=\"d\">dup</a>");
        assert_eq!(registry.case_variants("DUP"), vec!["dup".to_string()]);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<TagRegistry>();
    }
}
