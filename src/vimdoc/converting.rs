//! Line converter
//!
//! Turns a help document into an HTML fragment, one source line at a time.
//! Each source line produces exactly one output line. The only state carried
//! across lines is the example block state:
//!
//! - `None`: ordinary text
//! - `Starting`: the current line ended with a lone `>`; it is rendered as
//!   ordinary text and the block opens on the next line
//! - `Inside`: lines are echoed escaped in an example span until a line starts
//!   with a non-blank character; a leading `<` on that line is dropped
//!
//! Matching that depends on the true start or end of a line (example start,
//! section headers, the first-line help marker) looks at the line before tab
//! expansion. Everything that is rendered uses the expanded line.

use super::config::ConvertOptions;
use super::error::ConvertError;
use super::escaping::EscapeCache;
use super::inlines::{Inline, InlineScanner};
use super::patterns::{EXAMPLE_START, FIRST_LINE_HELP, HORIZONTAL_RULE, SECTION};
use super::tags::{anchor_name, LinkStyle, RefKind, TagRegistry};
use std::borrow::Cow;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ExampleState {
    #[default]
    None,
    Starting,
    Inside,
}

/// Converts documents against a shared [`TagRegistry`].
///
/// The converter owns its escape cache; reuse one converter for all documents
/// of a job to keep the cache warm.
pub struct Converter<'r> {
    registry: &'r TagRegistry,
    options: ConvertOptions,
    escapes: EscapeCache,
}

impl<'r> Converter<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self::with_options(registry, ConvertOptions::default())
    }

    pub fn with_options(registry: &'r TagRegistry, options: ConvertOptions) -> Self {
        let escapes = match options.escape_cache_limit {
            Some(limit) => EscapeCache::with_limit(limit),
            None => EscapeCache::new(),
        };
        Self {
            registry,
            options,
            escapes,
        }
    }

    pub fn registry(&self) -> &'r TagRegistry {
        self.registry
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a whole document into an HTML fragment.
    pub fn convert(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        let mut state = ExampleState::None;
        let mut lines = 0usize;
        for (idx, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            state = self.convert_line(line, idx == 0, state, &mut out);
            lines += 1;
        }
        debug!(lines, "document converted");
        out
    }

    /// Convert a document given as raw bytes, which must be UTF-8.
    pub fn convert_bytes(&mut self, bytes: &[u8]) -> Result<String, ConvertError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.convert(text))
    }

    fn convert_line(
        &mut self,
        raw: &str,
        is_first: bool,
        mut state: ExampleState,
        out: &mut String,
    ) -> ExampleState {
        let expanded = expand_tabs(raw, self.options.tab_width);
        let mut line: &str = &expanded;

        if HORIZONTAL_RULE.is_match(line) {
            out.push_str("<span class=\"h\">");
            out.push_str(line);
            out.push_str("</span>\n");
            return state;
        }

        if state == ExampleState::Inside {
            if !line.starts_with(|c: char| !c.is_whitespace()) {
                out.push_str("<span class=\"e\">");
                out.push_str(self.escapes.escape(line));
                out.push_str("</span>\n");
                return state;
            }
            state = ExampleState::None;
            line = line.strip_prefix('<').unwrap_or(line);
        }

        let first_line_help =
            is_first && self.options.first_line_help && FIRST_LINE_HELP.is_match(raw);
        if first_line_help {
            out.push_str("<span class=\"flh\">");
        }

        if EXAMPLE_START.is_match(raw) {
            state = ExampleState::Starting;
            line = line.strip_suffix('>').unwrap_or(line);
        }

        if SECTION.is_match(raw) {
            if let Some(section) = SECTION.captures(line).and_then(|caps| caps.get(1)) {
                out.push_str("<span class=\"c\">");
                out.push_str(section.as_str());
                out.push_str("</span>");
                line = &line[section.end()..];
            }
        }

        let mut last = 0;
        for found in InlineScanner::new(line) {
            if found.span.start > last {
                out.push_str(self.escapes.escape(&line[last..found.span.start]));
            }
            last = found.span.end;
            self.render_inline(found.inline, out);
        }
        if last < line.len() {
            out.push_str(self.escapes.escape(&line[last..]));
        }

        if first_line_help {
            out.push_str("</span>");
        }
        out.push('\n');

        if state == ExampleState::Starting {
            ExampleState::Inside
        } else {
            state
        }
    }

    fn render_inline(&mut self, inline: Inline<'_>, out: &mut String) {
        let registry = self.registry;
        match inline {
            Inline::Header(text) => self.wrap("h", text, out),
            Inline::Graphic(text) => out.push_str(self.escapes.escape(text)),
            Inline::PipeWord(tag) => out.push_str(&registry.resolve(tag, RefKind::Piped)),
            Inline::StarWord(tag) => {
                let anchor = anchor_name(tag);
                out.push_str("<a name=\"");
                out.push_str(&anchor);
                out.push_str("\" href=\"#");
                out.push_str(&anchor);
                out.push_str("\" class=\"t\">");
                out.push_str(self.escapes.escape(tag));
                out.push_str("</a>");
            }
            Inline::Command(text) => self.wrap("e", text, out),
            Inline::OptionWord(tag) => {
                out.push_str(&registry.resolve(tag, RefKind::Styled(LinkStyle::Option)))
            }
            Inline::CtrlKey(tag) => {
                out.push_str(&registry.resolve(tag, RefKind::Styled(LinkStyle::ControlKey)))
            }
            Inline::Special(tag) => {
                out.push_str(&registry.resolve(tag, RefKind::Styled(LinkStyle::Special)))
            }
            Inline::VersionBanner(text) => self.wrap("i", text, out),
            Inline::Note(text) => self.wrap("n", text, out),
            Inline::Url(url) => {
                out.push_str("<a class=\"u\" href=\"");
                out.push_str(url);
                out.push_str("\">");
                out.push_str(self.escapes.escape(url));
                out.push_str("</a>");
            }
            Inline::Word(word) => out.push_str(&registry.resolve(word, RefKind::Bare)),
        }
    }

    /// Escaped `text` in a span of the given class.
    fn wrap(&mut self, class: &str, text: &str, out: &mut String) {
        out.push_str("<span class=\"");
        out.push_str(class);
        out.push_str("\">");
        out.push_str(self.escapes.escape(text));
        out.push_str("</span>");
    }
}

/// Expand tabs to the next multiple of `width` columns.
fn expand_tabs(line: &str, width: usize) -> Cow<'_, str> {
    if !line.contains('\t') {
        return Cow::Borrowed(line);
    }
    let width = width.max(1);
    let mut expanded = String::with_capacity(line.len() + width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = width - column % width;
            expanded.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            expanded.push(c);
            column += 1;
        }
    }
    Cow::Owned(expanded)
}
