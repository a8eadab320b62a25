//! Inline construct scanning
//!
//! A line is scanned left to right. At each position the constructs are tried
//! in a fixed priority order and the first one that matches wins; the scan then
//! resumes right after it. Text between matches is not reported, the caller
//! copies it through the escaper.
//!
//! Priority at a single position:
//!
//! 1. header line (`~` at end of line), only at offset 0
//! 2. graphic line (`` ` `` at end of line after a space), only at offset 0
//! 3. `|pipe|` reference
//! 4. `*star*` tag declaration
//! 5. `` `command` ``
//! 6. `'option'`
//! 7. `CTRL-x` key
//! 8. `<special>`, `{special}`, `[special]`
//! 9. version banner
//! 10. note marker
//! 11. bare URL
//! 12. bare word

use super::patterns::{
    follows_word_char, is_word_char, note_marker_len, word_len, COMMAND, CTRL_KEY, OPTION_WORD,
    PIPE_WORD, SPECIAL, SPECIAL_BRACKET, STAR_WORD, URL, VERSION_BANNER,
};
use regex::Regex;
use std::ops::Range;

/// A recognized inline construct, carrying the text the renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inline<'a> {
    /// Whole line minus the trailing `~`
    Header(&'a str),
    /// Whole line minus the trailing `` ` `` and the space before it
    Graphic(&'a str),
    /// Tag between the bars
    PipeWord(&'a str),
    /// Tag between the stars
    StarWord(&'a str),
    /// Text between the backticks
    Command(&'a str),
    /// `'option'` including the quotes
    OptionWord(&'a str),
    CtrlKey(&'a str),
    Special(&'a str),
    VersionBanner(&'a str),
    Note(&'a str),
    Url(&'a str),
    Word(&'a str),
}

/// A match together with the byte range it consumed in the scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch<'a> {
    pub span: Range<usize>,
    pub inline: Inline<'a>,
}

/// Iterator over the inline constructs of one line.
pub struct InlineScanner<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> InlineScanner<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// Try every construct at `pos`, in priority order.
    fn match_at(&self, pos: usize) -> Option<InlineMatch<'a>> {
        let line = self.line;
        let rest = &line[pos..];
        let first = rest.chars().next()?;

        if pos == 0 {
            if let Some(text) = line.strip_suffix('~') {
                return Some(whole_line(line, Inline::Header(text)));
            }
            if let Some(text) = line.strip_suffix(" `") {
                return Some(whole_line(line, Inline::Graphic(text)));
            }
        }

        let at = |len: usize, inline: Inline<'a>| InlineMatch {
            span: pos..pos + len,
            inline,
        };
        let group_of = |regex: &Regex| {
            regex.captures(rest).and_then(|caps| {
                caps.get(1)
                    .map(|group| (group.end() + 1, &rest[group.range()]))
            })
        };
        let whole = |regex: &Regex| regex.find(rest).map(|m| (m.end(), m.as_str()));

        match first {
            '|' if !line[..pos].ends_with('\\') => {
                if let Some((len, tag)) = group_of(&PIPE_WORD) {
                    return Some(at(len, Inline::PipeWord(tag)));
                }
            }
            '*' => {
                if let Some((len, tag)) = group_of(&STAR_WORD) {
                    return Some(at(len, Inline::StarWord(tag)));
                }
            }
            '`' => {
                if let Some((len, text)) = group_of(&COMMAND) {
                    return Some(at(len, Inline::Command(text)));
                }
            }
            _ => {}
        }

        if first == '\'' {
            if let Some((len, text)) = whole(&OPTION_WORD) {
                return Some(at(len, Inline::OptionWord(text)));
            }
        }
        if first == 'C' {
            if let Some((len, text)) = whole(&CTRL_KEY) {
                return Some(at(len, Inline::CtrlKey(text)));
            }
        }
        if matches!(first, '<' | '{' | '[') {
            if let Some((len, text)) = whole(&SPECIAL) {
                return Some(at(len, Inline::Special(text)));
            }
            let after_space = line[..pos].chars().next_back().is_some_and(char::is_whitespace);
            if after_space {
                if let Some((len, text)) = whole(&SPECIAL_BRACKET) {
                    return Some(at(len, Inline::Special(text)));
                }
            }
        }
        if first == 'V' {
            if let Some((len, text)) = whole(&VERSION_BANNER) {
                return Some(at(len, Inline::VersionBanner(text)));
            }
        }

        let standalone = !follows_word_char(line, pos);
        if standalone && matches!(first, 'n' | 'N') {
            if let Some(len) = note_marker_len(rest) {
                return Some(at(len, Inline::Note(&rest[..len])));
            }
        }
        if matches!(first, 'h' | 'f') {
            if let Some((len, text)) = whole(&URL) {
                return Some(at(len, Inline::Url(text)));
            }
        }
        if standalone && is_word_char(first) {
            let len = word_len(rest);
            return Some(at(len, Inline::Word(&rest[..len])));
        }
        None
    }
}

fn whole_line<'a>(line: &'a str, inline: Inline<'a>) -> InlineMatch<'a> {
    InlineMatch {
        span: 0..line.len(),
        inline,
    }
}

impl<'a> Iterator for InlineScanner<'a> {
    type Item = InlineMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        for (offset, _) in self.line[start..].char_indices() {
            if let Some(found) = self.match_at(start + offset) {
                self.pos = found.span.end;
                return Some(found);
            }
        }
        self.pos = self.line.len();
        None
    }
}
