//! Lexical patterns of the help-file format
//!
//! All patterns are compiled once, lazily, and anchored at the start of the
//! haystack they are given. Inline patterns are applied to the tail of a line
//! starting at the candidate position, so `^` means "at this position".
//!
//! The `regex` crate has no look-around. The few constructs that need it are
//! split into a pattern plus an explicit check on the neighbouring character:
//!
//! - `|pipe|` must not follow a backslash
//! - the free-form `[bracket]` placeholder must follow whitespace
//! - notes and words must not be glued to other word characters
//! - `*star*` must be followed by whitespace or the end of the line, which the
//!   pattern consumes and the caller gives back

use once_cell::sync::Lazy;
use regex::Regex;

/// One record of a tag index: tag, whitespace, file name. Anything after is ignored.
pub static TAG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)\s+(\S+)").unwrap());

/// First line of a help file declaring its own tag: `*file.txt*  description`
pub static FIRST_LINE_HELP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\S+\*\s").unwrap());

/// Horizontal rule made of `-` or `=`
pub static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-=]{3,}.*[-=]{3}$").unwrap());

/// A line ending in a lone `>` opens an example block
pub static EXAMPLE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:.* )?>$").unwrap());

/// Upper-case run in front of a tag declaration. Group 1 is the section text.
pub static SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([-A-Z .][-A-Z0-9 .()]*)\s+\*").unwrap());

pub static PIPE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|([#-)!+-~]+)\|").unwrap());

/// Group 1 is the tag; the match also swallows the whitespace after the closing `*`.
pub static STAR_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*([#-)!+-~]+)\*(?:\s|$)").unwrap());

pub static COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"^`([^`]+)`").unwrap());

pub static OPTION_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'(?:[a-z]{2,}|t_..)'").unwrap());

pub static CTRL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CTRL-(?:W_)?(?:[\w\[\]^+-<>=@]|<[A-Za-z]+?>)?").unwrap()
});

/// Angle, brace and keyword-bracket placeholders
pub static SPECIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:<.*?>|\{.*?\}|",
        r"\[(?:range|line|count|offset|\+?cmd|[-+]?num|\+\+opt|",
        r"arg|arguments|ident|addr|group)\])"
    ))
    .unwrap()
});

/// Free-form bracket placeholder, only valid after whitespace
pub static SPECIAL_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[-a-z^A-Z0-9_]{2,}\]").unwrap());

pub static VERSION_BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Vim version [0-9.a-z]+|VIM REFERENCE.*)").unwrap());

pub static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?:https?|ftp)://[^'"<> \t]+[a-zA-Z0-9/]"#).unwrap());

/// Note markers in the order a backtracking matcher would try them.
const NOTE_MARKERS: &[&str] = &[
    "note:", "note", "NOTE:", "NOTE", "Notes:", "Notes", "Note:", "Note",
];

/// Characters that make up a bare word.
///
/// Everything printable in Latin-1 except whitespace, `"`, `*`, `` ` `` and `|`.
pub fn is_word_char(c: char) -> bool {
    matches!(c,
        '!' | '#'..=')' | '+'..='_' | 'a'..='{' | '}' | '~' | '\u{C0}'..='\u{FF}')
}

/// Whether the character right before `pos` in `line` is a word character.
pub fn follows_word_char(line: &str, pos: usize) -> bool {
    line[..pos].chars().next_back().is_some_and(is_word_char)
}

/// Length of a note marker at the start of `rest`, if one stands alone there.
pub fn note_marker_len(rest: &str) -> Option<usize> {
    NOTE_MARKERS
        .iter()
        .find(|marker| {
            rest.strip_prefix(**marker)
                .is_some_and(|after| !after.chars().next().is_some_and(is_word_char))
        })
        .map(|marker| marker.len())
}

/// Length of the maximal word-character run at the start of `rest`.
pub fn word_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(rest.len(), |(idx, _)| idx)
}
