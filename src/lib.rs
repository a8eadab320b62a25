//! # vimdoc
//!
//! Converts plain-text help files (the `*tag*` / `|link|` convention) into
//! hyperlinked HTML fragments.
//!
//! The pipeline is one-way: a tag index plus a filename → URL map build a
//! [`TagRegistry`](vimdoc::tags::TagRegistry), which a
//! [`Converter`](vimdoc::converting::Converter) consults while rewriting each
//! document line by line.
//!
//! ```rust,ignore
//! use vimdoc::{Converter, TagRegistry, UrlMap};
//!
//! let mut urls = UrlMap::new();
//! urls.insert("help.txt".to_string(), "help.html".to_string());
//! let registry = TagRegistry::new("help\thelp.txt\t/*help*\n", &mut urls);
//!
//! let html = Converter::new(&registry).convert("See |help| for details.");
//! ```

pub mod vimdoc;

pub use vimdoc::config::{ConvertOptions, UrlMap};
pub use vimdoc::converting::Converter;
pub use vimdoc::diagnostics::Diagnostic;
pub use vimdoc::error::{ConfigError, ConvertError};
pub use vimdoc::escaping::{escape_html, EscapeCache};
pub use vimdoc::tags::{LinkStyle, RefKind, ResolvedLink, TagEntry, TagRegistry};
