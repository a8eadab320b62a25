//! Diagnostics
//!
//! Anomalies found while building the tag registry or resolving references are
//! never errors. Each one is recorded once as a [`Diagnostic`] and emitted as a
//! `tracing` event; callers decide whether to print, count or ignore them.

use std::fmt;
use tracing::{info, warn};

/// A non-fatal finding about the tag index or a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A tag points at a file that has no entry in the URL map
    UnmappedFilename { filename: String },
    /// A `|tag|` reference matched no known tag
    UnresolvedReference {
        tag: String,
        /// Known tags that only differ from `tag` in case, sorted
        case_variants: Vec<String>,
    },
}

impl Diagnostic {
    /// Emit this diagnostic as a `tracing` event.
    pub(crate) fn emit(&self) {
        match self {
            Diagnostic::UnmappedFilename { filename } => {
                info!(filename = %filename, "unmapped filename, linking to current page");
            }
            Diagnostic::UnresolvedReference { tag, case_variants } => {
                warn!(
                    tag = %tag,
                    case_variants = ?case_variants,
                    "unresolved reference"
                );
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmappedFilename { filename } => {
                write!(f, "Unmapped filename: \"{filename}\"")
            }
            Diagnostic::UnresolvedReference { tag, case_variants } => {
                write!(f, "Unresolved reference: |{tag}|")?;
                for variant in case_variants {
                    write!(f, "\n  - tag with different case: |{variant}|")?;
                }
                Ok(())
            }
        }
    }
}
