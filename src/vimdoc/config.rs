//! Conversion options and URL map loading
//!
//! Options deserialize from JSON or YAML with every field optional; missing
//! fields take the defaults below. The URL map is a flat object from help file
//! name to the base URL its tags should link to.

use super::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Help file name → base URL of the page it is published as.
///
/// An empty URL means "the current page". The registry inserts such an entry
/// for every file it meets that has none, so callers see which files were
/// unmapped after construction.
pub type UrlMap = BTreeMap<String, String>;

const DEFAULT_TAB_WIDTH: usize = 8;

/// Knobs for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Tab stop width used when expanding tabs
    pub tab_width: usize,
    /// Maximum number of entries in the escape cache; unbounded when absent
    pub escape_cache_limit: Option<usize>,
    /// Wrap a leading `*file.txt*` line in the first-line-help span
    pub first_line_help: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            escape_cache_limit: None,
            first_line_help: true,
        }
    }
}

impl ConvertOptions {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(source)?;
        options.validate()
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_yaml::from_str(source)?;
        options.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::InvalidOption(
                "tab_width must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Parse a URL map from a JSON object of strings.
pub fn url_map_from_json(source: &str) -> Result<UrlMap, ConfigError> {
    Ok(serde_json::from_str(source)?)
}

/// Parse a URL map from a YAML mapping of strings.
pub fn url_map_from_yaml(source: &str) -> Result<UrlMap, ConfigError> {
    Ok(serde_yaml::from_str(source)?)
}
