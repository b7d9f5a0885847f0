//! Switcher configuration: global settings and per-mode search commands.
//!
//! Settings are owned by the host and handed over as a record (or JSON);
//! the core validates them once at construction so a broken configuration
//! fails loudly instead of producing silently wrong rankings.

use crate::interface::{FieldBadge, InputStatus};
use crate::prefilter::PathPatterns;
use crate::ranking::RankingPlan;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_SUGGESTIONS: u32 = 50;
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 0;
/// A fuzzy window may span at most this many characters per token character.
pub const DEFAULT_FUZZY_SPAN_FACTOR: u32 = 3;

/// Error type for configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown sort priority: {0}")]
    UnknownSortPriority(String),
    #[error("unknown sort direction in {0:?} (expected asc|desc)")]
    UnknownDirection(String),
    #[error("malformed path pattern {pattern:?}: {reason}")]
    MalformedPattern { pattern: String, reason: &'static str },
    #[error("no search modes configured")]
    NoSearchModes,
    #[error("unknown search mode: {0}")]
    UnknownMode(String),
    #[error("invalid {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("invalid settings JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which optional fields a mode matches against. Name and aliases are always searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct SearchFields {
    pub tag: bool,
    pub header: bool,
    pub link: bool,
}

/// A named search command: field toggles, prefix, default input, sort order and path filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct SearchMode {
    pub name: String,
    pub search_by: SearchFields,
    /// Typing this prefix switches into the mode; empty means "never by prefix"
    pub command_prefix: String,
    /// Text prepended to every query in this mode
    pub default_input: String,
    pub sort_priorities: Vec<String>,
    pub include_prefix_patterns: Vec<String>,
    pub exclude_prefix_patterns: Vec<String>,
    pub is_backlink_search: bool,
}

impl SearchMode {
    fn new(name: &str, command_prefix: &str, sort_priorities: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            command_prefix: command_prefix.to_string(),
            sort_priorities: sort_priorities.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Status-line metadata for this mode. Pure: no effect on matching.
    pub fn input_status(&self, search_query: &str) -> InputStatus {
        let label = if self.is_backlink_search {
            "Backlink search".to_string()
        } else {
            format!("{} ... ", self.name)
        };

        let mut badges = Vec::new();
        if self.search_by.tag {
            badges.push(FieldBadge::Tag);
        }
        if self.search_by.header {
            badges.push(FieldBadge::Header);
        }
        if self.search_by.link {
            badges.push(FieldBadge::Link);
        }

        InputStatus {
            label,
            is_backlink_search: self.is_backlink_search,
            badges,
            default_input_text: (!self.default_input.is_empty()).then(|| search_query.to_string()),
        }
    }
}

/// Global settings consumed by the switcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct Settings {
    pub max_suggestions: u32,
    pub search_delay_ms: u64,
    /// Evaluate the first query after an idle period without waiting for the delay
    pub leading_edge_search: bool,
    pub normalize_accents: bool,
    /// Skip phantom items (unresolved link targets)
    pub show_existing_files_only: bool,
    pub fuzzy_span_factor: u32,
    /// Emit indexing/evaluation timings at info level instead of debug
    pub log_performance: bool,
    pub backlink_exclude_prefix_patterns: Vec<String>,
    pub search_modes: Vec<SearchMode>,
}

impl Default for Settings {
    fn default() -> Self {
        let recent = SearchMode::new("Recent search", "", &["name-match", "last-opened", "last-modified"]);
        let file_name = SearchMode::new(
            "File name search",
            ":f ",
            &["match-strength", "name-length", "last-opened", "last-modified", "alphabetical"],
        );
        let landmark = SearchMode {
            search_by: SearchFields { tag: true, header: true, link: true },
            ..SearchMode::new(
                "Landmark search",
                ":s ",
                &["match-strength", "name-match", "tag-match", "header-match", "link-match", "starred", "last-opened"],
            )
        };
        let backlink = SearchMode {
            is_backlink_search: true,
            ..SearchMode::new("Backlink search", ":b ", &["last-opened", "last-modified"])
        };

        Self {
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
            leading_edge_search: false,
            normalize_accents: false,
            show_existing_files_only: false,
            fuzzy_span_factor: DEFAULT_FUZZY_SPAN_FACTOR,
            log_performance: false,
            backlink_exclude_prefix_patterns: Vec::new(),
            search_modes: vec![recent, file_name, landmark, backlink],
        }
    }
}

impl Settings {
    /// Parse settings from host-provided JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Compile every mode's sort priorities and path patterns.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search_modes.is_empty() {
            return Err(ConfigError::NoSearchModes);
        }
        if self.fuzzy_span_factor == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "fuzzy_span_factor",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_suggestions == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "max_suggestions",
                reason: "must be at least 1".to_string(),
            });
        }
        PathPatterns::parse(&self.backlink_exclude_prefix_patterns)?;
        for mode in &self.search_modes {
            RankingPlan::compile(&mode.sort_priorities)?;
            PathPatterns::parse(&mode.include_prefix_patterns)?;
            PathPatterns::parse(&mode.exclude_prefix_patterns)?;
        }
        Ok(())
    }

    /// Index of the mode with the given name
    pub fn mode_index(&self, name: &str) -> ConfigResult<usize> {
        self.search_modes
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| ConfigError::UnknownMode(name.to_string()))
    }

    /// First mode (in configured order) whose non-empty command prefix starts `query`
    pub fn mode_for_prefix(&self, query: &str) -> Option<usize> {
        self.search_modes
            .iter()
            .position(|m| !m.command_prefix.is_empty() && query.starts_with(&m.command_prefix))
    }
}
