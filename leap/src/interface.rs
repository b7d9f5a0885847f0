//! Leap FFI Interface Definition
//!
//! This file defines the public interface exposed to the host UI via UniFFI.
//! It acts as the source of truth for shared types.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// How strongly a query token matched a field.
///
/// Declaration order is strength order: the derived `Ord` sorts the strongest
/// kind first, so `Exact < Prefix < WordPrefix < Fuzzy < NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, uniffi::Enum)]
pub enum MatchType {
    Exact,
    Prefix,
    WordPrefix,
    Fuzzy,
    NotFound,
}

impl MatchType {
    pub fn is_found(self) -> bool {
        self != MatchType::NotFound
    }
}

/// Which item field a token matched. Declaration order is field priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, uniffi::Enum)]
pub enum MatchField {
    Name,
    Alias,
    Tag,
    Header,
    Link,
    None,
}

/// Field-search badge shown next to the active mode name
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FieldBadge {
    Tag,
    Header,
    Link,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// Character span of a match inside the original (unfolded) field text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, uniffi::Record)]
pub struct MatchedSpan {
    pub start: u64,
    pub length: u64,
}

/// Result of matching one query token against one item
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct MatchResult {
    /// The query token as typed (not case-folded)
    pub token: String,
    pub field: MatchField,
    pub match_type: MatchType,
    pub span: MatchedSpan,
    /// Index of the matched value for multi-valued fields (0 for the name)
    pub value_index: u32,
}

impl MatchResult {
    #[cfg(test)]
    pub fn not_found(token: &str) -> Self {
        Self {
            token: token.to_string(),
            field: MatchField::None,
            match_type: MatchType::NotFound,
            span: MatchedSpan::default(),
            value_index: 0,
        }
    }
}

/// One suggestion row: item fields, per-token match results and final order
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct RankedItem {
    pub id: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub headers: Vec<String>,
    pub links: Vec<String>,
    pub is_phantom: bool,
    pub is_starred: bool,
    pub match_results: Vec<MatchResult>,
    /// Zero-based position after the final sort. Only meaningful within one result.
    pub order: u32,
    /// Backlink search only: character offset of the first link to the active file
    pub link_offset: Option<u64>,
}

/// Search result container
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct SuggestionResult {
    pub items: Vec<RankedItem>,
    /// Number of matches before truncation to `max_suggestions`
    pub total_count: u64,
    pub mode_name: String,
    /// Query after command-prefix stripping and default-input prepending
    pub search_query: String,
}

/// Display metadata for the input status line
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct InputStatus {
    pub label: String,
    pub is_backlink_search: bool,
    pub badges: Vec<FieldBadge>,
    /// Effective query shown under the input when the mode has a default input
    pub default_input_text: Option<String>,
}

/// Raw note record as enumerated by the host's metadata index
#[derive(Debug, Clone, PartialEq, Default, uniffi::Record)]
pub struct RawNote {
    pub path: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub headings: Vec<String>,
    /// Display text of each outgoing link
    pub links: Vec<String>,
    pub is_starred: bool,
    pub modified_at: Option<i64>,
    pub created_at: Option<i64>,
}

/// A resolved link triple: `source` links to `target` `count` times
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ResolvedLink {
    pub source: String,
    pub target: String,
    pub count: u32,
}

/// Error type for Leap operations
#[derive(Debug, Error, uniffi::Error)]
pub enum SwitcherError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Query superseded by newer input")]
    Superseded,
    #[error("Operation cancelled")]
    Cancelled,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only view of the host application, implemented on the host side.
/// Every method is a pull: the core never caches host state across evaluations
/// except the corpus snapshot it builds from `notes()`.
#[uniffi::export(with_foreign)]
pub trait NoteHost: Send + Sync {
    /// Enumerate every note known to the host's metadata index
    fn notes(&self) -> Vec<RawNote>;

    /// Path of the file currently open in the editor
    fn active_file_path(&self) -> Option<String>;

    /// Previously opened file paths, most recent first
    fn last_opened_paths(&self) -> Vec<String>;

    /// All resolved (source, target, count) link triples
    fn resolved_links(&self) -> Vec<ResolvedLink>;

    /// Link targets that do not resolve to an existing note
    fn unresolved_link_targets(&self) -> Vec<String>;

    /// Character offset of the first link or embed in `source_path` that points at `target_path`
    fn first_link_offset(&self, source_path: String, target_path: String) -> Option<u64>;
}

impl From<crate::config::ConfigError> for SwitcherError {
    fn from(e: crate::config::ConfigError) -> Self {
        SwitcherError::Config(e.to_string())
    }
}
