//! Core data models for Leap
//!
//! `Item` is the internal, per-snapshot representation of a note. It is not
//! exposed via FFI; results cross the boundary as `RankedItem`.

use crate::config::SearchFields;
use crate::interface::{MatchResult, RankedItem, RawNote};
use crate::links::{basename, dedupe_preserving_order, phantom_path, strip_heading_format};

// ─────────────────────────────────────────────────────────────────────────────
// INTERNAL ITEM (not exposed via FFI)
// ─────────────────────────────────────────────────────────────────────────────

/// A searchable note. Fields the active mode does not search are empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub headers: Vec<String>,
    pub links: Vec<String>,
    pub is_phantom: bool,
    pub is_starred: bool,
    pub modified_at: Option<i64>,
    pub created_at: Option<i64>,
}

impl Item {
    /// Build an item from a host record, keeping only the fields `fields` enables
    pub fn from_note(note: RawNote, fields: SearchFields) -> Self {
        let display_name = if note.display_name.is_empty() {
            basename(&note.path).to_string()
        } else {
            note.display_name
        };

        Self {
            display_name,
            aliases: dedupe_preserving_order(note.aliases),
            tags: if fields.tag { dedupe_preserving_order(note.tags) } else { Vec::new() },
            headers: if fields.header {
                note.headings.iter().map(|h| strip_heading_format(h)).collect()
            } else {
                Vec::new()
            },
            links: if fields.link { dedupe_preserving_order(note.links) } else { Vec::new() },
            is_phantom: false,
            is_starred: note.is_starred,
            modified_at: note.modified_at,
            created_at: note.created_at,
            id: note.path,
        }
    }

    /// Placeholder for a link target that has no note yet
    pub fn phantom(target: &str) -> Self {
        let id = phantom_path(target);
        Self {
            display_name: basename(&id).to_string(),
            id,
            is_phantom: true,
            ..Self::default()
        }
    }

    /// Convert to the FFI row with this evaluation's match data
    pub fn to_ranked_item(&self, match_results: Vec<MatchResult>, order: u32, link_offset: Option<u64>) -> RankedItem {
        RankedItem {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            aliases: self.aliases.clone(),
            tags: self.tags.clone(),
            headers: self.headers.clone(),
            links: self.links.clone(),
            is_phantom: self.is_phantom,
            is_starred: self.is_starred,
            match_results,
            order,
            link_offset,
        }
    }
}
