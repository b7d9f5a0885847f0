//! Search candidate with memoized derived state.
//!
//! Module isolation ensures no code outside this module can mutate the item
//! after construction, so the `OnceLock` caches can never go stale.

use crate::models::Item;
use crate::search::FoldedText;
use std::sync::OnceLock;

/// Every searchable field of an item, folded once.
#[derive(Debug, Clone)]
pub struct FoldedFields {
    pub name: FoldedText,
    pub aliases: Vec<FoldedText>,
    pub tags: Vec<FoldedText>,
    pub headers: Vec<FoldedText>,
    pub links: Vec<FoldedText>,
}

/// A corpus item with memoized derived state.
/// `folded()` and `sort_name()` are computed on first access and cached, so
/// they are shared by every query evaluated against the same snapshot.
#[derive(Debug, Clone)]
pub struct Candidate {
    item: Item,
    normalize_accents: bool,
    folded: OnceLock<FoldedFields>,
    sort_name: OnceLock<String>,
}

impl Candidate {
    pub fn new(item: Item, normalize_accents: bool) -> Self {
        Self {
            item,
            normalize_accents,
            folded: OnceLock::new(),
            sort_name: OnceLock::new(),
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn folded(&self) -> &FoldedFields {
        self.folded.get_or_init(|| {
            let fold_all = |values: &[String]| -> Vec<FoldedText> {
                values.iter().map(|v| FoldedText::new(v, self.normalize_accents)).collect()
            };
            FoldedFields {
                name: FoldedText::new(&self.item.display_name, self.normalize_accents),
                aliases: fold_all(&self.item.aliases),
                tags: fold_all(&self.item.tags),
                headers: fold_all(&self.item.headers),
                links: fold_all(&self.item.links),
            }
        })
    }

    /// Lowercased display name for case-insensitive alphabetical ordering
    pub fn sort_name(&self) -> &str {
        self.sort_name.get_or_init(|| self.item.display_name.to_lowercase())
    }

    /// Display name length in characters
    pub fn name_len(&self) -> usize {
        self.item.display_name.chars().count()
    }
}
