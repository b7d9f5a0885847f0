//! Corpus indexing: host notes -> immutable per-mode snapshot.
//!
//! A snapshot is built for exactly one search mode, because the mode decides
//! which optional fields are kept and which path patterns apply. Switching
//! modes builds a fresh snapshot; evaluations hold an `Arc` to the one they
//! started with, so a concurrent re-index never changes data under them.

use crate::candidate::Candidate;
use crate::config::{ConfigError, ConfigResult, SearchMode, Settings};
use crate::interface::NoteHost;
use crate::models::Item;
use crate::prefilter::{current_dir_of, prefilter, PathPatterns};
use crate::ranking::RankingPlan;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Instant;

/// Everything one mode needs to answer queries, frozen at index time
#[derive(Debug)]
pub struct CorpusSnapshot {
    pub mode_index: usize,
    pub mode: SearchMode,
    /// Prefiltered items in corpus order (notes first, then phantoms)
    pub candidates: Vec<Candidate>,
    pub plan: RankingPlan,
    pub no_query_plan: RankingPlan,
    /// Active file at index time; excluded from `candidates`
    pub active_file: Option<String>,
    pub indexed_at: DateTime<Utc>,
}

impl CorpusSnapshot {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Time since this snapshot was indexed; reported with every evaluation
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.indexed_at
    }
}

/// Build the snapshot for `settings.search_modes[mode_index]`
pub fn build_snapshot(host: &dyn NoteHost, settings: &Settings, mode_index: usize) -> ConfigResult<CorpusSnapshot> {
    let start = Instant::now();
    let mode = settings
        .search_modes
        .get(mode_index)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownMode(format!("#{mode_index}")))?;
    let plan = RankingPlan::compile(&mode.sort_priorities)?;

    let active_file = host.active_file_path();
    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::new();
    let mut skipped = 0usize;

    for note in host.notes() {
        if note.path.is_empty() || active_file.as_deref() == Some(note.path.as_str()) || seen.contains(&note.path) {
            skipped += 1;
            continue;
        }
        seen.insert(note.path.clone());
        items.push(Item::from_note(note, mode.search_by));
    }

    if !settings.show_existing_files_only {
        for target in host.unresolved_link_targets() {
            if target.is_empty() {
                continue;
            }
            let phantom = Item::phantom(&target);
            if seen.insert(phantom.id.clone()) {
                items.push(phantom);
            }
        }
    }

    let current_dir = current_dir_of(active_file.as_deref());
    let (include, exclude) = if mode.is_backlink_search {
        (Vec::new(), PathPatterns::parse(&settings.backlink_exclude_prefix_patterns)?.resolve(current_dir))
    } else {
        (
            PathPatterns::parse(&mode.include_prefix_patterns)?.resolve(current_dir),
            PathPatterns::parse(&mode.exclude_prefix_patterns)?.resolve(current_dir),
        )
    };
    let before = items.len();
    let items = prefilter(items, &include, &exclude, |item| item.id.as_str());

    let candidates: Vec<Candidate> =
        items.into_iter().map(|item| Candidate::new(item, settings.normalize_accents)).collect();

    perf_log!(
        settings.log_performance,
        mode = %mode.name,
        candidates = candidates.len(),
        prefiltered_out = before - candidates.len(),
        skipped,
        latency_ms = start.elapsed().as_millis() as u64,
        "indexed corpus"
    );

    Ok(CorpusSnapshot {
        mode_index,
        no_query_plan: plan.without_match_criteria(),
        plan,
        mode,
        candidates,
        active_file,
        indexed_at: Utc::now(),
    })
}
