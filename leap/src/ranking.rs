//! Lexicographic ranking over a compiled chain of sort criteria.
//!
//! Each mode's `sort_priorities` compile once into a `RankingPlan`: a list of
//! tagged criteria, each with a direction. Items are compared criterion by
//! criterion and the first non-equal result decides. Complete ties keep their
//! relative input order (stable sort) and are finally broken by `id`, so the
//! output is deterministic for identical inputs.

use crate::candidate::Candidate;
use crate::config::{ConfigError, ConfigResult};
use crate::interface::{MatchField, MatchResult, MatchType};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Which signal a criterion compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    MatchStrength,
    MatchCoverage,
    Starred,
    LastOpened,
    NameLength,
    Alphabetical,
    LastModified,
    Created,
    FieldMatch(MatchField),
}

impl SortKey {
    /// Whether the criterion reads per-query match data
    pub fn needs_match_data(self) -> bool {
        matches!(
            self,
            SortKey::MatchStrength | SortKey::MatchCoverage | SortKey::NameLength | SortKey::FieldMatch(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

/// One compiled entry of a sort-priority list.
///
/// Every key compares a scalar where "ascending" is its natural order:
/// match-type rank (exact first), recency index, name length, lowercase name,
/// timestamps, and booleans where `true` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortCriterion {
    pub key: SortKey,
    pub direction: Direction,
}

impl SortCriterion {
    /// Parse `name` or `name:asc` / `name:desc`
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let raw = raw.trim();
        let (name, explicit) = match raw.rsplit_once(':') {
            Some((name, dir)) => {
                let direction = match dir.to_ascii_lowercase().as_str() {
                    "asc" => Direction::Ascending,
                    "desc" => Direction::Descending,
                    _ => return Err(ConfigError::UnknownDirection(raw.to_string())),
                };
                (name, Some(direction))
            }
            None => (raw, None),
        };

        use Direction::*;
        let (key, default_direction) = match name.to_ascii_lowercase().as_str() {
            "match-strength" => (SortKey::MatchStrength, Ascending),
            "match-coverage" => (SortKey::MatchCoverage, Descending),
            "starred" => (SortKey::Starred, Ascending),
            "last-opened" => (SortKey::LastOpened, Ascending),
            "name-length" => (SortKey::NameLength, Ascending),
            "alphabetical" => (SortKey::Alphabetical, Ascending),
            "alphabetical-reverse" => (SortKey::Alphabetical, Descending),
            "last-modified" => (SortKey::LastModified, Descending),
            "created-latest" => (SortKey::Created, Descending),
            "created-earliest" => (SortKey::Created, Ascending),
            "name-match" => (SortKey::FieldMatch(MatchField::Name), Ascending),
            "alias-match" => (SortKey::FieldMatch(MatchField::Alias), Ascending),
            "tag-match" => (SortKey::FieldMatch(MatchField::Tag), Ascending),
            "header-match" => (SortKey::FieldMatch(MatchField::Header), Ascending),
            "link-match" => (SortKey::FieldMatch(MatchField::Link), Ascending),
            _ => return Err(ConfigError::UnknownSortPriority(name.to_string())),
        };

        Ok(Self { key, direction: explicit.unwrap_or(default_direction) })
    }
}

/// Per-item signals derived from the match results, computed once before sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchSignals {
    /// Strongest match type across tokens, `None` when nothing matched
    pub best: Option<MatchType>,
    pub matched_tokens: u32,
    pub matched_span: u64,
    /// Indexed by `MatchField as usize` (name, alias, tag, header, link)
    pub field_hits: [bool; 5],
}

impl MatchSignals {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut signals = Self::default();
        for r in results.iter().filter(|r| r.match_type.is_found()) {
            signals.best = Some(signals.best.map_or(r.match_type, |b| b.min(r.match_type)));
            signals.matched_tokens += 1;
            signals.matched_span += r.span.length;
            if let Some(hit) = signals.field_hits.get_mut(r.field as usize) {
                *hit = true;
            }
        }
        signals
    }

    fn hit(&self, field: MatchField) -> bool {
        self.field_hits.get(field as usize).copied().unwrap_or(false)
    }
}

/// A candidate that survived classification, with its per-token results
#[derive(Debug, Clone)]
pub struct Classified<'a> {
    pub candidate: &'a Candidate,
    pub results: Vec<MatchResult>,
    pub signals: MatchSignals,
}

impl<'a> Classified<'a> {
    pub fn new(candidate: &'a Candidate, results: Vec<MatchResult>) -> Self {
        let signals = MatchSignals::from_results(&results);
        Self { candidate, results, signals }
    }
}

/// Compiled sort priorities for one mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankingPlan {
    criteria: Vec<SortCriterion>,
}

impl RankingPlan {
    /// Compile priority names. Unknown names are a configuration error.
    pub fn compile(priorities: &[String]) -> ConfigResult<Self> {
        let criteria = priorities.iter().map(|p| SortCriterion::parse(p)).collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { criteria })
    }

    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    /// The subset that applies when there is no query
    pub fn without_match_criteria(&self) -> Self {
        Self {
            criteria: self.criteria.iter().copied().filter(|c| !c.key.needs_match_data()).collect(),
        }
    }

    /// Stable sort by the criteria chain, then by id
    pub fn sort(&self, items: &mut [Classified<'_>], recency: &HashMap<String, u32>) {
        items.sort_by(|a, b| self.compare(a, b, recency));
    }

    pub fn compare(&self, a: &Classified<'_>, b: &Classified<'_>, recency: &HashMap<String, u32>) -> Ordering {
        self.criteria
            .iter()
            .map(|c| compare_by(*c, a, b, recency))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.candidate.id().cmp(b.candidate.id()))
    }
}

/// Rank classified items by `priorities`. Convenience over `RankingPlan`.
pub fn rank<'a>(
    mut items: Vec<Classified<'a>>,
    priorities: &[String],
    recency: &HashMap<String, u32>,
) -> ConfigResult<Vec<Classified<'a>>> {
    let plan = RankingPlan::compile(priorities)?;
    plan.sort(&mut items, recency);
    Ok(items)
}

/// Build `path -> index` from the host's recently-opened list (most recent first).
/// A path listed twice keeps its most recent index.
pub fn recency_map(last_opened: &[String]) -> HashMap<String, u32> {
    let mut map = HashMap::with_capacity(last_opened.len());
    for (i, path) in last_opened.iter().enumerate() {
        map.entry(path.clone()).or_insert(i as u32);
    }
    map
}

fn compare_by(criterion: SortCriterion, a: &Classified<'_>, b: &Classified<'_>, recency: &HashMap<String, u32>) -> Ordering {
    let dir = criterion.direction;
    let (ia, ib) = (a.candidate.item(), b.candidate.item());

    match criterion.key {
        SortKey::MatchStrength => missing_last(a.signals.best, b.signals.best, dir),
        SortKey::MatchCoverage => dir.apply(
            (a.signals.matched_tokens, a.signals.matched_span).cmp(&(b.signals.matched_tokens, b.signals.matched_span)),
        ),
        SortKey::Starred => dir.apply(ib.is_starred.cmp(&ia.is_starred)),
        SortKey::LastOpened => missing_last(recency.get(ia.id.as_str()), recency.get(ib.id.as_str()), dir),
        SortKey::NameLength => dir.apply(a.candidate.name_len().cmp(&b.candidate.name_len())),
        SortKey::Alphabetical => dir.apply(a.candidate.sort_name().cmp(b.candidate.sort_name())),
        SortKey::LastModified => missing_last(ia.modified_at, ib.modified_at, dir),
        SortKey::Created => missing_last(ia.created_at, ib.created_at, dir),
        SortKey::FieldMatch(field) => dir.apply(b.signals.hit(field).cmp(&a.signals.hit(field))),
    }
}

/// Compare optional values; `None` sorts after every `Some` in either direction
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, dir: Direction) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => dir.apply(x.cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
