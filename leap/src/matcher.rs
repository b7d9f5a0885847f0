//! Single-field matching: one folded token against one folded field value.
//!
//! Tries each kind from strongest to weakest and stops at the first hit:
//! exact -> prefix -> word-prefix -> fuzzy (ordered subsequence). Both inputs
//! must already be folded (see `search::FoldedText`).

use crate::interface::MatchType;
use crate::search::FoldedText;

/// Match kind plus the folded char range `[start, end)` it covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub match_type: MatchType,
    pub start: usize,
    pub end: usize,
}

impl FieldMatch {
    fn new(match_type: MatchType, start: usize, end: usize) -> Self {
        Self { match_type, start, end }
    }
}

/// Match `token` against one field value.
///
/// A fuzzy match uses the tightest window containing the token's chars in
/// order, and is rejected when that window is longer than
/// `fuzzy_span_factor * token length`.
pub fn match_folded(token: &[char], field: &FoldedText, fuzzy_span_factor: u32) -> Option<FieldMatch> {
    let text = field.chars();
    if token.is_empty() || text.len() < token.len() {
        return None;
    }

    if text == token {
        return Some(FieldMatch::new(MatchType::Exact, 0, text.len()));
    }
    if text.starts_with(token) {
        return Some(FieldMatch::new(MatchType::Prefix, 0, token.len()));
    }
    if let Some(start) = word_prefix_start(token, text) {
        return Some(FieldMatch::new(MatchType::WordPrefix, start, start + token.len()));
    }

    let (start, len) = tightest_subsequence(token, text)?;
    let max_span = token.len().saturating_mul(fuzzy_span_factor as usize);
    if len > max_span {
        return None;
    }
    Some(FieldMatch::new(MatchType::Fuzzy, start, start + len))
}

/// Match against every value of a multi-valued field.
/// Keeps the strongest kind; ties go to the earliest value.
pub fn match_values(token: &[char], values: &[FoldedText], fuzzy_span_factor: u32) -> Option<(FieldMatch, usize)> {
    let mut best: Option<(FieldMatch, usize)> = None;
    for (i, value) in values.iter().enumerate() {
        let Some(m) = match_folded(token, value, fuzzy_span_factor) else {
            continue;
        };
        if best.map_or(true, |(b, _)| m.match_type < b.match_type) {
            best = Some((m, i));
            if m.match_type == MatchType::Exact {
                break;
            }
        }
    }
    best
}

/// First position after index 0 where a whitespace-delimited word begins with `token`
fn word_prefix_start(token: &[char], text: &[char]) -> Option<usize> {
    (1..=text.len() - token.len())
        .find(|&i| text[i - 1].is_whitespace() && !text[i].is_whitespace() && text[i..].starts_with(token))
}

/// Shortest window `(start, len)` of `text` containing `token` as an ordered
/// subsequence. Leftmost window wins on equal length.
fn tightest_subsequence(token: &[char], text: &[char]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;

    for start in 0..text.len() {
        if text[start] != token[0] {
            continue;
        }
        let mut ti = 1;
        let mut end = start;
        for (offset, &c) in text[start + 1..].iter().enumerate() {
            if ti == token.len() {
                break;
            }
            if c == token[ti] {
                ti += 1;
                end = start + 1 + offset;
            }
        }
        if ti < token.len() {
            // Later starts see a strict suffix of the text, so they cannot complete either
            break;
        }
        let len = end - start + 1;
        if best.map_or(true, |(_, b)| len < b) {
            best = Some((start, len));
        }
    }

    best
}
