//! Query tokenization, text folding and per-item match classification.
//!
//! Every comparison happens on folded text: lowercased, and when accent
//! normalization is on, NFD-decomposed with combining marks dropped. Folding
//! can change the character count (`İ` lowercases to two chars), so a folded
//! string keeps a map back to the original character index. Spans reported in
//! `MatchResult` always point into the original text, ready for highlighting.

use crate::candidate::Candidate;
use crate::config::SearchFields;
use crate::interface::{MatchField, MatchResult, MatchedSpan};
use crate::matcher::{match_values, FieldMatch};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Text folded for comparison, with a mapping back to original char positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedText {
    chars: Vec<char>,
    /// `origin[i]` is the original char index that produced folded char `i`
    origin: Vec<u32>,
}

impl FoldedText {
    pub fn new(text: &str, normalize_accents: bool) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());

        for (i, c) in text.chars().enumerate() {
            for lower in c.to_lowercase() {
                if normalize_accents {
                    for d in std::iter::once(lower).nfd().filter(|d| !is_combining_mark(*d)) {
                        chars.push(d);
                        origin.push(i as u32);
                    }
                } else {
                    chars.push(lower);
                    origin.push(i as u32);
                }
            }
        }

        Self { chars, origin }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[cfg(test)]
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Map a folded range `[start, end)` back to `(start, length)` in original chars.
    pub fn original_span(&self, start: usize, end: usize) -> (u64, u64) {
        if start >= end || end > self.origin.len() {
            return (0, 0);
        }
        let orig_start = self.origin[start] as u64;
        let orig_end = self.origin[end - 1] as u64 + 1;
        (orig_start, orig_end - orig_start)
    }
}

/// One query token: the text as typed plus its folded chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    pub original: String,
    pub folded: Vec<char>,
}

impl QueryToken {
    pub fn new(token: &str, normalize_accents: bool) -> Self {
        Self {
            original: token.to_string(),
            folded: FoldedText::new(token, normalize_accents).chars,
        }
    }
}

/// Split a query on whitespace, dropping empty tokens. Order is preserved.
pub fn tokenize(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Tokenize and fold a query in one pass
pub fn tokenize_query(query: &str, normalize_accents: bool) -> Vec<QueryToken> {
    tokenize(query)
        .into_iter()
        .map(|t| QueryToken::new(t, normalize_accents))
        .collect()
}

/// Classify one candidate against all query tokens.
///
/// Returns `None` when some token matches no enabled field (the item is
/// excluded), otherwise one `MatchResult` per token in query order. For each
/// token the strongest match type wins; equal strengths go to the
/// higher-priority field (name > alias > tag > header > link).
pub fn classify(
    candidate: &Candidate,
    tokens: &[QueryToken],
    fields: SearchFields,
    fuzzy_span_factor: u32,
) -> Option<Vec<MatchResult>> {
    let folded = candidate.folded();
    let mut results = Vec::with_capacity(tokens.len());

    let name = std::slice::from_ref(&folded.name);
    let mut searched: Vec<(MatchField, &[FoldedText])> =
        vec![(MatchField::Name, name), (MatchField::Alias, folded.aliases.as_slice())];
    if fields.tag {
        searched.push((MatchField::Tag, folded.tags.as_slice()));
    }
    if fields.header {
        searched.push((MatchField::Header, folded.headers.as_slice()));
    }
    if fields.link {
        searched.push((MatchField::Link, folded.links.as_slice()));
    }

    for token in tokens {
        let mut best: Option<(FieldMatch, MatchField, usize, &FoldedText)> = None;

        // Fields are visited in priority order, so only a strictly stronger match replaces
        for &(field, values) in &searched {
            if let Some((m, idx)) = match_values(&token.folded, values, fuzzy_span_factor) {
                if best.as_ref().map_or(true, |(b, ..)| m.match_type < b.match_type) {
                    best = Some((m, field, idx, &values[idx]));
                }
            }
        }

        let (m, field, value_index, text) = best?;
        let (start, length) = text.original_span(m.start, m.end);
        results.push(MatchResult {
            token: token.original.clone(),
            field,
            match_type: m.match_type,
            span: MatchedSpan { start, length },
            value_index: value_index as u32,
        });
    }

    Some(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FUZZY_SPAN_FACTOR;
    use crate::interface::MatchType;
    use crate::models::Item;

    fn candidate(name: &str, aliases: &[&str], tags: &[&str], headers: &[&str], links: &[&str]) -> Candidate {
        let item = Item {
            id: format!("{name}.md"),
            display_name: name.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            links: links.iter().map(|s| s.to_string()).collect(),
            ..Item::default()
        };
        Candidate::new(item, false)
    }

    const ALL: SearchFields = SearchFields { tag: true, header: true, link: true };
    const NAME_ONLY: SearchFields = SearchFields { tag: false, header: false, link: false };

    fn run(c: &Candidate, query: &str, fields: SearchFields) -> Option<Vec<MatchResult>> {
        classify(c, &tokenize_query(query, false), fields, DEFAULT_FUZZY_SPAN_FACTOR)
    }

    // ── tokenizer ───────────────────────────────────────────────

    #[test]
    fn test_tokenize_splits_and_drops_empty() {
        assert_eq!(tokenize("  alpha   beta\tgamma "), vec!["alpha", "beta", "gamma"]);
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_query_keeps_original_text() {
        let tokens = tokenize_query("Café Noir", true);
        assert_eq!(tokens[0].original, "Café");
        assert_eq!(tokens[0].folded, vec!['c', 'a', 'f', 'e']);
        assert_eq!(tokens[1].folded, vec!['n', 'o', 'i', 'r']);
    }

    #[test]
    fn test_normalize_accents() {
        assert_eq!(FoldedText::new("Café", true).as_string(), "cafe");
        assert_eq!(FoldedText::new("Café", false).as_string(), "café");
        assert_eq!(FoldedText::new("Ångström Über", true).as_string(), "angstrom uber");
    }

    #[test]
    fn test_folded_span_maps_to_original_chars() {
        // 'İ' lowercases to 'i' + U+0307, so folded text is one char longer
        let folded = FoldedText::new("İstanbul", false);
        assert_eq!(folded.chars().len(), 9);
        // folded [2, 9) is "stanbul", original chars [1, 8)
        assert_eq!(folded.original_span(2, 9), (1, 7));
        // folded [0, 2) both come from original char 0
        assert_eq!(folded.original_span(0, 2), (0, 1));
    }

    #[test]
    fn test_folded_span_out_of_range_is_empty() {
        let folded = FoldedText::new("abc", false);
        assert_eq!(folded.original_span(2, 2), (0, 0));
        assert_eq!(folded.original_span(0, 10), (0, 0));
    }

    // ── classifier ──────────────────────────────────────────────

    #[test]
    fn test_and_across_tokens_excludes() {
        let c = candidate("Project Alpha Notes", &[], &["alpha"], &[], &[]);
        assert!(run(&c, "alpha beta", ALL).is_none());
        assert!(run(&c, "alpha notes", ALL).is_some());
    }

    #[test]
    fn test_or_across_fields() {
        let by_name = candidate("Alpha", &[], &[], &[], &[]);
        let by_tag = candidate("Zulu", &[], &["alpha"], &[], &[]);

        let r = run(&by_name, "alpha", ALL).unwrap();
        assert_eq!(r[0].field, MatchField::Name);
        let r = run(&by_tag, "alpha", ALL).unwrap();
        assert_eq!(r[0].field, MatchField::Tag);
    }

    #[test]
    fn test_disabled_fields_never_match() {
        let c = candidate("Zulu", &[], &["alpha"], &["alpha"], &["alpha"]);
        assert!(run(&c, "alpha", NAME_ONLY).is_none());
        let header_only = SearchFields { header: true, ..NAME_ONLY };
        assert_eq!(run(&c, "alpha", header_only).unwrap()[0].field, MatchField::Header);
    }

    #[test]
    fn test_aliases_always_searched() {
        let c = candidate("Zulu", &["Alpha Centauri"], &[], &[], &[]);
        let r = run(&c, "centauri", NAME_ONLY).unwrap();
        assert_eq!(r[0].field, MatchField::Alias);
        assert_eq!(r[0].match_type, MatchType::WordPrefix);
        assert_eq!(r[0].span, MatchedSpan { start: 6, length: 8 });
    }

    #[test]
    fn test_stronger_field_beats_priority() {
        // Name is only a fuzzy match, tag is exact: exact wins despite lower field priority
        let c = candidate("xalphax", &[], &["alpha"], &[], &[]);
        let r = run(&c, "alpha", ALL).unwrap();
        assert_eq!(r[0].field, MatchField::Tag);
        assert_eq!(r[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_equal_strength_goes_to_name() {
        let c = candidate("alpha", &["alpha"], &["alpha"], &[], &[]);
        let r = run(&c, "alpha", ALL).unwrap();
        assert_eq!(r[0].field, MatchField::Name);
    }

    #[test]
    fn test_each_token_may_match_a_different_field() {
        let c = candidate("Weekly Review", &[], &["#work"], &["Action items"], &[]);
        let r = run(&c, "weekly work action", ALL).unwrap();
        assert_eq!(r.len(), 3);
        assert_eq!(r[0].field, MatchField::Name);
        assert_eq!(r[1].field, MatchField::Tag);
        assert_eq!(r[2].field, MatchField::Header);
        assert_eq!(r[1].token, "work");
    }

    #[test]
    fn test_value_index_points_at_matched_value() {
        let c = candidate("Zulu", &[], &["#home", "#errand", "#garden"], &[], &[]);
        let r = run(&c, "#garden", ALL).unwrap();
        assert_eq!(r[0].value_index, 2);
        assert_eq!(r[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_accent_normalization_exact() {
        let item = Item { id: "Café.md".into(), display_name: "Café".into(), ..Item::default() };
        let c = Candidate::new(item, true);
        let r = classify(&c, &tokenize_query("cafe", true), NAME_ONLY, DEFAULT_FUZZY_SPAN_FACTOR).unwrap();
        assert_eq!(r[0].match_type, MatchType::Exact);
        assert_eq!(r[0].span, MatchedSpan { start: 0, length: 4 });
    }

    #[test]
    fn test_accents_significant_without_normalization() {
        let item = Item { id: "Café.md".into(), display_name: "Café".into(), ..Item::default() };
        let c = Candidate::new(item, false);
        let r = classify(&c, &tokenize_query("cafe", false), NAME_ONLY, DEFAULT_FUZZY_SPAN_FACTOR);
        assert!(r.is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let c = candidate("README", &[], &[], &[], &[]);
        assert_eq!(run(&c, "ReadMe", NAME_ONLY).unwrap()[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_empty_token_list_is_trivially_included() {
        let c = candidate("Anything", &[], &[], &[], &[]);
        assert_eq!(run(&c, "   ", NAME_ONLY), Some(Vec::new()));
    }
}
