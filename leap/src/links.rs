//! Link-graph helpers: backlink maps, phantom targets and heading cleanup.

use crate::interface::ResolvedLink;
use std::collections::{HashMap, HashSet};

/// Invert resolved links into `target -> {sources}`. Every resolved pair counts,
/// whatever its link count.
pub fn build_backlink_map(links: &[ResolvedLink]) -> HashMap<String, HashSet<String>> {
    let mut map: HashMap<String, HashSet<String>> = HashMap::new();
    for link in links {
        map.entry(link.target.clone()).or_default().insert(link.source.clone());
    }
    map
}

/// Drop repeated values, keeping the first occurrence of each
pub fn dedupe_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

/// Path a phantom note would be created at
pub fn phantom_path(target: &str) -> String {
    if target.ends_with(".md") {
        target.to_string()
    } else {
        format!("{target}.md")
    }
}

/// File name without directories or the `.md` extension
pub fn basename(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}

/// Render heading text the way it reads: wiki links and markdown links
/// collapse to their visible text, inline emphasis markers are removed.
pub fn strip_heading_format(heading: &str) -> String {
    let mut out = String::with_capacity(heading.len());
    let mut rest = heading;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("[[") {
            if let Some(close) = after.find("]]") {
                let inner = &after[..close];
                let visible = inner.rsplit('|').next().unwrap_or(inner);
                out.push_str(visible);
                rest = &after[close + 2..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('[') {
            if let Some(close) = after.find("](") {
                if let Some(paren) = after[close + 2..].find(')') {
                    out.push_str(&after[..close]);
                    rest = &after[close + 2 + paren + 1..];
                    continue;
                }
            }
        }
        if let Some(after) = ["**", "__", "~~", "==", "`"].iter().find_map(|m| rest.strip_prefix(*m)) {
            rest = after;
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out.trim().to_string()
}
