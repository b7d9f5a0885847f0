//! Path-prefix include/exclude filtering, applied once per (re)index.

use crate::config::{ConfigError, ConfigResult};

/// Resolved to the active file's directory before filtering
pub const CURRENT_DIR_PLACEHOLDER: &str = "<current_dir>";

/// A validated list of raw path-prefix patterns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPatterns {
    raw: Vec<String>,
}

impl PathPatterns {
    /// Reject blank patterns and placeholders other than `<current_dir>`
    pub fn parse(patterns: &[String]) -> ConfigResult<Self> {
        for pattern in patterns {
            if pattern.trim().is_empty() {
                return Err(ConfigError::MalformedPattern { pattern: pattern.clone(), reason: "blank pattern" });
            }
            let rest = pattern.replace(CURRENT_DIR_PLACEHOLDER, "");
            if let Some(open) = rest.find('<') {
                if rest[open..].contains('>') {
                    return Err(ConfigError::MalformedPattern {
                        pattern: pattern.clone(),
                        reason: "unknown placeholder",
                    });
                }
            }
        }
        Ok(Self { raw: patterns.to_vec() })
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Substitute `<current_dir>` with `current_dir`
    pub fn resolve(&self, current_dir: &str) -> Vec<String> {
        self.raw.iter().map(|p| p.replace(CURRENT_DIR_PLACEHOLDER, current_dir)).collect()
    }
}

/// Directory of the active file: `Projects/x.md` -> `Projects`.
/// Root-level files and no active file both resolve to the empty string.
pub fn current_dir_of(active_path: Option<&str>) -> &str {
    active_path.and_then(|p| p.rsplit_once('/')).map_or("", |(dir, _)| dir)
}

/// Whether `path` passes the include/exclude prefix rules
pub fn passes(path: &str, include: &[String], exclude: &[String]) -> bool {
    (include.is_empty() || include.iter().any(|p| path.starts_with(p.as_str())))
        && !exclude.iter().any(|p| path.starts_with(p.as_str()))
}

/// Keep items whose path passes. Order is preserved.
pub fn prefilter<T, F>(items: Vec<T>, include: &[String], exclude: &[String], path_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if include.is_empty() && exclude.is_empty() {
        return items;
    }
    items.into_iter().filter(|item| passes(path_of(item), include, exclude)).collect()
}
