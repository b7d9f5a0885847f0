//! Leap Core - Rust search engine for a note-taking quick switcher
//!
//! This library matches, ranks and debounces quick-switcher queries over a
//! corpus of notes supplied by the host application through `NoteHost`.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

/// Timing event at `info` when performance logging is on, `debug` otherwise
macro_rules! perf_log {
    ($loud:expr, $($arg:tt)+) => {
        if $loud {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

pub mod candidate;
pub mod config;
pub mod host;
mod indexer;
pub mod interface;
pub mod links;
pub mod matcher;
pub mod models;
pub mod prefilter;
pub mod ranking;
pub mod scheduler;
pub mod search;
mod switcher;

pub use config::{ConfigError, SearchFields, SearchMode, Settings};
pub use host::InMemoryHost;
pub use interface::*;
pub use switcher::{render_input, QuickSwitcher};

uniffi::setup_scaffolding!("leap");
