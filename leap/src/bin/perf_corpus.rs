//! Time quick-switcher queries against a synthetic vault.
//!
//! Builds an in-memory corpus of notes with aliases, tags, headings and links,
//! then times a set of queries (mode prefixes such as `:f ` included).
//!
//! Usage:
//!     cargo run --release --bin perf-corpus -- --notes 50000 --query "proj alp"
//!
//! Set `RUST_LOG=leap=debug` to see indexing and evaluation events.

use anyhow::{Context, Result};
use clap::Parser;
use leap::{InMemoryHost, QuickSwitcher, RawNote, Settings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of notes to generate
    #[arg(short, long, default_value_t = 20_000)]
    notes: usize,

    /// RNG seed, for reproducible corpora
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Queries to time (repeatable). Defaults to a built-in set.
    #[arg(short, long)]
    query: Vec<String>,

    /// Times each query is evaluated
    #[arg(short, long, default_value_t = 5)]
    repeat: usize,

    /// Settings JSON file; defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Strip accents and diacritics before matching
    #[arg(long)]
    normalize_accents: bool,
}

const WORDS: &[&str] = &[
    "alpha", "project", "meeting", "notes", "weekly", "review", "design", "draft", "ideas", "journal",
    "reading", "list", "café", "über", "garden", "recipe", "budget", "travel", "plan", "archive",
    "research", "paper", "summary", "inbox", "todo", "book", "quote", "retro", "sprint", "roadmap",
];

const FOLDERS: &[&str] = &["Projects", "Daily", "Areas", "Resources", "Archive", "Inbox"];

const TAGS: &[&str] = &["#work", "#home", "#reading", "#idea", "#todo", "#recipe", "#travel"];

const DEFAULT_QUERIES: &[&str] = &["", "alp", "proj rev", ":f weekly", ":s #recipe", ":f zzzz", "cafe"];

fn phrase(rng: &mut StdRng, min: usize, max: usize) -> String {
    let len = rng.gen_range(min..=max);
    (0..len).map(|_| WORDS[rng.gen_range(0..WORDS.len())]).collect::<Vec<_>>().join(" ")
}

fn generate_notes(rng: &mut StdRng, count: usize) -> Vec<RawNote> {
    (0..count)
        .map(|i| {
            let name = format!("{} {}", phrase(rng, 1, 4), i);
            let folder = FOLDERS[rng.gen_range(0..FOLDERS.len())];
            RawNote {
                path: format!("{folder}/{name}.md"),
                display_name: name,
                aliases: (0..rng.gen_range(0..=2)).map(|_| phrase(rng, 1, 3)).collect(),
                tags: (0..rng.gen_range(0..=3)).map(|_| TAGS[rng.gen_range(0..TAGS.len())].to_string()).collect(),
                headings: (0..rng.gen_range(0..=6)).map(|_| phrase(rng, 2, 5)).collect(),
                links: (0..rng.gen_range(0..=4)).map(|_| phrase(rng, 1, 3)).collect(),
                is_starred: rng.gen_bool(0.02),
                modified_at: Some(1_600_000_000 + rng.gen_range(0..100_000_000)),
                created_at: rng.gen_bool(0.9).then(|| 1_500_000_000 + rng.gen_range(0..100_000_000)),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leap=info")))
        .init();

    let args = Args::parse();
    let mut settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Settings::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Settings::default(),
    };
    settings.normalize_accents |= args.normalize_accents;
    settings.log_performance = true;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = Instant::now();
    let notes = generate_notes(&mut rng, args.notes);
    let host = Arc::new(InMemoryHost::new(notes.clone()));

    let recent: Vec<&str> = notes.iter().take(50).map(|n| n.path.as_str()).collect();
    host.set_last_opened(&recent);
    if let Some(active) = notes.first() {
        host.set_active_file(Some(active.path.as_str()));
        for source in notes.iter().skip(1).step_by(97) {
            host.add_link(&source.path, &active.path, rng.gen_range(0..2_000));
        }
    }
    for _ in 0..args.notes / 50 {
        host.add_unresolved(&phrase(&mut rng, 1, 2));
    }
    println!("Generated {} notes in {:?}", args.notes, start.elapsed());

    let switcher = QuickSwitcher::new(host, settings, None).context("building switcher")?;

    let queries: Vec<String> = if args.query.is_empty() {
        DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        args.query.clone()
    };

    println!("{:<16} {:>10} {:>10} {:>12}", "query", "shown", "total", "avg");
    for query in &queries {
        let mut shown = 0;
        let mut total = 0;
        let start = Instant::now();
        for _ in 0..args.repeat.max(1) {
            let result = switcher.evaluate(query.clone()).with_context(|| format!("evaluating {query:?}"))?;
            shown = result.items.len();
            total = result.total_count;
        }
        let avg = start.elapsed() / args.repeat.max(1) as u32;
        println!("{:<16} {:>10} {:>10} {:>12?}", format!("{query:?}"), shown, total, avg);
    }

    Ok(())
}
