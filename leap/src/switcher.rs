//! QuickSwitcher - Main API for host interop, designed for UniFFI export.
//!
//! Async Cancellation Architecture:
//! Every query is admitted by the `QueryScheduler`, which hands out a ticket and
//! a CancellationToken. A newer query cancels the older token; the debounce
//! timer and the blocking evaluation both watch it and stop early. When the host
//! cancels its async Task, UniFFI drops the Rust Future and a DropGuard cancels
//! the same token and hands the ticket back to the scheduler.
//!
//! Only an evaluation whose token is still live may install a re-indexed
//! snapshot, so a superseded query never changes the mode later queries see.

use crate::candidate::Candidate;
use crate::config::{SearchMode, Settings};
use crate::indexer::{build_snapshot, CorpusSnapshot};
use crate::interface::{InputStatus, NoteHost, RankedItem, SuggestionResult, SwitcherError};
use crate::links::build_backlink_map;
use crate::ranking::{recency_map, Classified};
use crate::scheduler::{Admission, QueryScheduler, Ticket};
use crate::search::{classify, tokenize_query};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Global fallback Tokio runtime for when async functions are called outside any runtime context.
/// Shared across all QuickSwitcher instances and never dropped.
/// Used by UniFFI which doesn't provide a tokio runtime.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

static RAYON_INIT: Once = Once::new();

/// Initialize global Rayon thread pool with core reservation and lower priority
fn init_rayon() {
    RAYON_INIT.call_once(|| {
        let num_threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);

        // Reserve 2 cores for Tokio timers and the host's calls, but use at least 1 thread.
        let rayon_threads = num_threads.saturating_sub(2).max(1);

        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(rayon_threads)
            .thread_name(|i| format!("leap-rayon-{}", i))
            .start_handler(|_| {
                use thread_priority::*;
                let _ = set_current_thread_priority(ThreadPriority::Min);
            })
            .build_global();
    });
}

/// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
fn runtime_handle() -> tokio::runtime::Handle {
    tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
}

/// RAII guard that cancels a token when dropped.
/// When the host cancels an async Task, UniFFI drops the Future, which drops this guard,
/// which triggers the cancellation token. A ticket that is still current is
/// abandoned so the scheduler does not stay `Pending` or `Evaluating` forever.
struct DropGuard<'a> {
    token: CancellationToken,
    scheduler: &'a Mutex<QueryScheduler>,
    ticket: Ticket,
}

impl<'a> DropGuard<'a> {
    fn new(token: CancellationToken, scheduler: &'a Mutex<QueryScheduler>, ticket: Ticket) -> Self {
        Self { token, scheduler, ticket }
    }
}

impl Drop for DropGuard<'_> {
    fn drop(&mut self) {
        self.token.cancel();
        self.scheduler.lock().abandon(self.ticket);
    }
}

/// A JoinError means the task never produced a result
fn joined<T>(result: Result<T, tokio::task::JoinError>) -> Result<T, SwitcherError> {
    result.map_err(|_| SwitcherError::Cancelled)
}

/// Query evaluation over the current corpus snapshot. Shared with blocking tasks.
struct SwitcherCore {
    host: Arc<dyn NoteHost>,
    settings: Settings,
    initial_mode: usize,
    snapshot: RwLock<Arc<CorpusSnapshot>>,
}

impl SwitcherCore {
    fn current(&self) -> Arc<CorpusSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Build a snapshot for `mode_index` and install it unless `token` was
    /// cancelled meanwhile. A cancelled caller still gets the snapshot it built.
    fn reindex(&self, mode_index: usize, token: &CancellationToken) -> Result<Arc<CorpusSnapshot>, SwitcherError> {
        let fresh = Arc::new(build_snapshot(self.host.as_ref(), &self.settings, mode_index)?);
        // A newer query cancels this token before reading the slot
        let mut slot = self.snapshot.write();
        if token.is_cancelled() {
            tracing::debug!(mode = %fresh.mode.name, "discarding snapshot from superseded query");
        } else {
            *slot = Arc::clone(&fresh);
        }
        Ok(fresh)
    }

    /// Snapshot for the mode `query` selects: the mode whose prefix it starts
    /// with, otherwise the initial mode. Re-indexes when that differs from the current one.
    fn snapshot_for(&self, query: &str, token: &CancellationToken) -> Result<Arc<CorpusSnapshot>, SwitcherError> {
        let target = self.settings.mode_for_prefix(query).unwrap_or(self.initial_mode);
        let current = self.current();
        if current.mode_index == target {
            return Ok(current);
        }
        tracing::debug!(from = %current.mode.name, to = %self.settings.search_modes[target].name, "switching mode");
        self.reindex(target, token)
    }

    fn evaluate(&self, query: &str, token: &CancellationToken) -> Result<SuggestionResult, SwitcherError> {
        if token.is_cancelled() {
            return Err(SwitcherError::Cancelled);
        }
        let start = Instant::now();
        let recency = recency_map(&self.host.last_opened_paths());
        let snapshot = self.snapshot_for(query, token)?;
        let mode = &snapshot.mode;
        let search_query = effective_query(mode, query);

        let (rows, total_count) = if mode.is_backlink_search {
            self.backlink_rows(&snapshot)
        } else if search_query.trim().is_empty() {
            let mut ranked: Vec<Classified<'_>> =
                snapshot.candidates.iter().map(|c| Classified::new(c, Vec::new())).collect();
            snapshot.no_query_plan.sort(&mut ranked, &recency);
            self.to_rows(ranked)
        } else {
            let tokens = tokenize_query(&search_query, self.settings.normalize_accents);
            let fields = mode.search_by;
            let span_factor = self.settings.fuzzy_span_factor;

            use rayon::prelude::*;
            let mut ranked: Vec<Classified<'_>> = snapshot
                .candidates
                .par_iter()
                .filter_map(|c| {
                    if token.is_cancelled() {
                        return None;
                    }
                    classify(c, &tokens, fields, span_factor).map(|results| Classified::new(c, results))
                })
                .collect();
            if token.is_cancelled() {
                return Err(SwitcherError::Cancelled);
            }
            snapshot.plan.sort(&mut ranked, &recency);
            self.to_rows(ranked)
        };

        perf_log!(
            self.settings.log_performance,
            mode = %mode.name,
            query_len = search_query.chars().count(),
            candidates = snapshot.len(),
            matched = total_count,
            latency_ms = start.elapsed().as_millis() as u64,
            snapshot_age_ms = snapshot.age().num_milliseconds(),
            "evaluated query"
        );

        Ok(SuggestionResult {
            items: rows,
            total_count,
            mode_name: mode.name.clone(),
            search_query,
        })
    }

    fn to_rows(&self, ranked: Vec<Classified<'_>>) -> (Vec<RankedItem>, u64) {
        let total = ranked.len() as u64;
        let rows = ranked
            .into_iter()
            .take(self.settings.max_suggestions as usize)
            .enumerate()
            .map(|(order, c)| c.candidate.item().to_ranked_item(c.results, order as u32, None))
            .collect();
        (rows, total)
    }

    /// Items linking to the snapshot's active file, in corpus order. No field matching.
    fn backlink_rows(&self, snapshot: &CorpusSnapshot) -> (Vec<RankedItem>, u64) {
        // The file excluded at index time is the backlink target, until the next refresh
        let Some(active) = snapshot.active_file.as_ref() else {
            return (Vec::new(), 0);
        };
        let backlinks = build_backlink_map(&self.host.resolved_links());
        let Some(sources) = backlinks.get(active) else {
            return (Vec::new(), 0);
        };

        let hits: Vec<&Candidate> = snapshot.candidates.iter().filter(|c| sources.contains(c.id())).collect();
        let total = hits.len() as u64;
        let rows = hits
            .into_iter()
            .take(self.settings.max_suggestions as usize)
            .enumerate()
            .map(|(order, c)| {
                let offset = self.host.first_link_offset(c.id().to_string(), active.clone());
                c.item().to_ranked_item(Vec::new(), order as u32, offset)
            })
            .collect();
        (rows, total)
    }
}

/// Query as typed -> query to match: strip the mode's prefix, prepend its default input
fn effective_query(mode: &SearchMode, query: &str) -> String {
    let stripped = if mode.command_prefix.is_empty() {
        query
    } else {
        query.strip_prefix(mode.command_prefix.as_str()).unwrap_or(query)
    };
    format!("{}{}", mode.default_input, stripped)
}

/// Thread-safe quick switcher over a host-provided note corpus
///
/// Concurrency Model:
/// - The corpus is an immutable `Arc<CorpusSnapshot>`, swapped atomically on mode switch
/// - Debounce timers run on the current tokio runtime or the global FALLBACK_RUNTIME
/// - Per-item classification fans out over the global rayon pool
#[derive(uniffi::Object)]
pub struct QuickSwitcher {
    core: Arc<SwitcherCore>,
    scheduler: Mutex<QueryScheduler>,
}

// Internal implementation (not exported via FFI)
impl QuickSwitcher {
    fn build(host: Arc<dyn NoteHost>, settings: Settings, initial_mode: Option<String>) -> Result<Self, SwitcherError> {
        init_rayon();
        settings.validate()?;
        let initial = match initial_mode {
            Some(name) => settings.mode_index(&name)?,
            None => 0,
        };
        let snapshot = build_snapshot(host.as_ref(), &settings, initial)?;
        let scheduler = QueryScheduler::new(Duration::from_millis(settings.search_delay_ms), settings.leading_edge_search);

        Ok(Self {
            core: Arc::new(SwitcherCore {
                host,
                settings,
                initial_mode: initial,
                snapshot: RwLock::new(Arc::new(snapshot)),
            }),
            scheduler: Mutex::new(scheduler),
        })
    }

    /// Wait out the debounce for a deferred admission. False when superseded.
    async fn wait_for_deadline(&self, admission: &Admission) -> Result<bool, SwitcherError> {
        let Admission::Deferred { ticket, deadline, cancel } = admission else {
            return Ok(true);
        };
        let deadline = tokio::time::Instant::from_std(*deadline);
        let cancel = cancel.clone();

        // Spawned so the timer has a runtime even when the caller has none
        let timer = runtime_handle().spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => true,
                _ = cancel.cancelled() => false,
            }
        });
        let elapsed = joined(timer.await)?;
        Ok(elapsed && self.scheduler.lock().fire(*ticket))
    }
}

// FFI-exported constructors (must be in standalone impl block)
#[uniffi::export]
impl QuickSwitcher {
    /// Create a switcher. Settings are validated and the initial mode is indexed.
    #[uniffi::constructor]
    pub fn new(
        host: Arc<dyn NoteHost>,
        settings: Settings,
        initial_mode: Option<String>,
    ) -> Result<Self, SwitcherError> {
        Self::build(host, settings, initial_mode)
    }

    /// Create a switcher from host-provided settings JSON
    #[uniffi::constructor]
    pub fn from_json(
        host: Arc<dyn NoteHost>,
        settings_json: String,
        initial_mode: Option<String>,
    ) -> Result<Self, SwitcherError> {
        Self::build(host, Settings::from_json(&settings_json)?, initial_mode)
    }
}

#[uniffi::export]
impl QuickSwitcher {
    /// Suggestions for `query`.
    ///
    /// Empty queries and the mode's default input resolve immediately. Anything
    /// else waits out `search_delay_ms`; when a newer query arrives first, this
    /// call resolves to `SwitcherError::Superseded`.
    pub async fn get_suggestions(&self, query: String) -> Result<SuggestionResult, SwitcherError> {
        let immediate = query.is_empty() || query == self.core.current().mode.default_input;
        let admission = {
            let mut scheduler = self.scheduler.lock();
            if immediate {
                scheduler.submit_immediate(&query, Instant::now())
            } else {
                scheduler.submit(&query, Instant::now())
            }
        };
        let ticket = admission.ticket();
        let token = admission.cancel_token().clone();
        let _guard = DropGuard::new(token.clone(), &self.scheduler, ticket);

        let result = match admission {
            Admission::Immediate { .. } => self.core.evaluate(&query, &token),
            Admission::Deferred { .. } => {
                if !self.wait_for_deadline(&admission).await? {
                    return Err(SwitcherError::Superseded);
                }
                let core = Arc::clone(&self.core);
                let token_clone = token.clone();

                // runtime.spawn_blocking() rather than tokio::task::spawn_blocking():
                // UniFFI callers have no ambient runtime
                let handle = runtime_handle().spawn_blocking(move || core.evaluate(&query, &token_clone));
                joined(handle.await).and_then(|result| result)
            }
        };

        let delivered = self.scheduler.lock().complete(ticket);
        if !delivered {
            return Err(SwitcherError::Superseded);
        }
        result
    }

    /// Evaluate `query` right away, bypassing the debounce
    pub fn evaluate(&self, query: String) -> Result<SuggestionResult, SwitcherError> {
        self.core.evaluate(&query, &CancellationToken::new())
    }

    /// Re-index the current mode, picking up host changes
    pub fn refresh(&self) -> Result<(), SwitcherError> {
        let replaced = self.core.current();
        self.core.reindex(replaced.mode_index, &CancellationToken::new())?;
        tracing::debug!(
            mode = %replaced.mode.name,
            replaced_age_ms = replaced.age().num_milliseconds(),
            "refreshed snapshot"
        );
        Ok(())
    }

    /// Name of the mode the current snapshot was built for
    pub fn current_mode(&self) -> String {
        self.core.current().mode.name.clone()
    }

    /// Status line for the current mode
    pub fn input_status(&self, search_query: String) -> InputStatus {
        self.core.current().mode.input_status(&search_query)
    }
}

/// Status-line metadata for `mode`. Pure: never touches matching state.
#[uniffi::export]
pub fn render_input(mode: SearchMode, search_query: String) -> InputStatus {
    mode.input_status(&search_query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;
    use crate::interface::{MatchField, MatchType, RawNote, ResolvedLink};
    use std::sync::mpsc;

    fn note(path: &str, name: &str) -> RawNote {
        RawNote { path: path.into(), display_name: name.into(), ..RawNote::default() }
    }

    fn host() -> Arc<InMemoryHost> {
        Arc::new(InMemoryHost::new(vec![
            note("Alpha.md", "Alpha"),
            note("Alphabet.md", "Alphabet"),
            note("zAlpha.md", "zAlpha"),
            note("Beta.md", "Beta"),
        ]))
    }

    fn switcher(host: Arc<InMemoryHost>, settings: Settings) -> QuickSwitcher {
        QuickSwitcher::new(host, settings, None).unwrap()
    }

    fn ids(result: &SuggestionResult) -> Vec<&str> {
        result.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_cancellation_token() {
        let scheduler = Mutex::new(QueryScheduler::new(Duration::from_millis(100), false));
        let admission = scheduler.lock().submit("a", Instant::now());
        let token = admission.cancel_token().clone();
        assert!(!token.is_cancelled());

        let guard = DropGuard::new(token.clone(), &scheduler, admission.ticket());
        assert!(!token.is_cancelled());

        drop(guard);
        assert!(token.is_cancelled());
        assert_eq!(scheduler.lock().state(), &crate::scheduler::SchedulerState::Idle);
    }

    /// Host whose first `last_opened_paths` call parks until released
    struct GatedHost {
        inner: Arc<InMemoryHost>,
        gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
    }

    impl NoteHost for GatedHost {
        fn notes(&self) -> Vec<RawNote> {
            self.inner.notes()
        }

        fn active_file_path(&self) -> Option<String> {
            self.inner.active_file_path()
        }

        fn last_opened_paths(&self) -> Vec<String> {
            let gate = self.gate.lock().take();
            if let Some((entered, release)) = gate {
                let _ = entered.send(());
                let _ = release.recv();
            }
            self.inner.last_opened_paths()
        }

        fn resolved_links(&self) -> Vec<ResolvedLink> {
            self.inner.resolved_links()
        }

        fn unresolved_link_targets(&self) -> Vec<String> {
            self.inner.unresolved_link_targets()
        }

        fn first_link_offset(&self, source_path: String, target_path: String) -> Option<u64> {
            self.inner.first_link_offset(source_path, target_path)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_superseded_evaluation_keeps_newer_snapshot() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gated = GatedHost { inner: host(), gate: Mutex::new(Some((entered_tx, release_rx))) };
        let settings = Settings { search_delay_ms: 10, ..Settings::default() };
        let s = Arc::new(QuickSwitcher::new(Arc::new(gated), settings, None).unwrap());

        let stale = tokio::spawn({
            let s = Arc::clone(&s);
            async move { s.get_suggestions(":f alpha".into()).await }
        });
        // Wait until the file-name query is parked inside its evaluation
        tokio::task::spawn_blocking(move || entered_rx.recv()).await.unwrap().unwrap();

        let fresh = s.get_suggestions(String::new()).await.unwrap();
        assert_eq!(fresh.mode_name, "Recent search");

        release_tx.send(()).unwrap();
        assert!(matches!(stale.await.unwrap(), Err(SwitcherError::Superseded)));
        assert_eq!(s.current_mode(), "Recent search");
        assert_eq!(s.input_status(String::new()).label, "Recent search ... ");
    }

    #[test]
    fn test_cancelled_reindex_is_not_installed() {
        let s = switcher(host(), Settings::default());
        let token = CancellationToken::new();
        token.cancel();
        let built = s.core.reindex(1, &token).unwrap();
        assert_eq!(built.mode.name, "File name search");
        assert_eq!(s.current_mode(), "Recent search");
    }

    #[tokio::test]
    async fn test_join_error_maps_to_cancelled() {
        let task = tokio::spawn(std::future::pending::<bool>());
        task.abort();
        let err = task.await.unwrap_err();
        assert!(matches!(joined(Err::<bool, _>(err)), Err(SwitcherError::Cancelled)));
        assert!(matches!(joined::<bool>(Ok(true)), Ok(true)));
    }

    #[test]
    fn test_strength_ordering_in_file_name_mode() {
        let s = switcher(host(), Settings::default());
        let result = s.evaluate(":f alpha".into()).unwrap();
        assert_eq!(s.current_mode(), "File name search");
        assert_eq!(ids(&result), vec!["Alpha.md", "Alphabet.md", "zAlpha.md"]);
        assert_eq!(result.items[0].match_results[0].match_type, MatchType::Exact);
        assert_eq!(result.items[2].match_results[0].match_type, MatchType::Fuzzy);
        assert_eq!(result.search_query, "alpha");
    }

    #[test]
    fn test_order_is_zero_based_and_contiguous() {
        let s = switcher(host(), Settings::default());
        let result = s.evaluate(":f a".into()).unwrap();
        let orders: Vec<u32> = result.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, (0..result.items.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_truncation_reports_total_count() {
        let settings = Settings { max_suggestions: 2, ..Settings::default() };
        let s = switcher(host(), settings);
        let result = s.evaluate(":f alpha".into()).unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn test_no_query_path_has_no_match_results() {
        let host = host();
        host.set_last_opened(&["Beta.md", "zAlpha.md"]);
        let s = switcher(host, Settings::default());
        let result = s.evaluate(String::new()).unwrap();
        assert_eq!(result.total_count, 4);
        assert!(result.items.iter().all(|i| i.match_results.is_empty()));
        // Recent search: name-match is dropped, last-opened applies
        assert_eq!(&ids(&result)[..2], &["Beta.md", "zAlpha.md"]);
    }

    #[test]
    fn test_mode_switch_and_return_to_initial() {
        let s = switcher(host(), Settings::default());
        assert_eq!(s.current_mode(), "Recent search");
        s.evaluate(":s beta".into()).unwrap();
        assert_eq!(s.current_mode(), "Landmark search");
        s.evaluate("beta".into()).unwrap();
        assert_eq!(s.current_mode(), "Recent search");
    }

    #[test]
    fn test_initial_mode_by_name() {
        let s = QuickSwitcher::new(host(), Settings::default(), Some("File name search".into())).unwrap();
        assert_eq!(s.current_mode(), "File name search");
        // No prefix keeps the initial mode
        s.evaluate("alpha".into()).unwrap();
        assert_eq!(s.current_mode(), "File name search");
    }

    #[test]
    fn test_unknown_initial_mode_fails() {
        let err = QuickSwitcher::new(host(), Settings::default(), Some("Nope".into())).err().unwrap();
        assert!(matches!(err, SwitcherError::Config(_)));
    }

    #[test]
    fn test_invalid_settings_fail_construction() {
        let mut settings = Settings::default();
        settings.search_modes[1].sort_priorities.push("popularity".into());
        assert!(matches!(QuickSwitcher::new(host(), settings, None), Err(SwitcherError::Config(_))));
    }

    #[test]
    fn test_default_input_is_prepended() {
        let mut settings = Settings::default();
        settings.search_modes[1].default_input = "alp".into();
        let s = switcher(host(), settings);
        let result = s.evaluate(":f ".into()).unwrap();
        assert_eq!(result.search_query, "alp");
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn test_backlink_search() {
        let host = host();
        host.add_link("Alpha.md", "Beta.md", 12);
        host.add_link("zAlpha.md", "Beta.md", 3);
        host.add_link("Alphabet.md", "Alpha.md", 1);

        let s = switcher(Arc::clone(&host), Settings::default());
        // No active file: empty, not an error
        let result = s.evaluate(":b ".into()).unwrap();
        assert!(result.items.is_empty());

        host.set_active_file(Some("Beta.md"));
        s.refresh().unwrap();
        let result = s.evaluate(":b ignored words".into()).unwrap();
        assert_eq!(ids(&result), vec!["Alpha.md", "zAlpha.md"]);
        assert_eq!(result.items[0].link_offset, Some(12));
        assert_eq!(result.items[1].link_offset, Some(3));
        assert!(result.items[0].match_results.is_empty());
    }

    #[test]
    fn test_backlinks_follow_indexed_active_file() {
        let host = host();
        host.add_link("Alpha.md", "Beta.md", 12);
        host.add_link("Beta.md", "Alpha.md", 4);
        host.set_active_file(Some("Beta.md"));
        let s = switcher(Arc::clone(&host), Settings::default());
        s.evaluate(":b ".into()).unwrap();

        // Switching files without a refresh keeps the indexed target and exclusion
        host.set_active_file(Some("Alpha.md"));
        let result = s.evaluate(":b ".into()).unwrap();
        assert_eq!(ids(&result), vec!["Alpha.md"]);
        assert_eq!(result.items[0].link_offset, Some(12));

        s.refresh().unwrap();
        let result = s.evaluate(":b ".into()).unwrap();
        assert_eq!(ids(&result), vec!["Beta.md"]);
        assert_eq!(result.items[0].link_offset, Some(4));
    }

    #[test]
    fn test_landmark_mode_matches_tags() {
        let host = Arc::new(InMemoryHost::new(vec![
            RawNote { tags: vec!["#recipe".into()], ..note("Soup.md", "Soup") },
            note("Recipes index.md", "Recipes index"),
        ]));
        let s = switcher(host, Settings::default());
        let result = s.evaluate(":s #recipe".into()).unwrap();
        assert_eq!(ids(&result), vec!["Soup.md"]);
        assert_eq!(result.items[0].match_results[0].field, MatchField::Tag);
    }

    #[test]
    fn test_precancelled_token_returns_cancelled() {
        let s = switcher(host(), Settings::default());
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(s.core.evaluate("alpha", &token), Err(SwitcherError::Cancelled)));
    }

    #[test]
    fn test_effective_query() {
        let settings = Settings::default();
        assert_eq!(effective_query(&settings.search_modes[1], ":f hello"), "hello");
        assert_eq!(effective_query(&settings.search_modes[0], "hello"), "hello");
        let mode = SearchMode { default_input: "#todo ".into(), ..settings.search_modes[1].clone() };
        assert_eq!(effective_query(&mode, ":f urgent"), "#todo urgent");
    }

    #[test]
    fn test_render_input() {
        let settings = Settings::default();
        let status = render_input(settings.search_modes[3].clone(), String::new());
        assert!(status.is_backlink_search);
        assert_eq!(status.label, "Backlink search");
    }

    #[tokio::test]
    async fn test_get_suggestions_immediate_path() {
        let settings = Settings { search_delay_ms: 10_000, ..Settings::default() };
        let s = switcher(host(), settings);
        // Empty query never waits for the (very long) delay
        let result = s.get_suggestions(String::new()).await.unwrap();
        assert_eq!(result.total_count, 4);
    }

    #[tokio::test]
    async fn test_get_suggestions_debounced_supersession() {
        let settings = Settings { search_delay_ms: 50, ..Settings::default() };
        let s = switcher(host(), settings);

        let (first, second) = tokio::join!(s.get_suggestions(":f a".into()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            s.get_suggestions(":f alphab".into()).await
        });
        assert!(matches!(first, Err(SwitcherError::Superseded)));
        let second = second.unwrap();
        assert_eq!(ids(&second), vec!["Alphabet.md"]);
    }

    #[tokio::test]
    async fn test_async_cancellation_via_drop() {
        let settings = Settings { search_delay_ms: 20, ..Settings::default() };
        let s = switcher(host(), settings);

        let future = s.get_suggestions(":f alpha".into());
        drop(future);

        // A fresh query still completes normally
        let result = s.get_suggestions(":f alpha".into()).await.unwrap();
        assert_eq!(result.total_count, 3);
    }
}
