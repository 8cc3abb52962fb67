use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{join_all, BoxFuture};

use crate::config::HydrationConfig;
use crate::error::Result;
use crate::symbol::{normalize_symbol, prepare_batch};

use super::state::{HydrationSnapshot, ResolutionState, SparkSeries};
use super::{ensure_concurrency_limit, SERIES_CONCURRENCY_LIMIT, WATCHLIST_BATCH_CAP};

/// Injected capability that retrieves the close series for one symbol.
///
/// `Ok(None)` signals "no usable series" (upstream said no, or returned fewer
/// than two points); an `Err` is any transport or decode failure. The
/// hydrator treats both the same way and never lets either abort a pass.
pub trait SeriesFetch: Send + Sync {
    fn fetch_series<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Option<SparkSeries>>>;
}

/// Counters describing one hydration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    /// Generation id of this pass; unchanged when nothing needed fetching.
    pub generation: u64,
    /// Symbols the pass dispatched fetches for.
    pub attempted: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Results that arrived after a newer pass superseded this one.
    pub stale_dropped: usize,
}

struct HydrateState {
    generation: u64,
    status: HashMap<String, ResolutionState>,
    series: HashMap<String, SparkSeries>,
}

enum Applied {
    Resolved,
    Failed,
    Stale,
}

/// Fetches watchlist sparkline series with bounded concurrency while exposing
/// a shared progress counter for the UI.
///
/// The status and series maps are the sole observable effect: the rendering
/// layer reads them (via [`HydrationSnapshot`]) to decide between a drawn
/// sparkline, a loading placeholder, and an "unavailable" fallback. Results
/// belonging to a superseded generation are dropped at store time, so a slow
/// first refresh can never clobber a fast second one.
pub struct SeriesHydrator {
    fetcher: Arc<dyn SeriesFetch>,
    concurrency_limit: usize,
    batch_cap: usize,
    retry_failed: bool,
    state: Mutex<HydrateState>,
    progress_counter: Arc<AtomicUsize>,
}

impl SeriesHydrator {
    pub fn new(fetcher: Arc<dyn SeriesFetch>) -> Self {
        Self::with_limits(fetcher, SERIES_CONCURRENCY_LIMIT, WATCHLIST_BATCH_CAP, true)
    }

    pub fn with_config(fetcher: Arc<dyn SeriesFetch>, config: &HydrationConfig) -> Self {
        Self::with_limits(
            fetcher,
            config.concurrency,
            config.batch_cap,
            config.retry_failed,
        )
    }

    fn with_limits(
        fetcher: Arc<dyn SeriesFetch>,
        concurrency_limit: usize,
        batch_cap: usize,
        retry_failed: bool,
    ) -> Self {
        Self {
            fetcher,
            concurrency_limit: ensure_concurrency_limit(concurrency_limit),
            batch_cap: batch_cap.max(1),
            retry_failed,
            state: Mutex::new(HydrateState {
                generation: 0,
                status: HashMap::new(),
                series: HashMap::new(),
            }),
            progress_counter: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hydrate the requested symbols, reusing anything already resolved.
    ///
    /// The call settles once every worker loop has drained the needed subset;
    /// callers may read [`SeriesHydrator::snapshot`] while it is in flight to
    /// render progressively. Per-symbol failures are absorbed into the status
    /// map, so this never returns an error.
    pub async fn hydrate<S: AsRef<str> + Sync>(&self, requested: &[S]) -> HydrationReport {
        let batch = prepare_batch(requested, self.batch_cap);

        let (generation, needed) = {
            let mut state = self.state.lock().unwrap();
            let needed: Vec<String> = batch
                .into_iter()
                .filter(|symbol| match state.status.get(symbol) {
                    Some(ResolutionState::Resolved) => false,
                    Some(ResolutionState::Failed) => self.retry_failed,
                    // Pending entries belong to a superseded pass; their late
                    // results will be dropped, so claim them again.
                    Some(ResolutionState::Pending) | Some(ResolutionState::Unresolved) | None => {
                        true
                    }
                })
                .collect();

            if needed.is_empty() {
                return HydrationReport {
                    generation: state.generation,
                    ..HydrationReport::default()
                };
            }

            state.generation += 1;
            for symbol in &needed {
                state.status.insert(symbol.clone(), ResolutionState::Pending);
            }
            (state.generation, needed)
        };

        self.progress_counter.store(0, Ordering::SeqCst);

        let attempted = needed.len();
        let queue = Arc::new(needed);
        let cursor = Arc::new(AtomicUsize::new(0));
        let workers = self.concurrency_limit.min(queue.len());

        // Worker loops share a claim cursor instead of pre-partitioning the
        // queue, so a slow symbol never starves the rest of the batch.
        let loops = (0..workers).map(|_| {
            let queue = Arc::clone(&queue);
            let cursor = Arc::clone(&cursor);
            let progress_counter = Arc::clone(&self.progress_counter);
            let this = self;
            async move {
                let mut resolved = 0usize;
                let mut failed = 0usize;
                let mut stale = 0usize;
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(symbol) = queue.get(index) else {
                        break;
                    };
                    let result = this.fetcher.fetch_series(symbol).await;
                    progress_counter.fetch_add(1, Ordering::SeqCst);
                    match this.apply_result(generation, symbol, result) {
                        Applied::Resolved => resolved += 1,
                        Applied::Failed => failed += 1,
                        Applied::Stale => stale += 1,
                    }
                }
                (resolved, failed, stale)
            }
        });

        let tallies = join_all(loops).await;

        let mut report = HydrationReport {
            generation,
            attempted,
            ..HydrationReport::default()
        };
        for (resolved, failed, stale) in tallies {
            report.resolved += resolved;
            report.failed += failed;
            report.stale_dropped += stale;
        }
        report
    }

    fn apply_result(
        &self,
        generation: u64,
        symbol: &str,
        result: Result<Option<SparkSeries>>,
    ) -> Applied {
        let mut state = self.state.lock().unwrap();

        if state.generation != generation {
            log::debug!(
                "dropping stale series for {} (pass {} superseded by {})",
                symbol,
                generation,
                state.generation
            );
            return Applied::Stale;
        }

        match result {
            Ok(Some(series)) if series.is_usable() => {
                state.series.insert(symbol.to_string(), series);
                state
                    .status
                    .insert(symbol.to_string(), ResolutionState::Resolved);
                Applied::Resolved
            }
            Ok(_) => {
                state
                    .status
                    .insert(symbol.to_string(), ResolutionState::Failed);
                Applied::Failed
            }
            Err(err) => {
                log::debug!("series fetch failed for {}: {}", symbol, err);
                state
                    .status
                    .insert(symbol.to_string(), ResolutionState::Failed);
                Applied::Failed
            }
        }
    }

    /// Consistent copy of the status and series maps.
    pub fn snapshot(&self) -> HydrationSnapshot {
        let state = self.state.lock().unwrap();
        HydrationSnapshot {
            status: state.status.clone(),
            series: state.series.clone(),
        }
    }

    pub fn status_of(&self, symbol: &str) -> ResolutionState {
        let normalized = normalize_symbol(symbol);
        self.state
            .lock()
            .unwrap()
            .status
            .get(&normalized)
            .copied()
            .unwrap_or(ResolutionState::Unresolved)
    }

    pub fn series_for(&self, symbol: &str) -> Option<SparkSeries> {
        let normalized = normalize_symbol(symbol);
        self.state.lock().unwrap().series.get(&normalized).cloned()
    }

    /// Fetches completed in the current pass; UI polls this between frames.
    pub fn progress(&self) -> usize {
        self.progress_counter.load(Ordering::SeqCst)
    }

    pub fn progress_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.progress_counter)
    }

    /// Forget everything; the next pass starts from a cold cache.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.status.clear();
        state.series.clear();
    }
}
