pub mod hydrator;
pub mod state;

pub use hydrator::{HydrationReport, SeriesFetch, SeriesHydrator};
pub use state::{HydrationSnapshot, ResolutionState, SparkSeries};

/// Default concurrency guard applied when issuing series requests.
pub const SERIES_CONCURRENCY_LIMIT: usize = 2;

/// Maximum distinct symbols hydrated per pass, to bound backend load.
pub const WATCHLIST_BATCH_CAP: usize = 10;

/// A series needs at least this many samples to draw a sparkline.
pub const MIN_SERIES_SAMPLES: usize = 2;

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
