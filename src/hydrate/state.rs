use std::collections::HashMap;

use super::MIN_SERIES_SAMPLES;

/// Per-symbol hydration status as seen by the rendering layer.
///
/// `Unresolved` is the implicit state for symbols the hydrator has never
/// touched; `Pending` means a fetch is dispatched, `Resolved` that a usable
/// series is stored, `Failed` that the fetch errored or returned nothing
/// drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Pending,
    Resolved,
    Failed,
}

/// Ordered close prices backing one watchlist sparkline. Immutable once
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SparkSeries {
    closes: Vec<f64>,
}

impl SparkSeries {
    pub fn new(closes: Vec<f64>) -> Self {
        Self { closes }
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// A series with fewer than two samples cannot be drawn.
    pub fn is_usable(&self) -> bool {
        self.closes.len() >= MIN_SERIES_SAMPLES
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// First-to-last percent change, used for the sparkline caption.
    pub fn percent_change(&self) -> Option<f64> {
        let first = self.closes.first().copied()?;
        let last = self.closes.last().copied()?;
        if first.abs() <= f64::EPSILON {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

/// Point-in-time copy of the hydrator's maps, safe to hand to a renderer
/// while fetches are still in flight.
#[derive(Debug, Clone, Default)]
pub struct HydrationSnapshot {
    pub status: HashMap<String, ResolutionState>,
    pub series: HashMap<String, SparkSeries>,
}

impl HydrationSnapshot {
    pub fn status_of(&self, symbol: &str) -> ResolutionState {
        self.status
            .get(symbol)
            .copied()
            .unwrap_or(ResolutionState::Unresolved)
    }

    pub fn series_for(&self, symbol: &str) -> Option<&SparkSeries> {
        self.series.get(symbol)
    }
}
