// src/activity/sparkline.rs
use serde::Serialize;

use super::ActivitySeries;

/// Smallest bar height, so zero weeks stay visible.
pub const MIN_BAR_PX: u32 = 2;
pub const MAX_BAR_PX: u32 = 28;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub height_px: u32,
    pub total: u64,
    pub title: String,
}

/// Bar heights normalized to the busiest week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sparkline {
    pub bars: Vec<Bar>,
}

impl Sparkline {
    pub fn from_series(series: &ActivitySeries) -> Self {
        Self::from_totals(&series.totals().collect::<Vec<_>>())
    }

    pub fn from_totals(totals: &[u64]) -> Self {
        let max = totals.iter().copied().max().unwrap_or(0).max(1);
        let bars = totals
            .iter()
            .map(|&total| {
                let scaled = (total as f64 / max as f64 * MAX_BAR_PX as f64).round() as u32;
                Bar {
                    height_px: scaled.max(MIN_BAR_PX),
                    total,
                    title: format!("{total} commits"),
                }
            })
            .collect();
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
