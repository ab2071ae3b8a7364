//! Summaries of per-font and per-glyph values across a corpus.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pen::CommandCounts;

/// Names of the outline commands, in [`CommandCounts::to_array`] order.
pub const COMMAND_LABELS: [&str; 5] = ["moveTo", "lineTo", "quadTo", "curveTo", "closePath"];

/// How often each distinct value occurs, ascending by value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountDistribution<T: Ord>(BTreeMap<T, usize>);

impl<T: Ord> CountDistribution<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn add(&mut self, value: T) {
        *self.0.entry(value).or_default() += 1;
    }

    /// Number of values added.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn count(&self, value: &T) -> usize {
        self.0.get(value).copied().unwrap_or(0)
    }

    /// `(value, count)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.0.iter().map(|(value, count)| (value, *count))
    }
}

impl<T: Ord> FromIterator<T> for CountDistribution<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for value in iter {
            distribution.add(value);
        }
        distribution
    }
}

/// A histogram with logarithmically spaced bins.
///
/// Outline lengths are shifted by one before binning so that glyphs without
/// an outline (zero commands) still fall on the log scale.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LogHistogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    /// Number of values per bin.
    pub counts: Vec<usize>,
}

impl LogHistogram {
    /// Bins `values + 1` into `bins` log-spaced bins spanning the observed
    /// range. Empty input or zero bins produce an empty histogram.
    pub fn new(values: &[u32], bins: usize) -> Self {
        if values.is_empty() || bins == 0 {
            return Self::default();
        }
        let shifted = || values.iter().map(|value| *value as f64 + 1.0);
        let min = shifted().fold(f64::INFINITY, f64::min);
        let max = shifted().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = (min.log10(), max.log10());
        let step = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|ix| 10f64.powf(lo + step * ix as f64))
            .collect();
        let mut counts = vec![0; bins];
        for value in shifted() {
            let bin = if step > 0.0 {
                ((value.log10() - lo) / step) as usize
            } else {
                0
            };
            // the maximum lands on the closing edge
            counts[bin.min(bins - 1)] += 1;
        }
        Self { edges, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Outline commands across many glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommandBreakdown {
    pub totals: CommandCounts,
    pub glyphs: u64,
}

impl CommandBreakdown {
    pub fn add_glyph(&mut self, counts: &CommandCounts) {
        self.totals.merge(counts);
        self.glyphs += 1;
    }

    pub fn merge(&mut self, other: &CommandBreakdown) {
        self.totals.merge(&other.totals);
        self.glyphs += other.glyphs;
    }

    /// Average number of commands of each kind per glyph.
    pub fn per_glyph(&self) -> [f64; 5] {
        let glyphs = self.glyphs.max(1) as f64;
        self.totals.to_array().map(|total| total as f64 / glyphs)
    }
}

/// Keeps `max(1, floor(len * ratio))` evenly strided items.
///
/// Empty input stays empty.
pub fn sample_stride<T: Copy>(items: &[T], ratio: f64) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    let keep = ((items.len() as f64 * ratio) as usize).clamp(1, items.len());
    let stride = items.len() / keep;
    items.iter().step_by(stride).take(keep).copied().collect()
}
