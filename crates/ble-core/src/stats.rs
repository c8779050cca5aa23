//! Summary statistics over an assignment.

use crate::select::BasicLevel;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Minimum, mean and maximum of a set of values. The mean is rounded to one
/// decimal; an empty input gives all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl Summary {
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<f64>,
    {
        let values: Vec<f64> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Self::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        Self {
            min,
            mean: (mean * 10.0).round() / 10.0,
            max,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mean: {} (min: {}, max: {})", self.mean, self.min, self.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BleStats {
    pub nodes_with_bl: usize,
    pub nodes_without_bl: usize,
    pub unique_bls: usize,
    pub weight_value: Summary,
    pub depth: Summary,
    pub num_descendants: Summary,
    pub cumulative_weight: Summary,
}

impl BleStats {
    /// Summaries are taken over unique basic levels, not over sources.
    pub fn from_assignment<'a, I>(assignment: I) -> Self
    where
        I: IntoIterator<Item = &'a Option<BasicLevel>>,
    {
        let mut nodes_with_bl = 0;
        let mut nodes_without_bl = 0;
        let mut slots = Vec::new();
        for slot in assignment {
            match slot {
                Some(_) => nodes_with_bl += 1,
                None => nodes_without_bl += 1,
            }
            slots.push(slot);
        }

        let unique = unique_basic_levels(slots);
        Self {
            nodes_with_bl,
            nodes_without_bl,
            unique_bls: unique.len(),
            weight_value: Summary::of(unique.iter().map(|bl| bl.weight_value as f64)),
            depth: Summary::of(unique.iter().map(|bl| bl.depth as f64)),
            num_descendants: Summary::of(unique.iter().map(|bl| bl.num_descendants as f64)),
            cumulative_weight: Summary::of(unique.iter().map(|bl| bl.cumulative_weight as f64)),
        }
    }
}

impl fmt::Display for BleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes with a basic level: {}", self.nodes_with_bl)?;
        writeln!(f, "nodes without a basic level: {}", self.nodes_without_bl)?;
        writeln!(f, "# of unique basic levels: {}", self.unique_bls)?;
        writeln!(f, "weight_value: {}", self.weight_value)?;
        writeln!(f, "depth: {}", self.depth)?;
        writeln!(f, "num_descendants: {}", self.num_descendants)?;
        write!(f, "cumulative_weight: {}", self.cumulative_weight)
    }
}

/// Distinct basic levels, each at its first occurrence.
pub fn unique_basic_levels<'a, I>(assignment: I) -> Vec<&'a BasicLevel>
where
    I: IntoIterator<Item = &'a Option<BasicLevel>>,
{
    let mut seen = BTreeSet::new();
    assignment
        .into_iter()
        .flatten()
        .filter(|&bl| seen.insert(bl.id.as_str()))
        .collect()
}

/// Unique basic levels whose cumulative weight reaches `min_cumulative_weight`.
pub fn basic_level_table<'a, I>(assignment: I, min_cumulative_weight: u64) -> Vec<&'a BasicLevel>
where
    I: IntoIterator<Item = &'a Option<BasicLevel>>,
{
    unique_basic_levels(assignment)
        .into_iter()
        .filter(|bl| bl.cumulative_weight >= min_cumulative_weight)
        .collect()
}

/// One row of a subsumer-threshold sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub subsumer_threshold: usize,
    #[serde(flatten)]
    pub stats: BleStats,
}
