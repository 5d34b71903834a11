//! Fundamental alignment engine.
//!
//! Fundamentals arrive at their own cadence (quarterly reporting dates, with
//! the occasional quarter missing). Each metric batch is normalized on its
//! own, then all of them are outer-joined on the union of their timestamps.
//! A cell with no observation is missing unless forward fill is requested.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use vantage_traits::{
    Date, EntityKind, MetricColumn, MetricSpec, NormalizedSeries, RawBatch, Result, VantageError,
};

use crate::normalize::{Normalizer, NormalizerConfig};

/// Rule for timestamps where a metric has no observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GapPolicy {
    /// Leave the cell missing.
    #[default]
    LeaveMissing,
    /// Carry the previous observation of the same metric forward.
    /// Cells before the first observation stay missing.
    ForwardFill,
}

/// Configuration for metric alignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Gap handling after the join (default: leave missing)
    pub gap_policy: GapPolicy,

    /// Settings for the per-metric normalize step
    pub normalizer: NormalizerConfig,
}

impl AlignConfig {
    /// Configuration with the given gap policy and default normalizer.
    #[must_use]
    pub fn with_gap_policy(gap_policy: GapPolicy) -> Self {
        Self {
            gap_policy,
            ..Default::default()
        }
    }
}

/// Align single-metric batches into one series with one column per metric.
///
/// Output has one row per distinct timestamp across all inputs and one
/// column per distinct field, in first-appearance order. A field given more
/// than once is merged cell by cell, later inputs winning where they hold a
/// value. Metrics with no observations keep an all-missing column.
///
/// # Errors
///
/// - [`VantageError::EmptyInput`] if `inputs` is empty
/// - [`VantageError::SchemaMismatch`] if inputs disagree on the entity code,
///   or from any constituent normalize call
/// - [`VantageError::MalformedData`] from any constituent normalize call
pub fn align_metrics(
    inputs: &[(MetricSpec, RawBatch)],
    kind: EntityKind,
    config: &AlignConfig,
) -> Result<NormalizedSeries> {
    let Some((_, first)) = inputs.first() else {
        return Err(VantageError::EmptyInput(
            "no metrics requested for alignment".to_string(),
        ));
    };
    let code = first.code.clone();
    if let Some((_, other)) = inputs.iter().find(|(_, b)| b.code != code) {
        return Err(VantageError::SchemaMismatch(format!(
            "cannot align '{}' with '{}'",
            other.code, code
        )));
    }

    let normalizer = Normalizer::new(config.normalizer.clone());
    let parts = inputs
        .iter()
        .map(|(spec, batch)| {
            normalizer
                .normalize(batch, kind, std::slice::from_ref(spec))
                .map(|series| (spec.field.as_str(), series))
        })
        .collect::<Result<Vec<_>>>()?;

    let index: Vec<Date> = parts
        .iter()
        .flat_map(|(_, series)| series.index().iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut columns: Vec<MetricColumn> = Vec::new();
    for (field, series) in &parts {
        let position = match columns.iter().position(|c| c.name == *field) {
            Some(p) => p,
            None => {
                columns.push(MetricColumn::new(*field, vec![None; index.len()]));
                columns.len() - 1
            }
        };
        let Some(source) = series.column(field) else {
            continue;
        };
        let target = &mut columns[position].values;
        for (date, value) in series.index().iter().zip(&source.values) {
            if let (Some(v), Ok(row)) = (value, index.binary_search(date)) {
                target[row] = Some(*v);
            }
        }
    }

    if config.gap_policy == GapPolicy::ForwardFill {
        for column in &mut columns {
            forward_fill(&mut column.values);
        }
    }

    for column in &columns {
        if column.observed() == 0 {
            warn!(code = %code, metric = %column.name, "metric has no observations in window");
        }
    }

    debug!(
        code = %code,
        metrics = columns.len(),
        rows = index.len(),
        gap_policy = ?config.gap_policy,
        "aligned metrics"
    );

    NormalizedSeries::new(code, kind, index, columns)
}

/// Carry each observed value forward over following gaps.
fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for cell in values.iter_mut() {
        if let Some(v) = *cell {
            last = Some(v);
        } else {
            *cell = last;
        }
    }
}
