//! Time-weighted historical percentile.
//!
//! Each observation of a metric is ranked against every observation in the
//! window (fractional ranks for ties) and mapped to `100 × (r − 1) / (n − 1)`.
//! The statistic is a full re-rank: appending data changes the percentile of
//! older rows, so it must be recomputed whenever the window changes.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vantage_traits::stats::{fractional_ranks, rank_to_percentile};
use vantage_traits::{MetricColumn, NormalizedSeries, Result, VantageError};

/// Default name of the added percentile column.
pub const PERCENTILE_COLUMN: &str = "historical_percentile";

/// Configuration for the percentile engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentileConfig {
    /// Name of the output column (default: `historical_percentile`)
    pub column: String,
}

impl Default for PercentileConfig {
    fn default() -> Self {
        Self {
            column: PERCENTILE_COLUMN.to_string(),
        }
    }
}

/// Percentiles for a column of optional values.
///
/// Missing cells stay missing; every other cell gets a value in `[0, 100]`.
///
/// # Errors
///
/// Returns [`VantageError::EmptySeries`] if no cell holds a value.
pub fn historical_percentiles(values: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
    let observed: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if observed.is_empty() {
        return Err(VantageError::EmptySeries(
            "no non-missing observations to rank".to_string(),
        ));
    }

    let n = observed.len();
    let mut ranks = fractional_ranks(&observed).into_iter();

    let percentiles = values
        .iter()
        .map(|value| match value {
            Some(v) if v.is_finite() => ranks.next().map(|r| rank_to_percentile(r, n)),
            _ => None,
        })
        .collect();

    Ok(percentiles)
}

/// Add the historical percentile of `metric` using the default column name.
///
/// # Errors
///
/// See [`compute_historical_percentile_with`].
pub fn compute_historical_percentile(
    series: &NormalizedSeries,
    metric: &str,
) -> Result<NormalizedSeries> {
    compute_historical_percentile_with(series, metric, &PercentileConfig::default())
}

/// Add the historical percentile of `metric` as `config.column`.
///
/// Returns a new series; the input is left untouched. Running the engine
/// again replaces the previous percentile column with identical values.
///
/// # Errors
///
/// - [`VantageError::MissingColumn`] if `metric` is not in the series
/// - [`VantageError::InvalidArgument`] if the output column would overwrite `metric`
/// - [`VantageError::EmptySeries`] if `metric` has no observations
pub fn compute_historical_percentile_with(
    series: &NormalizedSeries,
    metric: &str,
    config: &PercentileConfig,
) -> Result<NormalizedSeries> {
    if config.column == metric {
        return Err(VantageError::InvalidArgument(format!(
            "percentile column '{metric}' would overwrite its source metric"
        )));
    }
    let column = series
        .column(metric)
        .ok_or_else(|| VantageError::MissingColumn(metric.to_string()))?;

    let percentiles = historical_percentiles(&column.values).map_err(|_| {
        VantageError::EmptySeries(format!(
            "{metric} has no observations for {}",
            series.code()
        ))
    })?;

    debug!(
        code = series.code(),
        metric,
        observed = column.observed(),
        "ranked historical percentile"
    );

    series
        .clone()
        .with_column(MetricColumn::new(config.column.clone(), percentiles))
}
