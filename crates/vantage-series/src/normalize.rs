//! Time series normalizer.
//!
//! Converts a [`RawBatch`] into a [`NormalizedSeries`]:
//! 1. Validate the raw columns against the declared metric list
//! 2. Parse every timestamp and value, failing the whole call on bad input
//! 3. Optionally clip to a query window
//! 4. Sort ascending and collapse duplicate timestamps by policy
//! 5. Rename raw columns to the declared field names

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;
use vantage_traits::{
    Date, EntityKind, MetricColumn, MetricSpec, NormalizedSeries, QueryWindow, RawBatch, RawValue,
    Result, VantageError,
};

/// Text values the provider uses for "no value".
const BLANK_MARKERS: &[&str] = &["", "-", "--", "null", "none", "nan"];

/// Which row survives when several share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Keep the last occurrence in provider order.
    #[default]
    KeepLast,
    /// Keep the first occurrence in provider order.
    KeepFirst,
}

/// Configuration for the normalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Duplicate timestamp resolution (default: keep last)
    pub duplicates: DuplicatePolicy,

    /// Drop rows outside this window when set (default: keep everything)
    pub window: Option<QueryWindow>,
}

/// Raw batch normalizer.
///
/// # Example
///
/// ```ignore
/// use vantage_series::normalize::{Normalizer, NormalizerConfig};
///
/// let normalizer = Normalizer::new(NormalizerConfig {
///     window: Some(window),
///     ..Default::default()
/// });
/// let series = normalizer.normalize(&batch, EntityKind::Equity, &metrics)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with the given configuration.
    #[must_use]
    pub const fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Get the duplicate policy.
    #[must_use]
    pub const fn duplicate_policy(&self) -> DuplicatePolicy {
        self.config.duplicates
    }

    /// Normalize `batch` into a series whose columns are exactly the
    /// fields of `expected`, in order.
    ///
    /// # Errors
    ///
    /// - [`VantageError::SchemaMismatch`] if the raw column count differs from
    ///   `expected`, a raw column sits at another metric's position, or a row
    ///   carries the wrong number of values
    /// - [`VantageError::MalformedData`] if any timestamp or value fails to parse
    pub fn normalize(
        &self,
        batch: &RawBatch,
        kind: EntityKind,
        expected: &[MetricSpec],
    ) -> Result<NormalizedSeries> {
        check_schema(batch, expected)?;

        let width = expected.len();
        let mut parsed: Vec<(Date, Vec<Option<f64>>)> = Vec::with_capacity(batch.len());
        for row in &batch.rows {
            let date = parse_timestamp(&row.timestamp)?;
            if row.values.len() != width {
                return Err(VantageError::SchemaMismatch(format!(
                    "row '{}' has {} value(s), expected {}",
                    row.timestamp,
                    row.values.len(),
                    width
                )));
            }
            let values = row
                .values
                .iter()
                .zip(expected)
                .map(|(value, spec)| {
                    parse_value(value).map_err(|e| {
                        VantageError::MalformedData(format!(
                            "{} at {} ({}): {e}",
                            spec.field, row.timestamp, batch.code
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            parsed.push((date, values));
        }

        let total = parsed.len();
        if let Some(window) = &self.config.window {
            parsed.retain(|(date, _)| window.contains(*date));
        }
        let out_of_window = total - parsed.len();

        let mut rows: BTreeMap<Date, Vec<Option<f64>>> = BTreeMap::new();
        let mut duplicates = 0usize;
        for (date, values) in parsed {
            match rows.entry(date) {
                Entry::Vacant(slot) => {
                    slot.insert(values);
                }
                Entry::Occupied(mut slot) => {
                    duplicates += 1;
                    if self.config.duplicates == DuplicatePolicy::KeepLast {
                        slot.insert(values);
                    }
                }
            }
        }

        debug!(
            code = %batch.code,
            rows = total,
            out_of_window,
            duplicates,
            kept = rows.len(),
            "normalized raw batch"
        );

        let mut index = Vec::with_capacity(rows.len());
        let mut columns: Vec<MetricColumn> = expected
            .iter()
            .map(|spec| MetricColumn::new(spec.field.clone(), Vec::with_capacity(rows.len())))
            .collect();
        for (date, values) in rows {
            index.push(date);
            for (column, value) in columns.iter_mut().zip(values) {
                column.values.push(value);
            }
        }

        NormalizedSeries::new(batch.code.clone(), kind, index, columns)
    }
}

/// Normalize with the default configuration (keep last, no window clip).
///
/// # Errors
///
/// See [`Normalizer::normalize`].
pub fn normalize(
    batch: &RawBatch,
    kind: EntityKind,
    expected: &[MetricSpec],
) -> Result<NormalizedSeries> {
    Normalizer::default().normalize(batch, kind, expected)
}

/// Validate raw columns against the declared metric list.
///
/// Call this on a multi-metric batch before splitting it per metric: once
/// split, each part only sees its own spec and cannot detect reordering.
///
/// # Errors
///
/// [`VantageError::SchemaMismatch`] if the column count differs or a column
/// sits at another metric's position.
pub fn check_schema(batch: &RawBatch, expected: &[MetricSpec]) -> Result<()> {
    if batch.width() != expected.len() {
        return Err(VantageError::column_count(expected.len(), batch.width()));
    }

    for (position, (label, spec)) in batch.columns.iter().zip(expected).enumerate() {
        if label == &spec.id {
            continue;
        }
        // A label naming another requested indicator means the order drifted
        if let Some(other) = expected.iter().find(|m| &m.id == label) {
            return Err(VantageError::SchemaMismatch(format!(
                "column {position} is '{label}' ({}), expected '{}' ({})",
                other.field, spec.id, spec.field
            )));
        }
    }

    Ok(())
}

/// Parse a provider timestamp into a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<Date> {
    let s = text.trim();

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s[0..4].parse::<i32>().ok();
        let month = s[4..6].parse::<u32>().ok();
        let day = s[6..8].parse::<u32>().ok();
        if let (Some(y), Some(m), Some(d)) = (year, month, day)
            && let Some(date) = Date::from_ymd_opt(y, m, d)
        {
            return Ok(date);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = Date::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    Err(VantageError::MalformedData(format!(
        "unparseable timestamp '{text}'"
    )))
}

/// Parse one raw cell; `None` is the missing marker.
fn parse_value(value: &RawValue) -> std::result::Result<Option<f64>, String> {
    match value {
        RawValue::Number(v) if v.is_finite() => Ok(Some(*v)),
        RawValue::Number(_) | RawValue::Missing => Ok(None),
        RawValue::Text(text) => {
            let s = text.trim();
            if BLANK_MARKERS.contains(&s.to_ascii_lowercase().as_str()) {
                return Ok(None);
            }
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                Ok(_) => Ok(None),
                Err(_) => Err(format!("unparseable value '{text}'")),
            }
        }
    }
}
