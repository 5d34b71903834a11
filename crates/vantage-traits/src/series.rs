//! Normalized time series.
//!
//! [`NormalizedSeries`] is the canonical output of the normalizer and the
//! input of every downstream consumer. Construction checks the invariants
//! once so nothing else has to: the index is strictly increasing (hence
//! duplicate-free), every column has one cell per index entry, and column
//! names are unique. Gaps are `None`, never zero.

use crate::{Date, EntityKind, Result, VantageError};
use polars::prelude::*;
use std::path::Path;

/// Name of the date column in the frame form.
pub const DATE_COLUMN: &str = "date";

/// Name of the entity code column in the frame form.
pub const CODE_COLUMN: &str = "code";

/// A named metric column; `None` marks a provider gap.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricColumn {
    /// Field name.
    pub name: String,
    /// One cell per index entry.
    pub values: Vec<Option<f64>>,
}

impl MetricColumn {
    /// Creates a column.
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of non-missing cells.
    pub fn observed(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Time-indexed table for one entity.
///
/// # Example
///
/// ```no_run
/// use vantage_traits::{Date, EntityKind, MetricColumn, NormalizedSeries};
///
/// let index = vec![
///     Date::from_ymd_opt(2021, 3, 8).unwrap(),
///     Date::from_ymd_opt(2021, 3, 9).unwrap(),
/// ];
/// let series = NormalizedSeries::new(
///     "000596.SZ",
///     EntityKind::Equity,
///     index,
///     vec![MetricColumn::new("pe_ttm", vec![Some(61.2), None])],
/// )
/// .unwrap();
/// assert_eq!(series.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    code: String,
    kind: EntityKind,
    index: Vec<Date>,
    columns: Vec<MetricColumn>,
}

impl NormalizedSeries {
    /// Creates a series, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::MalformedData`] if the index is not strictly
    /// increasing, and [`VantageError::SchemaMismatch`] if a column length
    /// differs from the index length or a column name repeats.
    pub fn new(
        code: impl Into<String>,
        kind: EntityKind,
        index: Vec<Date>,
        columns: Vec<MetricColumn>,
    ) -> Result<Self> {
        if let Some(pair) = index.windows(2).find(|w| w[0] >= w[1]) {
            return Err(VantageError::MalformedData(format!(
                "index not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }

        let mut series = Self {
            code: code.into(),
            kind,
            index,
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            series.check_column(&column)?;
            if series.has_column(&column.name) {
                return Err(VantageError::SchemaMismatch(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            series.columns.push(column);
        }
        Ok(series)
    }

    fn check_column(&self, column: &MetricColumn) -> Result<()> {
        if column.name == DATE_COLUMN || column.name == CODE_COLUMN {
            return Err(VantageError::SchemaMismatch(format!(
                "'{}' is a reserved column name",
                column.name
            )));
        }
        if column.values.len() != self.index.len() {
            return Err(VantageError::SchemaMismatch(format!(
                "column '{}' has {} cell(s), index has {}",
                column.name,
                column.values.len(),
                self.index.len()
            )));
        }
        Ok(())
    }

    /// Returns a copy with `column` added, replacing any column of the same
    /// name in place.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::SchemaMismatch`] if the column length differs
    /// from the index length.
    pub fn with_column(mut self, column: MetricColumn) -> Result<Self> {
        self.check_column(&column)?;
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    /// Entity code carried by every row.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Entity kind.
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Strictly increasing date index.
    pub fn index(&self) -> &[Date] {
        &self.index
    }

    /// Metric columns in declaration order.
    pub fn columns(&self) -> &[MetricColumn] {
        &self.columns
    }

    /// Metric column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Checks if a metric column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Gets a metric column by name.
    pub fn column(&self, name: &str) -> Option<&MetricColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Most recent non-missing observation of a column.
    pub fn latest(&self, name: &str) -> Option<(Date, f64)> {
        let column = self.column(name)?;
        self.index
            .iter()
            .zip(&column.values)
            .rev()
            .find_map(|(date, value)| value.map(|v| (*date, v)))
    }

    /// Converts the series into a Polars DataFrame with columns
    /// `date`, `code`, then every metric column in order.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let height = self.index.len();
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 2);
        columns.push(Column::new(DATE_COLUMN.into(), self.index.as_slice()));
        columns.push(Column::new(
            CODE_COLUMN.into(),
            vec![self.code.as_str(); height],
        ));
        for column in &self.columns {
            columns.push(Column::new(
                column.name.as_str().into(),
                column.values.as_slice(),
            ));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Writes the frame form as CSV, header included.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> NormalizedSeries {
        NormalizedSeries::new(
            "000300.SH",
            EntityKind::Index,
            vec![d(2021, 1, 4), d(2021, 1, 5), d(2021, 1, 6)],
            vec![MetricColumn::new("pe_ttm", vec![Some(15.1), None, Some(15.4)])],
        )
        .unwrap()
    }

    #[test]
    fn test_series_accessors() {
        let series = sample();
        assert_eq!(series.len(), 3);
        assert_eq!(series.code(), "000300.SH");
        assert_eq!(series.kind(), EntityKind::Index);
        assert!(series.has_column("pe_ttm"));
        assert!(!series.has_column("roe_ttm"));
        assert_eq!(series.column("pe_ttm").unwrap().observed(), 2);
        assert_eq!(series.latest("pe_ttm"), Some((d(2021, 1, 6), 15.4)));
    }

    #[test]
    fn test_rejects_unsorted_index() {
        let err = NormalizedSeries::new(
            "X",
            EntityKind::Index,
            vec![d(2021, 1, 5), d(2021, 1, 5)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, VantageError::MalformedData(_)));
    }

    #[test]
    fn test_rejects_short_column() {
        let err = NormalizedSeries::new(
            "X",
            EntityKind::Index,
            vec![d(2021, 1, 5)],
            vec![MetricColumn::new("pe_ttm", vec![])],
        )
        .unwrap_err();
        assert!(matches!(err, VantageError::SchemaMismatch(_)));
    }

    #[test]
    fn test_rejects_reserved_name() {
        let err = NormalizedSeries::new(
            "X",
            EntityKind::Index,
            vec![d(2021, 1, 5)],
            vec![MetricColumn::new("code", vec![Some(1.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, VantageError::SchemaMismatch(_)));
    }

    #[test]
    fn test_with_column_replaces() {
        let series = sample()
            .with_column(MetricColumn::new("rank", vec![Some(0.0), None, Some(100.0)]))
            .unwrap()
            .with_column(MetricColumn::new("rank", vec![Some(1.0), None, Some(2.0)]))
            .unwrap();
        assert_eq!(series.column_names(), vec!["pe_ttm", "rank"]);
        assert_eq!(series.column("rank").unwrap().values[0], Some(1.0));
    }

    #[test]
    fn test_latest_all_missing() {
        let series = NormalizedSeries::new(
            "X",
            EntityKind::Equity,
            vec![d(2021, 1, 5)],
            vec![MetricColumn::new("roa_ttm", vec![None])],
        )
        .unwrap();
        assert_eq!(series.latest("roa_ttm"), None);
        assert_eq!(series.latest("nope"), None);
    }

    #[test]
    fn test_to_dataframe() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        let pe = df.column("pe_ttm").unwrap();
        assert_eq!(pe.null_count(), 1);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["date", "code", "pe_ttm"]);
    }
}
