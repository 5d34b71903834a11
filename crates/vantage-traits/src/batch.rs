//! Raw provider responses.
//!
//! A [`RawBatch`] is what a provider hands back before any cleaning: rows in
//! provider order, timestamps as text, values as whatever the wire carried.
//! It may hold duplicate timestamps, gaps and rows outside the requested
//! window. The normalizer consumes it by reference and never mutates it.

use crate::{Result, VantageError};
use serde::{Deserialize, Serialize};

/// One cell as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    /// A numeric value.
    Number(f64),
    /// A textual value, possibly numeric text or a blank marker.
    Text(String),
    /// No value at all (JSON null, absent cell).
    Missing,
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Missing, Self::Number)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// One provider row: a timestamp and one value per raw column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Timestamp text as sent by the provider.
    pub timestamp: String,
    /// Values, positionally aligned with [`RawBatch::columns`].
    pub values: Vec<RawValue>,
}

impl RawRow {
    /// Creates a row.
    pub fn new(timestamp: impl Into<String>, values: Vec<RawValue>) -> Self {
        Self {
            timestamp: timestamp.into(),
            values,
        }
    }
}

/// Raw tabular response for a single entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    /// Entity code the provider reported.
    pub code: String,
    /// Raw column labels, in provider order (timestamp and code excluded).
    pub columns: Vec<String>,
    /// Rows in provider order.
    pub rows: Vec<RawRow>,
}

impl RawBatch {
    /// Creates an empty batch with the given column labels.
    pub fn new(code: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            code: code.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push_row(&mut self, timestamp: impl Into<String>, values: Vec<RawValue>) {
        self.rows.push(RawRow::new(timestamp, values));
    }

    /// Builder form of [`RawBatch::push_row`].
    #[must_use]
    pub fn with_row(mut self, timestamp: impl Into<String>, values: Vec<RawValue>) -> Self {
        self.push_row(timestamp, values);
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of raw value columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Splits a multi-column batch into one single-column batch per column,
    /// preserving column order and row order.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::SchemaMismatch`] if any row does not carry
    /// exactly one value per column.
    pub fn split_columns(&self) -> Result<Vec<Self>> {
        let width = self.width();
        let mut parts: Vec<Self> = self
            .columns
            .iter()
            .map(|label| {
                let mut part = Self::new(self.code.clone(), vec![label.clone()]);
                part.rows.reserve(self.rows.len());
                part
            })
            .collect();

        for row in &self.rows {
            if row.values.len() != width {
                return Err(VantageError::SchemaMismatch(format!(
                    "row '{}' has {} value(s), batch has {} column(s)",
                    row.timestamp,
                    row.values.len(),
                    width
                )));
            }
            for (part, value) in parts.iter_mut().zip(&row.values) {
                part.push_row(row.timestamp.clone(), vec![value.clone()]);
            }
        }

        Ok(parts)
    }
}
