//! Wire types for the iFinD `date_sequence` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use vantage_traits::{DataRequest, RawBatch, RawValue, Result, VantageError};

use crate::error::IfindError;

/// Parse `key:value` directives separated by commas.
///
/// `"Interval:Q,Fill:Blank"` becomes `{"Interval": "Q", "Fill": "Blank"}`.
/// Entries without a colon are ignored, as are blank entries.
#[must_use]
pub fn parse_directives(directives: &str) -> BTreeMap<String, String> {
    directives
        .split(',')
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Split an indicator parameter string on commas; empty gives no params.
fn split_params(param: &str) -> Vec<String> {
    if param.trim().is_empty() {
        Vec::new()
    } else {
        param.split(',').map(|p| p.trim().to_string()).collect()
    }
}

/// One requested indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorParam {
    /// Indicator id.
    pub indicator: String,
    /// Positional indicator parameters.
    pub indiparams: Vec<String>,
}

/// Request body for `date_sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSequenceBody {
    /// Entity codes, comma separated.
    pub codes: String,
    /// Window start (`YYYY-MM-DD`).
    pub startdate: String,
    /// Window end (`YYYY-MM-DD`).
    pub enddate: String,
    /// Cadence and fill directives.
    pub functionpara: BTreeMap<String, String>,
    /// Requested indicators in column order.
    pub indipara: Vec<IndicatorParam>,
}

impl DateSequenceBody {
    /// Build the request body for a provider request.
    #[must_use]
    pub fn from_request(request: &DataRequest) -> Self {
        Self {
            codes: request.code.clone(),
            startdate: request.window.start().to_string(),
            enddate: request.window.end().to_string(),
            functionpara: parse_directives(&request.directives),
            indipara: request
                .metrics
                .iter()
                .map(|m| IndicatorParam {
                    indicator: m.id.clone(),
                    indiparams: split_params(&m.param),
                })
                .collect(),
        }
    }
}

/// Response of the access token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Zero on success.
    #[serde(default)]
    pub errorcode: i64,
    /// Provider message.
    #[serde(default)]
    pub errmsg: String,
    /// Token payload.
    pub data: Option<TokenData>,
}

/// Access token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenData {
    /// Short-lived access token.
    pub access_token: String,
}

/// One entity's table in a `date_sequence` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceTable {
    /// Entity code.
    #[serde(default)]
    pub thscode: String,
    /// Timestamps, one per row.
    #[serde(default)]
    pub time: Vec<String>,
    /// Values per indicator id, aligned with `time`.
    #[serde(default)]
    pub table: HashMap<String, Vec<Value>>,
}

impl SequenceTable {
    /// Convert to a raw batch with columns in request order.
    ///
    /// Columns are looked up by indicator id, so the key order of the JSON
    /// object never leaks into the batch.
    ///
    /// # Errors
    ///
    /// [`VantageError::SchemaMismatch`] when a requested indicator is absent
    /// or its value list does not match the timestamp count.
    pub fn to_raw_batch(&self, request: &DataRequest) -> Result<RawBatch> {
        let ids = request.indicator_ids();
        let mut columns = Vec::with_capacity(ids.len());
        for id in &ids {
            let values = self.table.get(*id).ok_or_else(|| {
                VantageError::SchemaMismatch(format!(
                    "indicator '{id}' missing from response for {}",
                    request.code
                ))
            })?;
            if values.len() != self.time.len() {
                return Err(VantageError::SchemaMismatch(format!(
                    "indicator '{id}' has {} values for {} timestamps",
                    values.len(),
                    self.time.len()
                )));
            }
            columns.push(values);
        }

        let mut batch = RawBatch::new(
            request.code.clone(),
            ids.iter().map(ToString::to_string).collect(),
        );
        for (row, timestamp) in self.time.iter().enumerate() {
            let values = columns.iter().map(|c| raw_value(&c[row])).collect();
            batch.push_row(timestamp.clone(), values);
        }
        Ok(batch)
    }
}

/// Response of `date_sequence`.
#[derive(Debug, Clone, Deserialize)]
pub struct DateSequenceResponse {
    /// Zero on success.
    #[serde(default)]
    pub errorcode: i64,
    /// Provider message.
    #[serde(default)]
    pub errmsg: String,
    /// One table per requested code.
    #[serde(default)]
    pub tables: Vec<SequenceTable>,
}

impl DateSequenceResponse {
    /// Fail on a non-zero error code.
    ///
    /// # Errors
    ///
    /// Returns [`IfindError::Api`] carrying the provider code and message.
    pub fn check(self) -> std::result::Result<Self, IfindError> {
        if self.errorcode == 0 {
            Ok(self)
        } else {
            Err(IfindError::Api {
                code: self.errorcode,
                message: self.errmsg,
            })
        }
    }

    /// Raw batch for `request.code`.
    ///
    /// A response without a table for the code yields an empty batch.
    ///
    /// # Errors
    ///
    /// See [`SequenceTable::to_raw_batch`].
    pub fn into_raw_batch(self, request: &DataRequest) -> Result<RawBatch> {
        match self.tables.iter().find(|t| t.thscode == request.code) {
            Some(table) => table.to_raw_batch(request),
            None => Ok(RawBatch::new(
                request.code.clone(),
                request.metrics.iter().map(|m| m.id.clone()).collect(),
            )),
        }
    }
}

fn raw_value(value: &Value) -> RawValue {
    match value {
        Value::Null => RawValue::Missing,
        Value::Number(n) => n.as_f64().map_or(RawValue::Missing, RawValue::Number),
        Value::String(s) => RawValue::Text(s.clone()),
        other => RawValue::Text(other.to_string()),
    }
}
