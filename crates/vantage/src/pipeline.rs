//! Analysis pipelines.
//!
//! Each pipeline makes exactly one provider call. Request validation happens
//! before that call, so a bad window never reaches the provider.

use serde::Serialize;
use tracing::info;
use vantage_series::catalog::{self, Analysis, PE_TTM};
use vantage_series::{
    AlignConfig, GapPolicy, Normalizer, NormalizerConfig, PERCENTILE_COLUMN, align_metrics,
    check_schema, compute_historical_percentile,
};
use vantage_traits::{
    Date, EntityKind, EntityRef, MarketDataProvider, NormalizedSeries, QueryWindow, RawBatch,
    Result, VantageError,
};

/// Percentile below which a valuation reads as cheap.
pub const LOW_ZONE_THRESHOLD: f64 = 20.0;

/// Percentile above which a valuation reads as expensive.
pub const HIGH_ZONE_THRESHOLD: f64 = 80.0;

/// Validated analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    /// Entity to analyze.
    pub entity: EntityRef,
    /// Inclusive query window.
    pub window: QueryWindow,
}

impl AnalysisRequest {
    /// Create a request from already validated parts.
    #[must_use]
    pub const fn new(entity: EntityRef, window: QueryWindow) -> Self {
        Self { entity, window }
    }

    /// Parse and validate invocation arguments.
    ///
    /// # Errors
    ///
    /// - [`VantageError::InvalidArgument`] if `code` is blank
    /// - [`VantageError::InvalidDate`] if a date does not parse
    /// - [`VantageError::InvalidRange`] if `start` is after `end`
    pub fn parse(
        code: &str,
        start: &str,
        end: &str,
        display_name: &str,
        kind: EntityKind,
    ) -> Result<Self> {
        let code = code.trim();
        if code.is_empty() {
            return Err(VantageError::InvalidArgument(
                "entity code must not be empty".to_string(),
            ));
        }
        let window = QueryWindow::parse(start, end)?;
        let display_name = if display_name.trim().is_empty() {
            code
        } else {
            display_name
        };
        Ok(Self::new(EntityRef::new(code, kind, display_name), window))
    }
}

/// Where the latest percentile sits.
///
/// The 20 and 80 cut-offs are a reporting convention for the summary line.
/// They are not part of the percentile computation and carry no meaning
/// beyond labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValuationZone {
    /// Below the 20th percentile.
    Low,
    /// Between the 20th and 80th percentiles inclusive.
    Neutral,
    /// Above the 80th percentile.
    High,
}

impl ValuationZone {
    /// Classify a percentile.
    #[must_use]
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile < LOW_ZONE_THRESHOLD {
            Self::Low
        } else if percentile > HIGH_ZONE_THRESHOLD {
            Self::High
        } else {
            Self::Neutral
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Neutral => "neutral",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for ValuationZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most recent valuation reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestValuation {
    /// Date of the reading.
    pub date: Date,
    /// Trailing P/E.
    pub pe_ttm: f64,
    /// Historical percentile of the P/E.
    pub percentile: f64,
    /// Zone of the percentile.
    pub zone: ValuationZone,
}

/// Valuation analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationReport {
    /// Analyzed entity.
    pub entity: EntityRef,
    /// Query window.
    pub window: QueryWindow,
    /// Series with `pe_ttm` and its historical percentile.
    pub series: NormalizedSeries,
}

impl ValuationReport {
    /// Latest row where both the P/E and its percentile are present.
    #[must_use]
    pub fn latest(&self) -> Option<LatestValuation> {
        let pe = self.series.column(PE_TTM)?;
        let pct = self.series.column(PERCENTILE_COLUMN)?;
        self.series
            .index()
            .iter()
            .zip(pe.values.iter().zip(&pct.values))
            .rev()
            .find_map(|(date, pair)| match pair {
                (Some(pe_ttm), Some(percentile)) => Some(LatestValuation {
                    date: *date,
                    pe_ttm: *pe_ttm,
                    percentile: *percentile,
                    zone: ValuationZone::from_percentile(*percentile),
                }),
                _ => None,
            })
    }
}

/// Fundamentals analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalReport {
    /// Analyzed entity.
    pub entity: EntityRef,
    /// Query window.
    pub window: QueryWindow,
    /// Gap policy applied after alignment.
    pub gap_policy: GapPolicy,
    /// One column per fundamental metric.
    pub series: NormalizedSeries,
}

async fn fetch_batch(
    provider: &dyn MarketDataProvider,
    analysis: Analysis,
    request: &AnalysisRequest,
) -> Result<(vantage_traits::DataRequest, RawBatch)> {
    let data_request = catalog::request(analysis, &request.entity, request.window);
    info!(
        provider = provider.name(),
        code = %request.entity.code,
        window = %request.window,
        metrics = data_request.metrics.len(),
        "fetching {analysis:?} data"
    );
    let batch = provider.fetch(&data_request).await?;
    if batch.is_empty() {
        return Err(VantageError::EmptyInput(format!(
            "provider returned no rows for {} in {}",
            request.entity.code, request.window
        )));
    }
    Ok((data_request, batch))
}

fn window_config(window: QueryWindow) -> NormalizerConfig {
    NormalizerConfig {
        window: Some(window),
        ..Default::default()
    }
}

/// Run the valuation analysis.
///
/// # Errors
///
/// - [`VantageError::EmptyInput`] if the provider returns no rows
/// - [`VantageError::EmptySeries`] if no P/E value survives normalization
/// - any provider, schema or parse error, unchanged
pub async fn valuation(
    provider: &dyn MarketDataProvider,
    request: &AnalysisRequest,
) -> Result<ValuationReport> {
    let (data_request, batch) = fetch_batch(provider, Analysis::Valuation, request).await?;
    let series = Normalizer::new(window_config(request.window)).normalize(
        &batch,
        request.entity.kind,
        &data_request.metrics,
    )?;
    let series = compute_historical_percentile(&series, PE_TTM)?;
    info!(code = %request.entity.code, rows = series.len(), "valuation ready");
    Ok(ValuationReport {
        entity: request.entity.clone(),
        window: request.window,
        series,
    })
}

/// Run the fundamentals analysis.
///
/// All metrics come back in one provider batch, which is split per metric
/// and re-aligned on the union of their reporting dates.
///
/// # Errors
///
/// - [`VantageError::EmptyInput`] if the provider returns no rows
/// - [`VantageError::SchemaMismatch`] if the batch width differs from the request
///   or its columns come back in a different order
/// - any provider, schema or parse error, unchanged
pub async fn fundamentals(
    provider: &dyn MarketDataProvider,
    request: &AnalysisRequest,
    gap_policy: GapPolicy,
) -> Result<FundamentalReport> {
    let (data_request, batch) = fetch_batch(provider, Analysis::Fundamentals, request).await?;
    check_schema(&batch, &data_request.metrics)?;
    let inputs: Vec<_> = data_request
        .metrics
        .into_iter()
        .zip(batch.split_columns()?)
        .collect();
    let config = AlignConfig {
        gap_policy,
        normalizer: window_config(request.window),
    };
    let series = align_metrics(&inputs, request.entity.kind, &config)?;
    info!(code = %request.entity.code, rows = series.len(), "fundamentals ready");
    Ok(FundamentalReport {
        entity: request.entity.clone(),
        window: request.window,
        gap_policy,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vantage_traits::{DataRequest, RawValue};

    /// Provider answering every request with a prepared batch.
    struct Scripted {
        rows: Vec<(String, Vec<RawValue>)>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(rows: Vec<(String, Vec<RawValue>)>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self, request: &DataRequest) -> Result<RawBatch> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let columns = request.metrics.iter().map(|m| m.id.clone()).collect();
            let mut batch = RawBatch::new(request.code.clone(), columns);
            for (ts, values) in &self.rows {
                batch.push_row(ts.clone(), values.clone());
            }
            Ok(batch)
        }
    }

    fn equity(start: &str, end: &str) -> AnalysisRequest {
        AnalysisRequest::parse("000596.SZ", start, end, "Gujing Gongjiu", EntityKind::Equity)
            .unwrap()
    }

    /// 50 daily P/E points from 2016-01-04 with the 11th date repeated.
    fn pe_rows() -> Vec<(String, Vec<RawValue>)> {
        let base = Date::from_ymd_opt(2016, 1, 4).unwrap();
        (0..50)
            .map(|i| {
                let day = if i == 10 { 9 } else { i };
                let date = base + chrono::Duration::days(day);
                let pe = 20.0 + ((i * 37) % 50) as f64 * 0.5;
                (date.format("%Y%m%d").to_string(), vec![RawValue::Number(pe)])
            })
            .collect()
    }

    #[tokio::test]
    async fn test_valuation_scenario_with_duplicate() {
        let provider = Scripted::new(pe_rows());
        let report = valuation(&provider, &equity("2016-01-01", "2021-03-09"))
            .await
            .unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(report.series.len(), 49);
        assert_eq!(report.series.column_names(), vec![PE_TTM, PERCENTILE_COLUMN]);

        let pe = &report.series.column(PE_TTM).unwrap().values;
        let pct = &report.series.column(PERCENTILE_COLUMN).unwrap().values;
        assert!(pct.iter().all(|p| p.is_some_and(|p| (0.0..=100.0).contains(&p))));

        // Ranking among 49 values: the smallest maps to 0, the largest to 100
        let (min_row, _) = pe
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        let (max_row, _) = pe
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_relative_eq!(pct[min_row].unwrap(), 0.0);
        assert_relative_eq!(pct[max_row].unwrap(), 100.0);

        // Keep-last: the repeated date holds the 11th provider value
        let survivor = 20.0 + ((10 * 37) % 50) as f64 * 0.5;
        assert_relative_eq!(pe[9].unwrap(), survivor);

        // Rank among the 49 kept values only; the dropped row would shift it
        let below = pe.iter().flatten().filter(|v| **v < survivor).count();
        assert_eq!(below, 20);
        assert_relative_eq!(pct[9].unwrap(), 100.0 * 20.0 / 48.0);

        let latest = report.latest().unwrap();
        assert_eq!(latest.date, *report.series.index().last().unwrap());
    }

    #[tokio::test]
    async fn test_inverted_window_never_calls_provider() {
        let provider = Scripted::new(pe_rows());
        let err = AnalysisRequest::parse(
            "000596.SZ",
            "2021-01-01",
            "2016-01-01",
            "Gujing Gongjiu",
            EntityKind::Equity,
        )
        .unwrap_err();
        assert!(matches!(err, VantageError::InvalidRange { .. }));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_parse_request() {
        let req = AnalysisRequest::parse(" 000300.SH ", "2016-01-01", "2020-12-09", "", EntityKind::Index)
            .unwrap();
        assert_eq!(req.entity.code, "000300.SH");
        assert_eq!(req.entity.display_name, "000300.SH");

        let err = AnalysisRequest::parse("", "2016-01-01", "2020-12-09", "x", EntityKind::Index)
            .unwrap_err();
        assert!(matches!(err, VantageError::InvalidArgument(_)));

        let err = AnalysisRequest::parse("x", "2016-13-01", "2020-12-09", "x", EntityKind::Index)
            .unwrap_err();
        assert!(matches!(err, VantageError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn test_valuation_clips_window() {
        let provider = Scripted::new(pe_rows());
        let report = valuation(&provider, &equity("2016-01-10", "2016-01-20"))
            .await
            .unwrap();
        // Offsets 6..=16 from the base date, minus the one never sent
        assert_eq!(report.series.len(), 10);
        assert!(report.series.index().iter().all(|d| report.window.contains(*d)));
    }

    #[tokio::test]
    async fn test_empty_response() {
        let provider = Scripted::new(Vec::new());
        let err = valuation(&provider, &equity("2016-01-01", "2021-03-09"))
            .await
            .unwrap_err();
        assert!(matches!(err, VantageError::EmptyInput(_)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_missing_pe() {
        let provider = Scripted::new(vec![(
            "2020-01-02".to_string(),
            vec![RawValue::Text("--".to_string())],
        )]);
        let err = valuation(&provider, &equity("2016-01-01", "2021-03-09"))
            .await
            .unwrap_err();
        assert!(matches!(err, VantageError::EmptySeries(_)));
    }

    #[tokio::test]
    async fn test_fundamentals() {
        let row = |ts: &str, values: [Option<f64>; 5]| -> (String, Vec<RawValue>) {
            (
                ts.to_string(),
                values.iter().map(|v| RawValue::from(*v)).collect(),
            )
        };
        let provider = Scripted::new(vec![
            row("2020-03-31", [Some(4.0), Some(30.0), None, Some(-10.0), Some(3.0)]),
            row("2020-06-30", [Some(9.0), None, Some(5.0), Some(2.0), Some(6.0)]),
            row("2020-09-30", [Some(14.0), Some(32.0), Some(8.0), Some(6.0), Some(9.0)]),
        ]);
        let request = equity("2016-01-01", "2021-03-09");

        let report = fundamentals(&provider, &request, GapPolicy::LeaveMissing)
            .await
            .unwrap();
        assert_eq!(report.series.len(), 3);
        assert_eq!(
            report.series.column_names(),
            vec![
                "roe_ttm",
                "net_margin_ttm",
                "revenue_yoy",
                "net_profit_yoy",
                "roa_ttm"
            ]
        );
        assert_eq!(
            report.series.column("net_margin_ttm").unwrap().values,
            vec![Some(30.0), None, Some(32.0)]
        );

        let filled = fundamentals(&provider, &request, GapPolicy::ForwardFill)
            .await
            .unwrap();
        assert_eq!(
            filled.series.column("net_margin_ttm").unwrap().values,
            vec![Some(30.0), Some(30.0), Some(32.0)]
        );
        assert_eq!(
            filled.series.column("revenue_yoy").unwrap().values,
            vec![None, Some(5.0), Some(8.0)]
        );
        assert_eq!(provider.calls(), 2);
    }

    /// Provider labeling its columns in reverse request order.
    struct Reversed;

    #[async_trait]
    impl MarketDataProvider for Reversed {
        fn name(&self) -> &str {
            "reversed"
        }

        async fn fetch(&self, request: &DataRequest) -> Result<RawBatch> {
            let columns: Vec<String> = request.metrics.iter().rev().map(|m| m.id.clone()).collect();
            let values = (0..columns.len()).map(|i| RawValue::Number(i as f64)).collect();
            Ok(RawBatch::new(request.code.clone(), columns).with_row("2020-03-31", values))
        }
    }

    #[tokio::test]
    async fn test_fundamentals_rejects_reordered_columns() {
        let err = fundamentals(
            &Reversed,
            &equity("2016-01-01", "2021-03-09"),
            GapPolicy::LeaveMissing,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, VantageError::SchemaMismatch(_)));
    }

    #[tokio::test]
    async fn test_fundamentals_rejects_wrong_width() {
        let provider = Scripted::new(vec![(
            "2020-03-31".to_string(),
            vec![RawValue::Number(1.0)],
        )]);
        let err = fundamentals(
            &provider,
            &equity("2016-01-01", "2021-03-09"),
            GapPolicy::LeaveMissing,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, VantageError::SchemaMismatch(_)));
    }

    #[test]
    fn test_zone() {
        assert_eq!(ValuationZone::from_percentile(0.0), ValuationZone::Low);
        assert_eq!(ValuationZone::from_percentile(20.0), ValuationZone::Neutral);
        assert_eq!(ValuationZone::from_percentile(80.0), ValuationZone::Neutral);
        assert_eq!(ValuationZone::from_percentile(80.5), ValuationZone::High);
        assert_eq!(ValuationZone::High.to_string(), "high");
    }
}
