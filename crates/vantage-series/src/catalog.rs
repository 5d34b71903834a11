//! Metric catalog.
//!
//! Declares, per analysis and entity kind, which provider indicators are
//! requested, with which parameters, and which field each one becomes. The
//! normalizer validates provider columns against these declarations instead
//! of renaming whatever comes back.

use serde::{Deserialize, Serialize};
use vantage_traits::{DataRequest, EntityKind, EntityRef, MetricSpec, QueryWindow};

/// Field holding the trailing price-to-earnings ratio.
pub const PE_TTM: &str = "pe_ttm";

/// Analysis families the catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Analysis {
    /// Daily valuation level and its historical percentile
    Valuation,
    /// Quarterly profitability and growth metrics
    Fundamentals,
}

impl Analysis {
    /// Get a human-readable description of the analysis.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Valuation => "Trailing P/E and its time-weighted historical percentile",
            Self::Fundamentals => "ROE, net margin, revenue and profit growth, ROA by quarter",
        }
    }
}

/// Catalog entry for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricInfo {
    /// Field name in normalized series
    pub field: &'static str,

    /// Chart label
    pub label: &'static str,

    /// Indicator id when the entity is an index
    pub index_id: &'static str,

    /// Indicator id when the entity is an equity
    pub equity_id: &'static str,

    /// Provider parameter for index requests
    pub index_param: &'static str,

    /// Provider parameter for equity requests
    pub equity_param: &'static str,

    /// Analysis the metric belongs to
    pub analysis: Analysis,
}

impl MetricInfo {
    /// Build the request spec for an entity kind.
    #[must_use]
    pub fn spec(&self, kind: EntityKind) -> MetricSpec {
        let (id, param) = match kind {
            EntityKind::Index => (self.index_id, self.index_param),
            EntityKind::Equity => (self.equity_id, self.equity_param),
        };
        MetricSpec::new(id, self.field)
            .with_param(param)
            .with_label(self.label)
    }
}

const METRICS: &[MetricInfo] = &[
    MetricInfo {
        field: PE_TTM,
        label: "PE_TTM",
        index_id: "ths_pe_ttm_index",
        equity_id: "ths_pe_ttm_stock",
        index_param: "100,100",
        equity_param: "100",
        analysis: Analysis::Valuation,
    },
    MetricInfo {
        field: "roe_ttm",
        label: "ROE_TTM",
        index_id: "ths_roe_ttm_index",
        equity_id: "ths_roe_ttm_stock",
        index_param: "100",
        equity_param: "100",
        analysis: Analysis::Fundamentals,
    },
    MetricInfo {
        field: "net_margin_ttm",
        label: "Net margin TTM",
        index_id: "ths_sale_net_rate_ttm_index",
        equity_id: "ths_sales_gir_ttm_stock",
        index_param: "100",
        equity_param: "100",
        analysis: Analysis::Fundamentals,
    },
    MetricInfo {
        field: "revenue_yoy",
        label: "Revenue YoY",
        index_id: "ths_total_revenue_yoy_index",
        equity_id: "ths_operating_revenue_yoy_stock",
        index_param: "",
        equity_param: "",
        analysis: Analysis::Fundamentals,
    },
    MetricInfo {
        field: "net_profit_yoy",
        label: "Net profit YoY",
        index_id: "ths_total_np_yoy_index",
        equity_id: "ths_np_yoy_stock",
        index_param: "",
        equity_param: "",
        analysis: Analysis::Fundamentals,
    },
    MetricInfo {
        field: "roa_ttm",
        label: "ROA_TTM",
        index_id: "ths_roa_ttm_index",
        equity_id: "ths_roa_ttm_stock",
        index_param: "100",
        equity_param: "100",
        analysis: Analysis::Fundamentals,
    },
];

/// Get information about all catalogued metrics.
#[must_use]
pub fn available_metrics() -> &'static [MetricInfo] {
    METRICS
}

/// Get information about a metric by field name.
#[must_use]
pub fn metric_info(field: &str) -> Option<&'static MetricInfo> {
    METRICS.iter().find(|m| m.field == field)
}

/// Request specs for an analysis, in catalog order.
#[must_use]
pub fn metrics_for(analysis: Analysis, kind: EntityKind) -> Vec<MetricSpec> {
    METRICS
        .iter()
        .filter(|m| m.analysis == analysis)
        .map(|m| m.spec(kind))
        .collect()
}

/// Valuation metric set (trailing P/E only).
#[must_use]
pub fn valuation_metrics(kind: EntityKind) -> Vec<MetricSpec> {
    metrics_for(Analysis::Valuation, kind)
}

/// Fundamental metric set.
#[must_use]
pub fn fundamental_metrics(kind: EntityKind) -> Vec<MetricSpec> {
    metrics_for(Analysis::Fundamentals, kind)
}

/// Cadence/fill directives sent with each request.
#[must_use]
pub const fn directives(analysis: Analysis, kind: EntityKind) -> &'static str {
    match (analysis, kind) {
        (Analysis::Valuation, EntityKind::Index) => "block:history",
        (Analysis::Valuation, EntityKind::Equity) => "",
        (Analysis::Fundamentals, EntityKind::Index) => {
            "Days:Alldays,Fill:Blank,Interval:Q,block:history"
        }
        (Analysis::Fundamentals, EntityKind::Equity) => {
            "Days:Alldays,Fill:Blank,Interval:Q,block:latest"
        }
    }
}

/// Provider request for an analysis of `entity` over `window`.
#[must_use]
pub fn request(analysis: Analysis, entity: &EntityRef, window: QueryWindow) -> DataRequest {
    DataRequest {
        code: entity.code.clone(),
        metrics: metrics_for(analysis, entity.kind),
        directives: directives(analysis, entity.kind).to_string(),
        window,
    }
}
