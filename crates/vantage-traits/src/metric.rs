//! Declared mapping from provider indicator to semantic field.

use serde::{Deserialize, Serialize};

/// One requested metric.
///
/// A spec ties the provider's indicator id (and its scaling parameter) to the
/// field name the metric carries once normalized. Requests are built from a
/// list of specs, so ids and parameters can never drift out of step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Provider indicator id, e.g. `ths_pe_ttm_stock`.
    pub id: String,
    /// Field name in the normalized series, e.g. `pe_ttm`.
    pub field: String,
    /// Scaling/adjustment parameter passed with the indicator; empty for none.
    #[serde(default)]
    pub param: String,
    /// Label used on charts.
    pub label: String,
}

impl MetricSpec {
    /// Creates a spec with no parameter and the field name as label.
    pub fn new(id: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            id: id.into(),
            label: field.clone(),
            field,
            param: String::new(),
        }
    }

    /// Sets the provider parameter.
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Sets the chart label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let spec = MetricSpec::new("ths_pe_ttm_stock", "pe_ttm")
            .with_param("100")
            .with_label("PE_TTM");
        assert_eq!(spec.id, "ths_pe_ttm_stock");
        assert_eq!(spec.field, "pe_ttm");
        assert_eq!(spec.param, "100");
        assert_eq!(spec.label, "PE_TTM");
    }

    #[test]
    fn test_default_label() {
        let spec = MetricSpec::new("ths_np_yoy_stock", "net_profit_yoy");
        assert_eq!(spec.label, "net_profit_yoy");
        assert!(spec.param.is_empty());
    }
}
