//! Valuation and fundamentals charts.

use tracing::debug;
use vantage_series::PERCENTILE_COLUMN;
use vantage_series::catalog::metric_info;
use vantage_traits::{NormalizedSeries, Result, VantageError};

use crate::config::RendererConfig;
use crate::svg::{Frame, LinePanel, draw_panel, svg_footer, svg_header};

/// Panels per row in the fundamentals grid.
const GRID_COLUMNS: usize = 2;

fn label_for(field: &str) -> &str {
    metric_info(field).map_or(field, |info| info.label)
}

fn ensure_rows(series: &NormalizedSeries) -> Result<()> {
    if series.is_empty() {
        return Err(VantageError::Render(format!(
            "no rows to chart for {}",
            series.code()
        )));
    }
    Ok(())
}

/// Render the valuation chart.
///
/// Two stacked panels: the historical percentile of `metric` on a fixed
/// 0 to 100 axis with a guide at 50, then the level of `metric` itself.
///
/// # Errors
///
/// - [`VantageError::MissingColumn`] if `metric` or the percentile column is absent
/// - [`VantageError::Render`] if the series has no rows
pub fn render_valuation(
    series: &NormalizedSeries,
    metric: &str,
    display_name: &str,
    config: &RendererConfig,
) -> Result<String> {
    ensure_rows(series)?;
    let level = series
        .column(metric)
        .ok_or_else(|| VantageError::MissingColumn(metric.to_string()))?;
    let percentile = series
        .column(PERCENTILE_COLUMN)
        .ok_or_else(|| VantageError::MissingColumn(PERCENTILE_COLUMN.to_string()))?;

    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let label = label_for(metric);

    let mut svg = svg_header(width, 2.0 * height, config);
    draw_panel(
        &mut svg,
        Frame::new(0.0, 0.0, width, height),
        &LinePanel {
            title: &format!("{display_name} {label} historical percentile"),
            dates: series.index(),
            values: &percentile.values,
            color: &config.primary_color,
            range: Some((0.0, 100.0)),
            guide: Some(50.0),
        },
        config,
    );
    draw_panel(
        &mut svg,
        Frame::new(0.0, height, width, height),
        &LinePanel {
            title: &format!("{display_name} {label}"),
            dates: series.index(),
            values: &level.values,
            color: &config.primary_color,
            range: None,
            guide: None,
        },
        config,
    );
    svg.push_str(svg_footer());

    debug!(code = series.code(), rows = series.len(), "rendered valuation chart");
    Ok(svg)
}

/// Render the fundamentals chart.
///
/// One panel per metric column, laid out two per row in column order.
/// Panels alternate between the primary and secondary colors diagonally.
///
/// # Errors
///
/// Returns [`VantageError::Render`] if the series has no rows or no metrics.
pub fn render_fundamentals(
    series: &NormalizedSeries,
    display_name: &str,
    config: &RendererConfig,
) -> Result<String> {
    ensure_rows(series)?;
    let columns = series.columns();
    if columns.is_empty() {
        return Err(VantageError::Render(format!(
            "no metrics to chart for {}",
            series.code()
        )));
    }

    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let rows = columns.len().div_ceil(GRID_COLUMNS);
    let grid_width = if columns.len() > 1 { GRID_COLUMNS } else { 1 };

    let mut svg = svg_header(width * grid_width as f64, height * rows as f64, config);
    for (i, column) in columns.iter().enumerate() {
        let (row, col) = (i / GRID_COLUMNS, i % GRID_COLUMNS);
        let color = if (row + col) % 2 == 0 {
            &config.primary_color
        } else {
            &config.secondary_color
        };
        draw_panel(
            &mut svg,
            Frame::new(col as f64 * width, row as f64 * height, width, height),
            &LinePanel {
                title: &format!("{display_name} {}", label_for(&column.name)),
                dates: series.index(),
                values: &column.values,
                color,
                range: None,
                guide: None,
            },
            config,
        );
    }
    svg.push_str(svg_footer());

    debug!(
        code = series.code(),
        panels = columns.len(),
        "rendered fundamentals chart"
    );
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_series::compute_historical_percentile;
    use vantage_traits::{Date, EntityKind, MetricColumn};

    fn dates(n: usize) -> Vec<Date> {
        let base = Date::from_ymd_opt(2019, 3, 31).unwrap();
        (0..n)
            .map(|i| base + chrono::Duration::days(91 * i as i64))
            .collect()
    }

    fn valuation_series() -> NormalizedSeries {
        let series = NormalizedSeries::new(
            "000596.SZ",
            EntityKind::Equity,
            dates(4),
            vec![MetricColumn::new(
                "pe_ttm",
                vec![Some(30.0), Some(45.0), None, Some(38.0)],
            )],
        )
        .unwrap();
        compute_historical_percentile(&series, "pe_ttm").unwrap()
    }

    fn fundamentals_series(metrics: &[&str]) -> NormalizedSeries {
        let columns = metrics
            .iter()
            .map(|m| MetricColumn::new(*m, vec![Some(1.0), None, Some(2.0)]))
            .collect();
        NormalizedSeries::new("000300.SH", EntityKind::Index, dates(3), columns).unwrap()
    }

    #[test]
    fn test_render_valuation() {
        let svg = render_valuation(
            &valuation_series(),
            "pe_ttm",
            "Gujing Gongjiu",
            &RendererConfig::for_valuation(),
        )
        .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"height="1200""#));
        assert!(svg.contains("Gujing Gongjiu PE_TTM historical percentile"));
        assert!(svg.contains("Gujing Gongjiu PE_TTM</text>"));
        assert_eq!(svg.matches("class=\"guide\"").count(), 1);
        assert!(svg.contains("font-size:16px"));
    }

    #[test]
    fn test_render_valuation_escapes_name() {
        let svg = render_valuation(
            &valuation_series(),
            "pe_ttm",
            "<A&B>",
            &RendererConfig::default(),
        )
        .unwrap();
        assert!(svg.contains("&lt;A&amp;B&gt;"));
        assert!(!svg.contains("<A&B>"));
    }

    #[test]
    fn test_render_valuation_requires_percentile() {
        let series = fundamentals_series(&["pe_ttm"]);
        let err =
            render_valuation(&series, "pe_ttm", "x", &RendererConfig::default()).unwrap_err();
        assert!(matches!(err, VantageError::MissingColumn(_)));

        let err = render_valuation(&valuation_series(), "pb", "x", &RendererConfig::default())
            .unwrap_err();
        assert!(matches!(err, VantageError::MissingColumn(_)));
    }

    #[test]
    fn test_render_fundamentals_grid() {
        let series = fundamentals_series(&[
            "roe_ttm",
            "net_margin_ttm",
            "revenue_yoy",
            "net_profit_yoy",
            "roa_ttm",
        ]);
        let config = RendererConfig::default();
        let svg = render_fundamentals(&series, "CSI 300", &config).unwrap();

        // Five panels on a two-column grid need three rows
        assert!(svg.contains(r#"width="2000" height="1800""#));
        assert_eq!(svg.matches(r#"class="title""#).count(), 5);
        assert!(svg.contains("CSI 300 ROE_TTM"));
        assert!(svg.contains("CSI 300 Revenue YoY"));
        assert!(svg.contains(&format!(r#"fill="{}""#, config.secondary_color)));
    }

    #[test]
    fn test_render_fundamentals_unknown_field_uses_name() {
        let series = fundamentals_series(&["custom_metric"]);
        let svg = render_fundamentals(&series, "X", &RendererConfig::default()).unwrap();
        assert!(svg.contains("X custom_metric"));
        assert!(svg.contains(r#"width="1000" height="600""#));
    }

    #[test]
    fn test_render_empty_series() {
        let series =
            NormalizedSeries::new("000300.SH", EntityKind::Index, Vec::new(), Vec::new()).unwrap();
        let err = render_fundamentals(&series, "x", &RendererConfig::default()).unwrap_err();
        assert!(matches!(err, VantageError::Render(_)));
    }
}
