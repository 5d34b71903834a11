//! SVG building blocks shared by the chart renderers.

use chrono::Datelike;
use vantage_traits::Date;

use crate::config::RendererConfig;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
const Y_TICKS: usize = 4;

/// Rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Frame {
    pub(crate) const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Plotting area left after axis and title margins.
    fn inner(&self) -> Self {
        Self {
            x: self.x + MARGIN_LEFT,
            y: self.y + MARGIN_TOP,
            width: (self.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        }
    }
}

/// One line panel.
#[derive(Debug)]
pub(crate) struct LinePanel<'a> {
    pub(crate) title: &'a str,
    pub(crate) dates: &'a [Date],
    pub(crate) values: &'a [Option<f64>],
    pub(crate) color: &'a str,
    /// Fixed value axis; derived from the data when absent.
    pub(crate) range: Option<(f64, f64)>,
    /// Horizontal guide line value.
    pub(crate) guide: Option<f64>,
}

/// Escape text for use in element content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn svg_header(width: f64, height: f64, config: &RendererConfig) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:{font};font-size:{tick}px;fill:#333}}.title{{font-size:{title}px;fill:#000}}</style><rect width="100%" height="100%" fill="white" />"#,
        w = width,
        h = height,
        font = escape(&config.font_family),
        tick = config.tick_font_size,
        title = config.tick_font_size + 4,
    )
}

pub(crate) const fn svg_footer() -> &'static str {
    "</svg>"
}

/// Observed value range, widened when flat.
fn value_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if !lo.is_finite() {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        return Some((lo - 1.0, hi + 1.0));
    }
    Some((lo, hi))
}

/// Horizontal positions proportional to elapsed calendar time.
fn time_positions(dates: &[Date], plot: Frame) -> Vec<f64> {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };
    let span = (*last - *first).num_days();
    if span <= 0 {
        return vec![plot.x + plot.width / 2.0; dates.len()];
    }
    dates
        .iter()
        .map(|d| plot.x + plot.width * (*d - *first).num_days() as f64 / span as f64)
        .collect()
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 || value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn polyline(points: &[(f64, f64)], stroke: &str) -> String {
    let coords = points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="1.5" points="{coords}" />"#,
        stroke = escape(stroke),
    )
}

/// Emit the pending segment; isolated points become dots.
fn flush_segment(svg: &mut String, segment: &mut Vec<(f64, f64)>, stroke: &str) {
    match segment.as_slice() {
        [] => {}
        [(x, y)] => svg.push_str(&format!(
            r#"<circle cx="{x:.2}" cy="{y:.2}" r="2" fill="{fill}" />"#,
            fill = escape(stroke)
        )),
        points => svg.push_str(&polyline(points, stroke)),
    }
    segment.clear();
}

/// Draw a titled line panel into `frame`.
pub(crate) fn draw_panel(
    svg: &mut String,
    frame: Frame,
    panel: &LinePanel<'_>,
    config: &RendererConfig,
) {
    let plot = frame.inner();

    svg.push_str(&format!(
        r#"<text class="title" x="{x:.2}" y="{y:.2}" text-anchor="middle">{title}</text>"#,
        x = plot.x + plot.width / 2.0,
        y = frame.y + MARGIN_TOP / 2.0 + 6.0,
        title = escape(panel.title),
    ));
    svg.push_str(&format!(
        r##"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="none" stroke="#999" stroke-width="1" />"##,
        x = plot.x,
        y = plot.y,
        w = plot.width,
        h = plot.height,
    ));

    let (lo, hi) = panel
        .range
        .or_else(|| value_range(panel.values))
        .unwrap_or((0.0, 1.0));
    let scale_y = |v: f64| plot.y + plot.height * (1.0 - (v - lo) / (hi - lo));

    for i in 0..=Y_TICKS {
        let value = lo + (hi - lo) * i as f64 / Y_TICKS as f64;
        let y = scale_y(value);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#e5e5e5" stroke-width="0.5" />"##,
            x1 = plot.x,
            x2 = plot.x + plot.width,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end" dominant-baseline="middle">{label}</text>"#,
            x = plot.x - 8.0,
            label = format_tick(value),
        ));
    }

    let xs = time_positions(panel.dates, plot);
    let axis_y = plot.y + plot.height;
    let mut last_year = None;
    for (date, x) in panel.dates.iter().zip(&xs) {
        if last_year == Some(date.year()) {
            continue;
        }
        last_year = Some(date.year());
        svg.push_str(&format!(
            r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#999" stroke-width="1" />"##,
            y1 = axis_y,
            y2 = axis_y + 5.0,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            y = axis_y + 8.0 + config.tick_font_size as f64,
            label = date.year(),
        ));
    }

    if let Some(guide) = panel.guide {
        svg.push_str(&format!(
            r#"<line class="guide" x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{stroke}" stroke-width="1" stroke-dasharray="6,4" />"#,
            x1 = plot.x,
            x2 = plot.x + plot.width,
            y = scale_y(guide),
            stroke = escape(&config.guide_color),
        ));
    }

    let mut segment = Vec::new();
    for (x, value) in xs.iter().zip(panel.values) {
        match value {
            Some(v) if v.is_finite() => segment.push((*x, scale_y(*v))),
            _ => flush_segment(svg, &mut segment, panel.color),
        }
    }
    flush_segment(svg, &mut segment, panel.color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"A&B <"x"> 'y'"#), "A&amp;B &lt;&quot;x&quot;&gt; &apos;y&apos;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[Some(2.0), None, Some(-1.0)]), Some((-1.0, 2.0)));
        assert_eq!(value_range(&[Some(3.0)]), Some((2.0, 4.0)));
        assert_eq!(value_range(&[None, Some(f64::NAN)]), None);
    }

    #[test]
    fn test_time_positions() {
        let plot = Frame::new(0.0, 0.0, 100.0, 10.0);
        let xs = time_positions(&[d(2020, 1, 1), d(2020, 1, 2), d(2020, 1, 5)], plot);
        assert_eq!(xs, vec![0.0, 25.0, 100.0]);
        assert_eq!(time_positions(&[d(2020, 1, 1)], plot), vec![50.0]);
        assert!(time_positions(&[], plot).is_empty());
    }

    #[test]
    fn test_missing_values_break_line() {
        let dates = [
            d(2020, 1, 1),
            d(2020, 1, 2),
            d(2020, 1, 3),
            d(2020, 1, 4),
            d(2020, 1, 5),
            d(2020, 1, 6),
        ];
        let values = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), None];
        let panel = LinePanel {
            title: "t",
            dates: &dates,
            values: &values,
            color: "red",
            range: None,
            guide: None,
        };
        let mut svg = String::new();
        draw_panel(&mut svg, Frame::new(0.0, 0.0, 400.0, 300.0), &panel, &RendererConfig::default());
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 0);
        assert!(!svg.contains("class=\"guide\""));
    }

    #[test]
    fn test_isolated_point_is_dot() {
        let dates = [d(2020, 1, 1), d(2020, 1, 2), d(2020, 1, 3)];
        let values = [None, Some(2.0), None];
        let panel = LinePanel {
            title: "t",
            dates: &dates,
            values: &values,
            color: "red",
            range: Some((0.0, 100.0)),
            guide: Some(50.0),
        };
        let mut svg = String::new();
        draw_panel(&mut svg, Frame::new(0.0, 0.0, 400.0, 300.0), &panel, &RendererConfig::default());
        assert_eq!(svg.matches("<polyline").count(), 0);
        assert_eq!(svg.matches("<circle").count(), 1);
        assert_eq!(svg.matches("class=\"guide\"").count(), 1);
    }

    #[test]
    fn test_year_ticks() {
        let dates = [d(2019, 12, 31), d(2020, 3, 31), d(2020, 6, 30), d(2021, 3, 31)];
        let values = [Some(1.0); 4];
        let panel = LinePanel {
            title: "t",
            dates: &dates,
            values: &values,
            color: "red",
            range: None,
            guide: None,
        };
        let mut svg = String::new();
        draw_panel(&mut svg, Frame::new(0.0, 0.0, 400.0, 300.0), &panel, &RendererConfig::default());
        assert!(svg.contains(">2019</text>"));
        assert!(svg.contains(">2020</text>"));
        assert!(svg.contains(">2021</text>"));
        assert_eq!(svg.matches(">2020</text>").count(), 1);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(50.0), "50");
        assert_eq!(format_tick(12.34), "12.3");
        assert_eq!(format_tick(123.4), "123");
    }
}
