//! Fundamentals command implementation.

use super::{TargetArgs, write_file};
use anyhow::Result;
use vantage::report::{RendererConfig, render_fundamentals};
use vantage::series::GapPolicy;
use vantage::{AnalysisRequest, MarketDataProvider, fundamentals};

/// Fetch, align and chart the fundamental metrics.
pub(crate) async fn run(
    provider: &dyn MarketDataProvider,
    request: &AnalysisRequest,
    target: &TargetArgs,
    gap_policy: GapPolicy,
) -> Result<()> {
    let report = fundamentals(provider, request, gap_policy).await?;
    let config = target.renderer(RendererConfig::default());

    let svg = render_fundamentals(&report.series, &report.entity.display_name, &config)?;
    write_file(&target.output_path(request, "fundamentals.svg")?, &svg)?;

    if target.csv {
        let path = target.output_path(request, "fundamentals.csv")?;
        report.series.write_csv(&path)?;
        println!("Wrote {}", path.display());
    }

    println!(
        "\n{} ({}) {} quarters",
        report.entity.display_name,
        report.entity.code,
        report.series.len()
    );
    for column in report.series.columns() {
        if let Some((date, value)) = report.series.latest(&column.name) {
            println!("  {:<16} {value:>10.2}  ({date})", column.name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::tests::{Canned, target};

    #[tokio::test]
    async fn test_writes_chart() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_path_buf();
        let args = target(out.clone(), false);
        let request = args.request().unwrap();

        run(&Canned, &request, &args, GapPolicy::ForwardFill)
            .await
            .unwrap();

        let svg = std::fs::read_to_string(out.join("000596_SZ_fundamentals.svg")).unwrap();
        assert!(svg.contains("Gujing Gongjiu ROE_TTM"));
        assert!(svg.contains("Gujing Gongjiu ROA_TTM"));
    }
}
