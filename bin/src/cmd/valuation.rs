//! Valuation command implementation.

use super::{TargetArgs, write_file};
use anyhow::Result;
use vantage::report::{RendererConfig, render_valuation};
use vantage::series::catalog::PE_TTM;
use vantage::{AnalysisRequest, MarketDataProvider, valuation};

/// Fetch, rank and chart the valuation history.
pub(crate) async fn run(
    provider: &dyn MarketDataProvider,
    request: &AnalysisRequest,
    target: &TargetArgs,
) -> Result<()> {
    let report = valuation(provider, request).await?;
    let config = target.renderer(RendererConfig::for_valuation());

    let svg = render_valuation(
        &report.series,
        PE_TTM,
        &report.entity.display_name,
        &config,
    )?;
    write_file(&target.output_path(request, "valuation.svg")?, &svg)?;

    if target.csv {
        let path = target.output_path(request, "valuation.csv")?;
        report.series.write_csv(&path)?;
        println!("Wrote {}", path.display());
    }

    println!(
        "\n{} ({}) {}",
        report.entity.display_name, report.entity.code, report.window
    );
    match report.latest() {
        Some(latest) => println!(
            "  {}: PE_TTM {:.2}, historical percentile {:.1}% ({})",
            latest.date, latest.pe_ttm, latest.percentile, latest.zone
        ),
        None => println!("  no complete observation"),
    }
    Ok(())
}
