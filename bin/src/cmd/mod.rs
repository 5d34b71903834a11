//! CLI subcommand modules.

pub(crate) mod fundamentals;
pub(crate) mod valuation;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vantage::ifind::IfindClient;
use vantage::report::RendererConfig;
use vantage::series::GapPolicy;
use vantage::{AnalysisRequest, EntityKind};

/// Entity, window and output options shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct TargetArgs {
    /// Entity code (e.g., 000300.SH or 000596.SZ)
    #[arg(long)]
    pub(crate) code: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) end: String,

    /// Display name used in chart titles (defaults to the code)
    #[arg(long, default_value = "")]
    pub(crate) name: String,

    /// Entity kind (index or equity)
    #[arg(long, default_value = "index")]
    pub(crate) kind: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub(crate) out: PathBuf,

    /// Also write the series as CSV
    #[arg(long)]
    pub(crate) csv: bool,

    /// Tick label font size
    #[arg(long)]
    pub(crate) tick_font_size: Option<u32>,

    /// Provider request timeout in seconds
    #[arg(long, default_value = "30")]
    pub(crate) timeout: u64,
}

impl TargetArgs {
    /// Validated request; fails before any network traffic.
    pub(crate) fn request(&self) -> Result<AnalysisRequest> {
        let kind: EntityKind = self.kind.parse()?;
        Ok(AnalysisRequest::parse(
            &self.code, &self.start, &self.end, &self.name, kind,
        )?)
    }

    pub(crate) fn renderer(&self, mut config: RendererConfig) -> RendererConfig {
        if let Some(size) = self.tick_font_size {
            config.tick_font_size = size;
        }
        config
    }

    /// Output path `<out>/<code>_<suffix>`, creating the directory.
    pub(crate) fn output_path(&self, request: &AnalysisRequest, suffix: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.out)
            .with_context(|| format!("creating {}", self.out.display()))?;
        Ok(self.out.join(format!(
            "{}_{suffix}",
            file_stem(&request.entity.code)
        )))
    }
}

/// Gap policy choices on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum GapArg {
    /// Leave gaps missing
    Missing,
    /// Carry the previous value forward
    Ffill,
}

impl From<GapArg> for GapPolicy {
    fn from(arg: GapArg) -> Self {
        match arg {
            GapArg::Missing => Self::LeaveMissing,
            GapArg::Ffill => Self::ForwardFill,
        }
    }
}

/// Log in to iFinD with the refresh token from the environment.
pub(crate) async fn connect(target: &TargetArgs) -> Result<IfindClient> {
    IfindClient::from_env(Duration::from_secs(target.timeout))
        .await
        .context("connecting to iFinD")
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// File-name friendly form of an entity code.
fn file_stem(code: &str) -> String {
    code.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use vantage::MarketDataProvider;
    use vantage_traits::{DataRequest, RawBatch, RawValue};

    /// Provider returning the same values for every requested metric.
    pub(crate) struct Canned;

    #[async_trait]
    impl MarketDataProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn fetch(&self, request: &DataRequest) -> vantage::Result<RawBatch> {
            let columns: Vec<String> = request.metrics.iter().map(|m| m.id.clone()).collect();
            let width = columns.len();
            let mut batch = RawBatch::new(request.code.clone(), columns);
            for (i, ts) in ["2020-03-31", "2020-06-30", "2020-09-30"].iter().enumerate() {
                batch.push_row(*ts, vec![RawValue::Number(10.0 + i as f64); width]);
            }
            Ok(batch)
        }
    }

    pub(crate) fn target(out: PathBuf, csv: bool) -> TargetArgs {
        TargetArgs {
            code: "000596.SZ".to_string(),
            start: "2016-01-01".to_string(),
            end: "2021-03-09".to_string(),
            name: "Gujing Gongjiu".to_string(),
            kind: "equity".to_string(),
            out,
            csv,
            tick_font_size: None,
            timeout: 30,
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("000596.SZ"), "000596_SZ");
    }

    #[test]
    fn test_request_validation() {
        let mut args = target(PathBuf::from("."), false);
        assert!(args.request().is_ok());

        args.start = "2022-01-01".to_string();
        assert!(args.request().is_err());

        args.start = "2016-01-01".to_string();
        args.kind = "bond".to_string();
        assert!(args.request().is_err());
    }

    #[test]
    fn test_renderer_override() {
        let mut args = target(PathBuf::from("."), false);
        assert_eq!(args.renderer(RendererConfig::for_valuation()).tick_font_size, 16);
        args.tick_font_size = Some(11);
        assert_eq!(args.renderer(RendererConfig::default()).tick_font_size, 11);
    }

    #[test]
    fn test_gap_arg() {
        assert_eq!(GapPolicy::from(GapArg::Ffill), GapPolicy::ForwardFill);
        assert_eq!(GapPolicy::from(GapArg::Missing), GapPolicy::LeaveMissing);
    }
}
