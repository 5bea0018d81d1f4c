//! Command-line interface for equity-research
//!
//! ```bash
//! # Yahoo Finance, default assumptions
//! equity-research PRU
//!
//! # Alpha Vantage with a tighter DDM and chart data on disk
//! export ALPHA_VANTAGE_API_KEY=your_key_here
//! equity-research PRU --provider alpha-vantage --required-return 0.09 --chart-dir charts
//! ```

mod cli;

use anyhow::Context;
use clap::Parser;
use equity_valuation::report::format_projection_table;
use equity_valuation::{analyze, provider_from_config};
use tracing::info;

use crate::cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    equity_utils::init_tracing_with_default("warn,equity_valuation=info");

    let args = Args::parse();
    let config = args.to_config().context("invalid configuration")?;
    let provider = provider_from_config(&config)?;

    info!(ticker = %args.ticker, provider = %config.provider, "starting analysis");

    let report = analyze(provider.as_ref(), &args.ticker, &config)
        .await
        .with_context(|| format!("failed to analyze {}", args.ticker))?;

    println!("{}", report.summary());

    if args.no_charts {
        return Ok(());
    }

    if let Ok(projection) = &report.projection {
        println!("\nDividend Projection:");
        println!("{}", format_projection_table(projection));
    }

    if let Some(dir) = &args.chart_dir {
        let written = report
            .charts
            .write_json(dir)
            .with_context(|| format!("failed to write charts to {}", dir.display()))?;
        for path in written {
            println!("Chart data: {}", path.display());
        }
    }

    Ok(())
}
