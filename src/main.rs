use anyhow::Result;
use clap::Parser;
use covid_dash::{load_dashboard, DataSet, Dashboard, SourceConfig};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Cli, Command, ExportTable};

#[tokio::main]
async fn main() -> Result<()> {
    // 日志写到 stderr，stdout 只输出 JSON
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let selection = cli::selection(&cli.command)?;
    let config = SourceConfig::from(&cli);
    let dashboard = load_dashboard(&config).await?;
    info!("dashboard ready");

    let output = match &cli.command {
        Command::Line { .. } => serde_json::to_string_pretty(&dashboard.line_chart(&selection)?)?,
        Command::Top { .. } => serde_json::to_string_pretty(&dashboard.top_n_chart(&selection)?)?,
        Command::Map { .. } => serde_json::to_string_pretty(&dashboard.map_chart(&selection)?)?,
        Command::Detail { .. } => {
            serde_json::to_string_pretty(&dashboard.detail_chart(&selection)?)?
        }
        Command::Info { .. } => {
            let info = dashboard.country_info(&selection);
            serde_json::to_string_pretty(&json!({ "text": info.to_string(), "info": info }))?
        }
        Command::Options => serde_json::to_string_pretty(&json!({
            "countries": dashboard.country_options(),
            "metrics": Dashboard::metric_options(),
            "map_metrics": Dashboard::map_metric_options(),
        }))?,
        Command::Export { table, out } => {
            let ds = match table {
                ExportTable::Deaths => DataSet::try_from(dashboard.deaths())?,
                ExportTable::Highs => DataSet::try_from(dashboard.highs()?)?,
                ExportTable::Map => DataSet::try_from(dashboard.map()?)?,
            };
            let csv = ds.to_csv()?;
            match out {
                Some(path) => {
                    tokio::fs::write(path, &csv).await?;
                    info!("wrote {} rows to {}", ds.height(), path.display());
                    return Ok(());
                }
                None => csv,
            }
        }
    };

    println!("{}", output);
    Ok(())
}
