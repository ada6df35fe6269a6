use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use uuid::Uuid;

use launch_etl::config::Config;
use launch_etl::infra::http_client::ReqwestHttp;
use launch_etl::logging;
use launch_etl::pipeline::Pipeline;

/// Settings come from `config.toml` in the working directory, if present.
#[derive(Parser)]
#[command(name = "launch_etl")]
#[command(about = "Build the Falcon 9 launch dataset from the SpaceX API")]
#[command(version)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();
    let _guard = logging::init_logging();

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("launch_etl", run_id = %run_id);
    let _enter = span.enter();

    let config = Config::load().context("loading configuration")?;
    let http = ReqwestHttp::new();

    println!("🚀 Building launch dataset from {}", config.api.base_url);
    let result = match Pipeline::run(&config, &http) {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            println!("❌ Pipeline failed: {}", e);
            return Err(e).context("building launch dataset");
        }
    };
    info!("Pipeline finished");

    println!("\n📊 Pipeline Results:");
    println!("   Past launches fetched: {}", result.raw_launches);
    println!("   Single core/payload before cutoff: {}", result.filtered_launches);
    println!("   Excluded ({}): {}", config.dataset.excluded_booster, result.excluded_rows);
    println!("   Rows exported: {}", result.exported_rows);
    println!("   Remote requests: {}", result.remote_requests);
    if config.api.cache_references {
        println!("   Cache hits: {}", result.cache_hits);
    }
    match result.payload_mass_mean {
        Some(mean) => println!(
            "   PayloadMass imputed: {} (mean {:.2} kg)",
            result.imputed_payload_mass, mean
        ),
        None => println!("   PayloadMass imputed: 0 (no values present)"),
    }
    println!("   CSV: {}", result.csv_path.display());
    println!("   HTML: {}", result.html_path.display());
    println!("✅ Done");

    Ok(())
}
