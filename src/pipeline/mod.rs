pub mod export;
pub mod ingestion;
pub mod processing;

use crate::apis::spacex::SpacexApi;
use crate::app::ports::HttpClientPort;
use crate::config::Config;
use crate::constants::PREVIEW_ROWS;
use crate::error::Result;
use crate::pipeline::ingestion::resolver::CachingResolver;
use crate::pipeline::processing::{assemble, clean, enrich, filter};
use metrics::{counter, histogram};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub raw_launches: usize,
    pub filtered_launches: usize,
    pub excluded_rows: usize,
    pub exported_rows: usize,
    pub remote_requests: usize,
    pub cache_hits: usize,
    pub imputed_payload_mass: usize,
    pub payload_mass_mean: Option<f64>,
    pub csv_path: PathBuf,
    pub html_path: PathBuf,
}

pub struct Pipeline;

impl Pipeline {
    /// Fetch, filter, enrich, assemble, clean and export. Any failure aborts
    /// the run before either output file is written.
    #[instrument(skip_all, fields(base_url = %config.api.base_url))]
    pub fn run(config: &Config, http: &dyn HttpClientPort) -> Result<PipelineResult> {
        let t_pipeline = Instant::now();
        let api = SpacexApi::new(http, config.api.base_url.as_str());

        // Step 1: Fetch raw launches
        info!("📡 Fetching past launches...");
        let raw = api.get_past_launches()?;

        // Step 2: Filter
        let launches = filter::filter_launches(&raw, config.dataset.cutoff_date);
        info!(
            "🔧 Kept {} of {} launches (single core, single payload, on or before {})",
            launches.len(),
            raw.len(),
            config.dataset.cutoff_date
        );

        // Step 3: Enrich
        info!("🔗 Resolving references...");
        let t_enrich = Instant::now();
        let (enrichment, cache_hits) = if config.api.cache_references {
            let cached = CachingResolver::new(&api);
            let enrichment = enrich::enrich(&launches, &cached)?;
            (enrichment, cached.hits())
        } else {
            (enrich::enrich(&launches, &api)?, 0)
        };
        histogram!("launch_etl_enrich_duration_seconds").record(t_enrich.elapsed().as_secs_f64());

        // Step 4: Assemble
        let dataset = assemble::assemble(&launches, enrichment, &config.dataset.excluded_booster)?;
        info!(
            "🧩 Assembled {} rows ({} '{}' rows excluded)",
            dataset.rows.len(),
            dataset.excluded,
            config.dataset.excluded_booster
        );

        // Step 5: Clean
        let (rows, report) = clean::clean(dataset.rows);
        counter!("launch_etl_values_imputed_total", "column" => "PayloadMass")
            .increment(report.imputed as u64);

        // Step 6: Export
        let files = export::export(&rows, &config.output.csv_path, &config.output.html_path)?;
        for row in rows.iter().take(PREVIEW_ROWS) {
            debug!(?row, "preview");
        }

        histogram!("launch_etl_pipeline_duration_seconds").record(t_pipeline.elapsed().as_secs_f64());

        Ok(PipelineResult {
            raw_launches: raw.len(),
            filtered_launches: launches.len(),
            excluded_rows: dataset.excluded,
            exported_rows: rows.len(),
            remote_requests: api.request_count(),
            cache_hits,
            imputed_payload_mass: report.imputed,
            payload_mass_mean: report.payload_mass_mean,
            csv_path: files.csv_path,
            html_path: files.html_path,
        })
    }
}
