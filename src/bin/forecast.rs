use anyhow::Context;
use clap::Parser;
use sales_forecast::core::forecast::ErrorResponse;
use sales_forecast::domain::model::{ForecastQuery, Granularity};
use sales_forecast::utils::logger;
use sales_forecast::{AppConfig, ForecastService, ModelRegistry};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Run a sales forecast against local model artifacts")]
struct Args {
    /// TOML configuration file (models and forecast sections are used)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the model artifacts, overrides the config file
    #[arg(long)]
    model_dir: Option<String>,

    /// daily, weekly or monthly
    #[arg(short, long)]
    granularity: Granularity,

    /// Target date (YYYY-MM-DD), or the last day of the window with --window
    #[arg(long)]
    date: Option<String>,

    /// First date of a weekly range
    #[arg(long)]
    start: Option<String>,

    /// Last date of a weekly range
    #[arg(long)]
    end: Option<String>,

    /// Predict the trailing window of days ending at --date
    #[arg(long)]
    window: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn query(&self) -> ForecastQuery {
        if self.window {
            ForecastQuery::TrailingWindow {
                granularity: self.granularity,
                date: self.date.clone(),
            }
        } else if self.start.is_some() || self.end.is_some() {
            ForecastQuery::Range {
                granularity: self.granularity,
                start_date: self.start.clone(),
                end_date: self.end.clone(),
            }
        } else {
            ForecastQuery::Single {
                granularity: self.granularity,
                date: self.date.clone(),
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &args.model_dir {
        config.models.directory = dir.clone();
    }

    let (registry, outcomes) = ModelRegistry::load(&config.models.source());
    for outcome in outcomes.iter().filter(|o| !o.loaded) {
        tracing::warn!("{}", outcome.message);
    }

    let service = ForecastService::new(Arc::new(registry), config.forecast.clone());
    match service.predict(&args.query()) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
            std::process::exit(if e.is_client_error() { 1 } else { 2 });
        }
    }
}
