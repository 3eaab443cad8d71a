pub mod toml_config;

pub use toml_config::AppConfig;

use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

/// Command line for the API server. Flags override values read from `--config`.
#[derive(Debug, Clone, Parser)]
#[command(name = "sales-forecast")]
#[command(about = "Sales analytics and forecast API server")]
pub struct CliConfig {
    #[arg(long, short, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, help = "Directory holding the forecasting model artifacts")]
    pub model_dir: Option<String>,

    #[arg(long, help = "CSV file used to seed sales records")]
    pub sales_csv: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Reads the config file (or defaults), applies the flag overrides and validates
    /// the result.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.model_dir {
            config.models.directory = dir.clone();
        }
        if let Some(path) = &self.sales_csv {
            config.data.sales_csv = Some(path.clone());
        }
        if self.json_logs {
            config.logging.json = true;
        }

        config.validate()?;
        Ok(config)
    }
}
