use crate::adapters::models::{
    FileModelSource, DEFAULT_DAILY_FILE, DEFAULT_MONTHLY_FILE, DEFAULT_WEEKLY_FILE,
};
use crate::core::forecast::ForecastSettings;
use crate::domain::model::Granularity;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub forecast: ForecastSettings,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allow_any: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub directory: String,
    pub monthly: String,
    pub weekly: String,
    pub daily: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            directory: "./models".to_string(),
            monthly: DEFAULT_MONTHLY_FILE.to_string(),
            weekly: DEFAULT_WEEKLY_FILE.to_string(),
            daily: DEFAULT_DAILY_FILE.to_string(),
        }
    }
}

impl ModelsConfig {
    pub fn source(&self) -> FileModelSource {
        FileModelSource::new(PathBuf::from(&self.directory))
            .with_file(Granularity::Monthly, self.monthly.clone())
            .with_file(Granularity::Weekly, self.weekly.clone())
            .with_file(Granularity::Daily, self.daily.clone())
    }
}

/// Optional CSV files used to seed the in-memory store at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub sales_csv: Option<String>,
    pub products_csv: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number("server.port", usize::from(self.server.port), 1)?;

        validate_path("models.directory", &self.models.directory)?;
        validate_path("models.monthly", &self.models.monthly)?;
        validate_path("models.weekly", &self.models.weekly)?;
        validate_path("models.daily", &self.models.daily)?;

        validate_range(
            "forecast.trailing_window_days",
            self.forecast.trailing_window_days,
            1,
            366,
        )?;

        if let Some(path) = &self.data.sales_csv {
            validate_path("data.sales_csv", path)?;
        }
        if let Some(path) = &self.data.products_csv {
            validate_path("data.products_csv", path)?;
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
