//! Forecasting model artifacts and the file-backed model source.

pub mod prophet;
pub mod sarima;

use crate::domain::model::Granularity;
use crate::domain::ports::{Forecaster, ModelSource};
use crate::utils::error::{ModelError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use prophet::{Prophet, ProphetArtifact};
pub use sarima::{Sarima, SarimaArtifact};

/// Serialized model, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Sarima(SarimaArtifact),
    Prophet(ProphetArtifact),
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> std::result::Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::InvalidArtifact(e.to_string()))
    }

    pub fn into_forecaster(self) -> std::result::Result<Arc<dyn Forecaster>, ModelError> {
        let model: Arc<dyn Forecaster> = match self {
            ModelArtifact::Sarima(a) => Arc::new(Sarima::from_artifact(a)?),
            ModelArtifact::Prophet(a) => Arc::new(Prophet::from_artifact(a)?),
        };
        Ok(model)
    }
}

pub const DEFAULT_MONTHLY_FILE: &str = "sarima_monthly_sales_model.json";
pub const DEFAULT_WEEKLY_FILE: &str = "weekly_sales_model.json";
pub const DEFAULT_DAILY_FILE: &str = "daily_sales_model.json";

/// Reads one JSON artifact per granularity from a directory.
#[derive(Debug, Clone)]
pub struct FileModelSource {
    dir: PathBuf,
    files: HashMap<Granularity, String>,
}

impl FileModelSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let files = HashMap::from([
            (Granularity::Monthly, DEFAULT_MONTHLY_FILE.to_string()),
            (Granularity::Weekly, DEFAULT_WEEKLY_FILE.to_string()),
            (Granularity::Daily, DEFAULT_DAILY_FILE.to_string()),
        ]);
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn with_file(mut self, granularity: Granularity, file: impl Into<String>) -> Self {
        self.files.insert(granularity, file.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, granularity: Granularity) -> PathBuf {
        let file = self
            .files
            .get(&granularity)
            .map(String::as_str)
            .unwrap_or_default();
        self.dir.join(file)
    }
}

impl ModelSource for FileModelSource {
    fn describe(&self, granularity: Granularity) -> String {
        self.path_for(granularity).display().to_string()
    }

    fn load(&self, granularity: Granularity) -> Result<Arc<dyn Forecaster>> {
        let path = self.path_for(granularity);
        tracing::debug!("Reading {} model artifact {}", granularity, path.display());
        let json = std::fs::read_to_string(&path)?;
        let model = ModelArtifact::from_json(&json)?.into_forecaster()?;
        Ok(model)
    }
}
