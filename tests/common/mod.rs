#![allow(dead_code)]

use anyhow::Result;
use sales_forecast::{AppConfig, Application};
use std::path::Path;
use tempfile::TempDir;

/// Monthly: random walk with drift 10 from 1010, last trained 2024-12-01.
pub const MONTHLY_ARTIFACT: &str = r#"{
    "kind": "sarima",
    "order": [0, 1, 0],
    "seasonal_order": [0, 0, 0, 0],
    "intercept": 10.0,
    "endog": [1000.0, 1010.0],
    "dates": ["2024-11-01", "2024-12-01"]
}"#;

/// Weekly: random walk with drift 5 from 210, last trained 2024-12-30.
pub const WEEKLY_ARTIFACT: &str = r#"{
    "kind": "sarima",
    "order": [0, 1, 0],
    "intercept": 5.0,
    "endog": [200.0, 205.0, 210.0],
    "dates": ["2024-12-16", "2024-12-23", "2024-12-30"]
}"#;

/// Weekly, same drift, but the last training point is 2024-12-01.
pub const WEEKLY_ARTIFACT_DEC_1: &str = r#"{
    "kind": "sarima",
    "order": [0, 1, 0],
    "intercept": 5.0,
    "endog": [200.0, 205.0, 210.0],
    "dates": ["2024-11-17", "2024-11-24", "2024-12-01"]
}"#;

/// Daily: straight line reaching 1000 on 2025-01-01, history ends 2024-12-31.
pub const DAILY_ARTIFACT: &str = r#"{
    "kind": "prophet",
    "history_start": "2024-01-01",
    "history_end": "2024-12-31",
    "t_scale_days": 366.0,
    "y_scale": 1000.0,
    "k": 1.0,
    "m": 0.0
}"#;

pub fn write_artifacts(dir: &Path) -> Result<()> {
    std::fs::write(dir.join("sarima_monthly_sales_model.json"), MONTHLY_ARTIFACT)?;
    std::fs::write(dir.join("weekly_sales_model.json"), WEEKLY_ARTIFACT)?;
    std::fs::write(dir.join("daily_sales_model.json"), DAILY_ARTIFACT)?;
    Ok(())
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub model_dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Serves the app on an ephemeral port with the standard artifacts.
pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(|_| Ok(())).await
}

/// Like `spawn_app`, but lets the caller adjust the model directory first.
pub async fn spawn_app_with<F>(prepare: F) -> Result<TestApp>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let model_dir = TempDir::new()?;
    write_artifacts(model_dir.path())?;
    prepare(model_dir.path())?;

    let mut config = AppConfig::default();
    config.models.directory = model_dir.path().to_string_lossy().into_owned();

    let app = Application::build(config).await?;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = format!("http://{}", listener.local_addr()?);
    tokio::spawn(app.serve(listener, std::future::pending()));

    Ok(TestApp {
        address,
        client: reqwest::Client::new(),
        model_dir,
    })
}
