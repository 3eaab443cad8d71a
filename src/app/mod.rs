//! Composition root: wires config, stores, models and services into an HTTP app.

use crate::adapters::auth::OpaqueTokenIssuer;
use crate::adapters::store::{csv_seed, InMemoryStore};
use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::core::auth::AuthService;
use crate::core::forecast::{ForecastService, LoadOutcome, ModelRegistry};
use crate::domain::ports::ModelSource;
use crate::utils::error::Result;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Application {
    config: AppConfig,
    state: AppState,
    load_outcomes: Vec<LoadOutcome>,
}

impl Application {
    /// Loads models from the configured directory and seeds the store from any
    /// configured CSV files. Missing models degrade the service; bad seed files fail.
    pub async fn build(config: AppConfig) -> Result<Self> {
        let source = Arc::new(config.models.source());
        Self::build_with_source(config, source).await
    }

    pub async fn build_with_source(config: AppConfig, source: Arc<dyn ModelSource>) -> Result<Self> {
        let (registry, load_outcomes) = ModelRegistry::load(source.as_ref());
        let loaded = load_outcomes.iter().filter(|o| o.loaded).count();
        tracing::info!("📈 {}/{} forecasting models loaded", loaded, load_outcomes.len());

        let store = Arc::new(InMemoryStore::new());
        if let Some(path) = &config.data.sales_csv {
            let rows = csv_seed::load_sales_file(Path::new(path))?;
            let count = store.seed_sales(rows).await;
            tracing::info!("🌱 Seeded {} sales records", count);
        }
        if let Some(path) = &config.data.products_csv {
            let rows = csv_seed::load_products_file(Path::new(path))?;
            let count = store.seed_products(rows).await;
            tracing::info!("🌱 Seeded {} products", count);
        }

        let state = AppState {
            forecasts: Arc::new(ForecastService::new(
                Arc::new(registry),
                config.forecast.clone(),
            )),
            sales: store.clone(),
            products: store.clone(),
            auth: Arc::new(AuthService::new(store, Arc::new(OpaqueTokenIssuer::new()))),
            model_source: source,
        };

        Ok(Self {
            config,
            state,
            load_outcomes,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn load_outcomes(&self) -> &[LoadOutcome] {
        &self.load_outcomes
    }

    pub fn router(&self) -> Router {
        api::router(self.state.clone(), self.config.server.cors_allow_any)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!("🚀 sales-forecast v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("👋 Server stopped");
        Ok(())
    }
}
