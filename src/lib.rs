pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::models::FileModelSource;
pub use adapters::store::InMemoryStore;
pub use app::Application;
pub use config::{AppConfig, CliConfig};
pub use core::forecast::{ForecastError, ForecastService, ForecastSettings, ModelRegistry};
pub use utils::error::{AppError, Result};
