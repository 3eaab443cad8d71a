//! HTTP surface. Every route lives under `/api/` with a trailing slash.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod products;
pub mod sales;

use crate::api::error::{ApiError, ApiResult};
use crate::core::auth::AuthService;
use crate::core::forecast::{ForecastService, LoadOutcome, ModelStatus};
use crate::domain::ports::{ModelSource, ProductStore, SalesStore};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub forecasts: Arc<ForecastService>,
    pub sales: Arc<dyn SalesStore>,
    pub products: Arc<dyn ProductStore>,
    pub auth: Arc<AuthService>,
    pub model_source: Arc<dyn ModelSource>,
}

pub fn router(state: AppState, cors_allow_any: bool) -> Router {
    let app = Router::new()
        .route("/api/test/", get(test_connection))
        .route("/api/auth/register/", post(auth::register))
        .route("/api/auth/login/", post(auth::login))
        .route("/api/auth/me/", get(auth::me))
        // CRUD
        .route("/api/sales/", get(sales::list_sales).post(sales::create_sale))
        .route(
            "/api/sales/:id/",
            get(sales::get_sale)
                .put(sales::update_sale)
                .delete(sales::delete_sale),
        )
        .route(
            "/api/products/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/:id/",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/new-product-data/", get(products::list_products))
        // Dashboard
        .route("/api/dashboard-stats/", get(dashboard::dashboard_stats))
        .route("/api/sales-trends/", get(dashboard::sales_trends))
        .route("/api/quick-insights/", get(dashboard::quick_insights))
        .route("/api/sales-data/", get(dashboard::sales_data))
        .route("/api/profit-data/", get(dashboard::profit_data))
        .route("/api/product-data/", get(dashboard::product_data))
        .route("/api/customer-data/", get(dashboard::customer_data))
        .route("/api/get-top-customers/", get(dashboard::top_customers))
        .route("/api/get-top-products/", get(dashboard::top_products))
        // Forecasts
        .route("/api/predict-monthly-sales/", post(forecast::predict_monthly_sales))
        .route("/api/predict-weekly-sales/", post(forecast::predict_weekly_sales))
        .route("/api/predict-daily-sales/", post(forecast::predict_daily_sales))
        .route("/api/predict-sales-in-range/", post(forecast::predict_sales_in_range))
        .route("/api/daily-sales-prediction/", get(forecast::daily_sales_prediction))
        // Model administration
        .route("/api/models/", get(list_models))
        .route("/api/models/reload/", post(reload_models))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Liveness plus a round trip to the user store.
async fn test_connection(State(state): State<AppState>) -> Response {
    let timestamp = Utc::now().to_rfc3339();
    match state.auth.ping().await {
        Ok(_) => Json(json!({
            "message": "Backend is connected successfully!",
            "status": "ok",
            "timestamp": timestamp,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("❌ Connection test failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Backend connection failed!",
                    "status": "error",
                    "error": e.to_string(),
                    "timestamp": timestamp,
                })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    status: &'static str,
    models: Vec<ModelStatus>,
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    status: &'static str,
    results: Vec<LoadOutcome>,
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        status: "success",
        models: state.forecasts.registry().status(),
    })
}

async fn reload_models(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let forecasts = state.forecasts.clone();
    let source = state.model_source.clone();
    // artifact parsing is blocking file IO
    let results = tokio::task::spawn_blocking(move || forecasts.reload(source.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Model reload did not complete: {}", e)))?;
    Ok(Json(ReloadResponse {
        status: "success",
        results,
    }))
}
