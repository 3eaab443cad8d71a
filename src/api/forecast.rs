//! Forecast endpoints. Bodies that are not valid JSON objects are treated as an
//! empty payload, so they fail validation the same way a missing field does.

use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::forecast::ForecastResponse;
use crate::domain::model::{ForecastQuery, Granularity};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;

fn payload(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!("Ignoring unreadable forecast body: {}", rejection.body_text());
            Value::Null
        }
    }
}

/// Strings pass through; any other non-null value is rendered as text so it fails
/// date parsing instead of looking absent.
fn field(payload: &Value, name: &str) -> Option<String> {
    match payload.get(name)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

async fn single(state: AppState, granularity: Granularity, body: Value) -> ApiResult<Json<ForecastResponse>> {
    let query = ForecastQuery::Single {
        granularity,
        date: field(&body, "date"),
    };
    Ok(Json(state.forecasts.predict(&query)?))
}

pub async fn predict_monthly_sales(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ForecastResponse>> {
    single(state, Granularity::Monthly, payload(body)).await
}

pub async fn predict_weekly_sales(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ForecastResponse>> {
    single(state, Granularity::Weekly, payload(body)).await
}

pub async fn predict_daily_sales(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ForecastResponse>> {
    single(state, Granularity::Daily, payload(body)).await
}

/// Weekly (Monday) predictions across `[start_date, end_date]` from the weekly model.
pub async fn predict_sales_in_range(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ForecastResponse>> {
    let body = payload(body);
    let query = ForecastQuery::Range {
        granularity: Granularity::Weekly,
        start_date: field(&body, "start_date"),
        end_date: field(&body, "end_date"),
    };
    Ok(Json(state.forecasts.predict(&query)?))
}

/// Daily predictions for the window ending at `?date=`.
pub async fn daily_sales_prediction(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ForecastResponse>> {
    let query = ForecastQuery::TrailingWindow {
        granularity: Granularity::Daily,
        date: params.get("date").cloned(),
    };
    Ok(Json(state.forecasts.predict(&query)?))
}
