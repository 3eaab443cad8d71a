use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::domain::model::{SalesData, SalesRecord};
use crate::utils::error::AppError;
use crate::utils::validation::Validate;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

const RESOURCE: &str = "Sales record";

/// Unreadable or incomplete bodies become a 400 with the decoder's explanation.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Non-numeric ids get the same JSON error envelope as every other 400.
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn not_found(id: i64) -> ApiError {
    AppError::NotFoundError {
        resource: RESOURCE,
        id,
    }
    .into()
}

pub async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<SalesRecord>>> {
    Ok(Json(state.sales.list_sales().await?))
}

pub async fn create_sale(
    State(state): State<AppState>,
    body: Result<Json<SalesData>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SalesRecord>)> {
    let data = json_body(body)?;
    data.validate()?;
    let record = state.sales.create_sale(data).await?;
    tracing::info!("📝 Created sales record {}", record.id);
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_sale(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<SalesRecord>> {
    let id = path_id(path)?;
    state
        .sales
        .get_sale(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

pub async fn update_sale(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SalesData>, JsonRejection>,
) -> ApiResult<Json<SalesRecord>> {
    let id = path_id(path)?;
    let data = json_body(body)?;
    data.validate()?;
    let record = state
        .sales
        .update_sale(id, data)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("📝 Updated sales record {}", id);
    Ok(Json(record))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(path)?;
    if !state.sales.delete_sale(id).await? {
        return Err(not_found(id));
    }
    tracing::info!("🗑️ Deleted sales record {}", id);
    Ok(StatusCode::NO_CONTENT)
}
