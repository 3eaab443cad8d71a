use crate::api::error::{ApiError, ApiResult};
use crate::api::sales::{json_body, path_id};
use crate::api::AppState;
use crate::domain::model::{Product, ProductData};
use crate::utils::error::AppError;
use crate::utils::validation::Validate;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

fn not_found(id: i64) -> ApiError {
    AppError::NotFoundError {
        resource: "Product",
        id,
    }
    .into()
}

/// Serves both `/api/products/` and `/api/new-product-data/`.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list_products().await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<ProductData>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let data = json_body(body)?;
    data.validate()?;
    let product = state.products.create_product(data).await?;
    tracing::info!("📦 Created product {} ({})", product.data.product_id, product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let id = path_id(path)?;
    state
        .products
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductData>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let id = path_id(path)?;
    let data = json_body(body)?;
    data.validate()?;
    let product = state
        .products
        .update_product(id, data)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("📦 Updated product {}", id);
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(path)?;
    if !state.products.delete_product(id).await? {
        return Err(not_found(id));
    }
    tracing::info!("🗑️ Deleted product {}", id);
    Ok(StatusCode::NO_CONTENT)
}
