use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::core::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::domain::model::UserProfile;
use crate::utils::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let response = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(state.auth.login(request).await?))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    (scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty()).then(|| token.trim())
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<MeResponse>> {
    let token = bearer_token(&headers).ok_or_else(|| {
        ApiError::from(AppError::AuthError {
            message: "Authentication credentials were not provided.".to_string(),
        })
    })?;
    let user = state.auth.authenticate(token).await?;
    Ok(Json(MeResponse { user }))
}
