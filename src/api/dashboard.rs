use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::analytics::{self, DashboardStats, QuickInsights, SalesTrends};
use crate::domain::model::SalesRecord;
use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// `{status: "success", sales: [...]}`, the envelope shared by the chart endpoints.
#[derive(Debug, Serialize)]
pub struct SalesEnvelope<T> {
    pub status: &'static str,
    pub sales: T,
}

#[derive(Debug, Serialize)]
pub struct InsightsEnvelope {
    pub status: &'static str,
    pub data: QuickInsights,
}

fn success<T>(sales: T) -> Json<SalesEnvelope<T>> {
    Json(SalesEnvelope {
        status: "success",
        sales,
    })
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn records(state: &AppState) -> ApiResult<Vec<SalesRecord>> {
    Ok(state.sales.list_sales().await?)
}

pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(analytics::dashboard_stats(&records(&state).await?)))
}

pub async fn sales_trends(State(state): State<AppState>) -> ApiResult<Json<SalesTrends>> {
    Ok(Json(analytics::sales_trends(&records(&state).await?)))
}

pub async fn quick_insights(State(state): State<AppState>) -> ApiResult<Json<InsightsEnvelope>> {
    let data = analytics::quick_insights(&records(&state).await?, today());
    Ok(Json(InsightsEnvelope {
        status: "success",
        data,
    }))
}

pub async fn sales_data(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesEnvelope<Vec<analytics::DailySales>>>> {
    Ok(success(analytics::recent_daily_sales(&records(&state).await?, today())))
}

pub async fn profit_data(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesEnvelope<Vec<analytics::DailyProfit>>>> {
    Ok(success(analytics::recent_daily_profit(&records(&state).await?, today())))
}

pub async fn product_data(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesEnvelope<Vec<analytics::ProductSales>>>> {
    Ok(success(analytics::sales_by_product(&records(&state).await?)))
}

pub async fn customer_data(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesEnvelope<Vec<analytics::CustomerSales>>>> {
    Ok(success(analytics::sales_by_customer(&records(&state).await?)))
}

pub async fn top_customers(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesEnvelope<Vec<analytics::CustomerSales>>>> {
    Ok(success(analytics::top_customers(&records(&state).await?)))
}

pub async fn top_products(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesEnvelope<Vec<analytics::ProductTotal>>>> {
    Ok(success(analytics::top_products(&records(&state).await?)))
}
