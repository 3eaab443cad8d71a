mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::spawn_app;
use serde_json::{json, Value};

async fn create_sale(
    app: &common::TestApp,
    order_date: &str,
    customer: &str,
    product: &str,
    sales: &str,
    profit: &str,
) -> Result<()> {
    let body = json!({
        "order_date": order_date,
        "customer_id": "CUST-1",
        "customer_name": customer,
        "segment": "Corporate",
        "country": "United States",
        "city": "Los Angeles",
        "state": "California",
        "postal_code": "90036",
        "region": "West",
        "product_id": "OFF-LA-1",
        "category": "Office Supplies",
        "sub_category": "Labels",
        "product_name": product,
        "sales": sales,
        "quantity": 1,
        "discount": "0.00",
        "profit": profit,
        "avg_for_week": "0",
        "avg_for_month": "0",
        "week_sales": "0",
        "month_sales": "0",
        "day_sales": "0"
    });
    let response = app.client.post(app.url("/api/sales/")).json(&body).send().await?;
    assert_eq!(response.status(), 201);
    Ok(())
}

#[tokio::test]
async fn test_empty_dashboard() -> Result<()> {
    let app = spawn_app().await?;

    let body: Value = app
        .client
        .get(app.url("/api/dashboard-stats/"))
        .send()
        .await?
        .json()
        .await?;
    assert!(body["total_sales"].is_null());
    assert!(body["total_profit"].is_null());
    assert_eq!(body["top_products"], json!([]));

    let body: Value = app
        .client
        .get(app.url("/api/quick-insights/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["total_orders"], 0);
    assert_eq!(body["data"]["avg_order_value"].as_f64(), Some(0.0));
    Ok(())
}

#[tokio::test]
async fn test_aggregations() -> Result<()> {
    let app = spawn_app().await?;
    let today = Utc::now().date_naive();
    let yesterday = (today - Duration::days(1)).format("%Y-%m-%d").to_string();
    let last_week = (today - Duration::days(7)).format("%Y-%m-%d").to_string();
    let long_ago = "2017-11-08";

    create_sale(&app, &yesterday, "Amy", "Desk", "100.00", "10.00").await?;
    create_sale(&app, &yesterday, "Bob", "Lamp", "50.00", "5.00").await?;
    create_sale(&app, &last_week, "Amy", "Lamp", "25.50", "2.50").await?;
    create_sale(&app, long_ago, "Cleo", "Chair", "400.00", "-20.00").await?;

    let stats: Value = app
        .client
        .get(app.url("/api/dashboard-stats/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(stats["total_sales"].as_f64(), Some(575.5));
    assert_eq!(stats["total_profit"].as_f64(), Some(-2.5));
    assert_eq!(stats["top_products"][0]["product_name"], "Chair");
    assert_eq!(stats["top_customers"][1]["customer_name"], "Amy");
    assert_eq!(stats["top_customers"][1]["total_purchases"].as_f64(), Some(125.5));

    let insights: Value = app
        .client
        .get(app.url("/api/quick-insights/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(insights["data"]["date"], yesterday.as_str());
    assert_eq!(insights["data"]["total_orders"], 2);
    assert_eq!(insights["data"]["total_sales"].as_f64(), Some(150.0));
    assert_eq!(insights["data"]["avg_order_value"].as_f64(), Some(75.0));

    let recent: Value = app
        .client
        .get(app.url("/api/sales-data/"))
        .send()
        .await?
        .json()
        .await?;
    let days = recent["sales"].as_array().cloned().unwrap_or_default();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["order_date"], last_week.as_str());
    assert_eq!(days[1]["sales"].as_f64(), Some(150.0));

    let profit: Value = app
        .client
        .get(app.url("/api/profit-data/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(profit["sales"][1]["profit"].as_f64(), Some(15.0));

    let top: Value = app
        .client
        .get(app.url("/api/get-top-products/"))
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = top["sales"]
        .as_array()
        .map(|items| items.iter().filter_map(|p| p["product_name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Chair", "Desk", "Lamp"]);

    let by_customer: Value = app
        .client
        .get(app.url("/api/customer-data/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(by_customer["sales"].as_array().map(Vec::len), Some(3));

    let trends: Value = app
        .client
        .get(app.url("/api/sales-trends/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(trends["monthly_trends"][0]["month"], "2017-11-01");
    assert_eq!(trends["weekly_trends"][0]["week"], "2017-11-06");
    Ok(())
}
