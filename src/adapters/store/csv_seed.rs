//! Loads seed rows for the in-memory store from CSV exports.
//!
//! Headers use the same snake_case column names as the JSON API. Money columns are
//! read as text and parsed exactly so no value passes through a float.

use crate::domain::model::{ProductData, SalesData};
use crate::utils::error::{AppError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct SalesRow {
    order_date: NaiveDate,
    customer_id: String,
    customer_name: String,
    segment: String,
    country: String,
    city: String,
    state: String,
    postal_code: String,
    region: String,
    product_id: String,
    category: String,
    sub_category: String,
    product_name: String,
    sales: String,
    quantity: i32,
    discount: String,
    profit: String,
    #[serde(default)]
    avg_for_week: Option<String>,
    #[serde(default)]
    avg_for_month: Option<String>,
    #[serde(default)]
    week_sales: Option<String>,
    #[serde(default)]
    month_sales: Option<String>,
    #[serde(default)]
    day_sales: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    product_id: String,
    product_name: String,
    category: String,
    sub_category: String,
    price: String,
    stock_level: i32,
}

fn decimal(line: usize, field: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| AppError::ValidationError {
        field: format!("{} (line {})", field, line),
        message: e.to_string(),
    })
}

/// Blank or missing derived columns default to zero.
fn optional_decimal(line: usize, field: &str, raw: Option<String>) -> Result<Decimal> {
    match raw {
        Some(v) if !v.trim().is_empty() => decimal(line, field, &v),
        _ => Ok(Decimal::ZERO),
    }
}

impl SalesRow {
    fn into_data(self, line: usize) -> Result<SalesData> {
        Ok(SalesData {
            sales: decimal(line, "sales", &self.sales)?,
            discount: decimal(line, "discount", &self.discount)?,
            profit: decimal(line, "profit", &self.profit)?,
            avg_for_week: optional_decimal(line, "avg_for_week", self.avg_for_week)?,
            avg_for_month: optional_decimal(line, "avg_for_month", self.avg_for_month)?,
            week_sales: optional_decimal(line, "week_sales", self.week_sales)?,
            month_sales: optional_decimal(line, "month_sales", self.month_sales)?,
            day_sales: optional_decimal(line, "day_sales", self.day_sales)?,
            order_date: self.order_date,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            segment: self.segment,
            country: self.country,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            region: self.region,
            product_id: self.product_id,
            category: self.category,
            sub_category: self.sub_category,
            product_name: self.product_name,
            quantity: self.quantity,
        })
    }
}

pub fn read_sales<R: Read>(reader: R) -> Result<Vec<SalesData>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (index, row) in csv_reader.deserialize::<SalesRow>().enumerate() {
        // header is line 1
        rows.push(row?.into_data(index + 2)?);
    }
    Ok(rows)
}

pub fn read_products<R: Read>(reader: R) -> Result<Vec<ProductData>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (index, row) in csv_reader.deserialize::<ProductRow>().enumerate() {
        let row = row?;
        rows.push(ProductData {
            price: decimal(index + 2, "price", &row.price)?,
            product_id: row.product_id,
            product_name: row.product_name,
            category: row.category,
            sub_category: row.sub_category,
            stock_level: row.stock_level,
        });
    }
    Ok(rows)
}

pub fn load_sales_file(path: &Path) -> Result<Vec<SalesData>> {
    let rows = read_sales(std::fs::File::open(path)?)?;
    tracing::info!("📄 Read {} sales rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_products_file(path: &Path) -> Result<Vec<ProductData>> {
    let rows = read_products(std::fs::File::open(path)?)?;
    tracing::info!("📄 Read {} product rows from {}", rows.len(), path.display());
    Ok(rows)
}
