//! Dashboard aggregations over sales rows: sums, counts, group-by and ordering.

use crate::domain::model::SalesRecord;
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_N: usize = 5;
const RECENT_DAYS: i64 = 30;

fn to_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub product_name: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerPurchases {
    pub customer_name: String,
    pub total_purchases: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_sales: Option<f64>,
    pub total_profit: Option<f64>,
    pub top_products: Vec<ProductTotal>,
    pub top_customers: Vec<CustomerPurchases>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: NaiveDate,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTrend {
    pub week: NaiveDate,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTrends {
    pub monthly_trends: Vec<MonthlyTrend>,
    pub weekly_trends: Vec<WeeklyTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickInsights {
    pub date: NaiveDate,
    pub total_sales: f64,
    pub total_orders: usize,
    pub avg_order_value: f64,
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub order_date: NaiveDate,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProfit {
    pub order_date: NaiveDate,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_name: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSales {
    pub customer_name: String,
    pub total_sales: f64,
}

/// Sums `value` per key. Keys come back in ascending order.
fn group_sum<K, F, V>(records: &[SalesRecord], key: F, value: V) -> BTreeMap<K, Decimal>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
    V: Fn(&SalesRecord) -> Decimal,
{
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(key(record)).or_insert(Decimal::ZERO) += value(record);
    }
    totals
}

/// Totals per name, largest first; ties fall back to name order.
fn ranked_by_sales(totals: BTreeMap<String, Decimal>) -> Vec<(String, Decimal)> {
    let mut ranked: Vec<(String, Decimal)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn sales_by_product_name(records: &[SalesRecord]) -> BTreeMap<String, Decimal> {
    group_sum(records, |r| r.data.product_name.clone(), |r| r.data.sales)
}

fn sales_by_customer_name(records: &[SalesRecord]) -> BTreeMap<String, Decimal> {
    group_sum(records, |r| r.data.customer_name.clone(), |r| r.data.sales)
}

pub fn dashboard_stats(records: &[SalesRecord]) -> DashboardStats {
    let (total_sales, total_profit) = if records.is_empty() {
        (None, None)
    } else {
        let sales: Decimal = records.iter().map(|r| r.data.sales).sum();
        let profit: Decimal = records.iter().map(|r| r.data.profit).sum();
        (Some(to_number(sales)), Some(to_number(profit)))
    };

    let top_products = ranked_by_sales(sales_by_product_name(records))
        .into_iter()
        .take(TOP_N)
        .map(|(product_name, total)| ProductTotal {
            product_name,
            total_sales: to_number(total),
        })
        .collect();

    let top_customers = ranked_by_sales(sales_by_customer_name(records))
        .into_iter()
        .take(TOP_N)
        .map(|(customer_name, total)| CustomerPurchases {
            customer_name,
            total_purchases: to_number(total),
        })
        .collect();

    DashboardStats {
        total_sales,
        total_profit,
        top_products,
        top_customers,
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn sales_trends(records: &[SalesRecord]) -> SalesTrends {
    let monthly_trends = group_sum(records, |r| month_start(r.data.order_date), |r| r.data.sales)
        .into_iter()
        .map(|(month, total)| MonthlyTrend {
            month,
            total_sales: to_number(total),
        })
        .collect();

    let weekly_trends = group_sum(records, |r| week_start(r.data.order_date), |r| r.data.sales)
        .into_iter()
        .map(|(week, total)| WeeklyTrend {
            week,
            total_sales: to_number(total),
        })
        .collect();

    SalesTrends {
        monthly_trends,
        weekly_trends,
    }
}

/// Yesterday's totals relative to `today`.
pub fn quick_insights(records: &[SalesRecord], today: NaiveDate) -> QuickInsights {
    let yesterday = today - Duration::days(1);
    let rows: Vec<&SalesRecord> = records
        .iter()
        .filter(|r| r.data.order_date == yesterday)
        .collect();

    let total_sales: Decimal = rows.iter().map(|r| r.data.sales).sum();
    let total_profit: Decimal = rows.iter().map(|r| r.data.profit).sum();
    let total_orders = rows.len();
    let avg_order_value = if total_orders > 0 {
        total_sales / Decimal::from(total_orders as u64)
    } else {
        Decimal::ZERO
    };

    QuickInsights {
        date: yesterday,
        total_sales: to_number(total_sales),
        total_orders,
        avg_order_value: to_number(avg_order_value),
        total_profit: to_number(total_profit),
    }
}

fn recent(records: &[SalesRecord], today: NaiveDate) -> Vec<SalesRecord> {
    let since = today - Duration::days(RECENT_DAYS);
    records
        .iter()
        .filter(|r| r.data.order_date >= since)
        .cloned()
        .collect()
}

/// Per-day sales over the last 30 days, oldest first.
pub fn recent_daily_sales(records: &[SalesRecord], today: NaiveDate) -> Vec<DailySales> {
    group_sum(&recent(records, today), |r| r.data.order_date, |r| r.data.sales)
        .into_iter()
        .map(|(order_date, total)| DailySales {
            order_date,
            sales: to_number(total),
        })
        .collect()
}

/// Per-day profit over the last 30 days, oldest first.
pub fn recent_daily_profit(records: &[SalesRecord], today: NaiveDate) -> Vec<DailyProfit> {
    group_sum(&recent(records, today), |r| r.data.order_date, |r| r.data.profit)
        .into_iter()
        .map(|(order_date, total)| DailyProfit {
            order_date,
            profit: to_number(total),
        })
        .collect()
}

pub fn sales_by_product(records: &[SalesRecord]) -> Vec<ProductSales> {
    sales_by_product_name(records)
        .into_iter()
        .map(|(product_name, total)| ProductSales {
            product_name,
            sales: to_number(total),
        })
        .collect()
}

pub fn sales_by_customer(records: &[SalesRecord]) -> Vec<CustomerSales> {
    sales_by_customer_name(records)
        .into_iter()
        .map(|(customer_name, total)| CustomerSales {
            customer_name,
            total_sales: to_number(total),
        })
        .collect()
}

pub fn top_customers(records: &[SalesRecord]) -> Vec<CustomerSales> {
    ranked_by_sales(sales_by_customer_name(records))
        .into_iter()
        .map(|(customer_name, total)| CustomerSales {
            customer_name,
            total_sales: to_number(total),
        })
        .collect()
}

pub fn top_products(records: &[SalesRecord]) -> Vec<ProductTotal> {
    ranked_by_sales(sales_by_product_name(records))
        .into_iter()
        .map(|(product_name, total)| ProductTotal {
            product_name,
            total_sales: to_number(total),
        })
        .collect()
}
