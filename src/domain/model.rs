use crate::utils::error::Result as AppResult;
use crate::utils::validation::{validate_decimal, validate_text_field, Validate};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

/// Time bucket a forecasting model predicts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(format!(
                "unknown granularity '{}', expected daily, weekly or monthly",
                other
            )),
        }
    }
}

/// Raw request as received from a client: dates are still unparsed strings so the
/// validator can tell "absent" apart from "malformed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastQuery {
    Single {
        granularity: Granularity,
        date: Option<String>,
    },
    Range {
        granularity: Granularity,
        start_date: Option<String>,
        end_date: Option<String>,
    },
    TrailingWindow {
        granularity: Granularity,
        date: Option<String>,
    },
}

impl ForecastQuery {
    pub fn granularity(&self) -> Granularity {
        match self {
            ForecastQuery::Single { granularity, .. }
            | ForecastQuery::Range { granularity, .. }
            | ForecastQuery::TrailingWindow { granularity, .. } => *granularity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastTarget {
    Single(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
    TrailingWindow { end: NaiveDate },
}

/// A request whose dates parsed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub granularity: Granularity,
    pub target: ForecastTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStatus {
    Success,
    Error,
}

/// One prediction (or one skipped date) produced for a requested date.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub date: NaiveDate,
    pub predicted_value: Option<f64>,
    pub status: ForecastStatus,
    pub error_message: Option<String>,
}

impl ForecastResult {
    pub fn success(date: NaiveDate, raw_value: f64) -> Self {
        Self {
            date,
            predicted_value: Some(round_to_cents(raw_value)),
            status: ForecastStatus::Success,
            error_message: None,
        }
    }

    pub fn skipped(date: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            date,
            predicted_value: None,
            status: ForecastStatus::Error,
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ForecastStatus::Success
    }
}

/// Rounds the stored binary value to two decimal places, without scaling it first.
/// Exact ties go to the even cent, so `2.675` (really 2.67499...) gives `2.67`.
pub fn round_to_cents(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|cents| cents.to_string().parse().ok())
        .unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Sales and catalog
// ---------------------------------------------------------------------------

/// Writable columns of a sales row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesData {
    pub order_date: NaiveDate,
    pub customer_id: String,
    pub customer_name: String,
    pub segment: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub region: String,
    pub product_id: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub sales: Decimal,
    pub quantity: i32,
    pub discount: Decimal,
    pub profit: Decimal,
    pub avg_for_week: Decimal,
    pub avg_for_month: Decimal,
    pub week_sales: Decimal,
    pub month_sales: Decimal,
    pub day_sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: i64,
    #[serde(flatten)]
    pub data: SalesData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub price: Decimal,
    pub stock_level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(flatten)]
    pub data: ProductData,
}

impl Validate for SalesData {
    fn validate(&self) -> AppResult<()> {
        let text_fields = [
            ("customer_id", &self.customer_id, 20),
            ("customer_name", &self.customer_name, 100),
            ("segment", &self.segment, 50),
            ("country", &self.country, 100),
            ("city", &self.city, 100),
            ("state", &self.state, 100),
            ("postal_code", &self.postal_code, 20),
            ("region", &self.region, 50),
            ("product_id", &self.product_id, 20),
            ("category", &self.category, 50),
            ("sub_category", &self.sub_category, 50),
            ("product_name", &self.product_name, 200),
        ];
        for (field, value, max_length) in text_fields {
            validate_text_field(field, value, max_length)?;
        }

        validate_decimal("sales", &self.sales, 10, 2)?;
        validate_decimal("discount", &self.discount, 4, 2)?;
        validate_decimal("profit", &self.profit, 10, 2)?;

        let derived = [
            ("avg_for_week", &self.avg_for_week),
            ("avg_for_month", &self.avg_for_month),
            ("week_sales", &self.week_sales),
            ("month_sales", &self.month_sales),
            ("day_sales", &self.day_sales),
        ];
        for (field, value) in derived {
            validate_decimal(field, value, 10, 4)?;
        }
        Ok(())
    }
}

impl Validate for ProductData {
    fn validate(&self) -> AppResult<()> {
        validate_text_field("product_id", &self.product_id, 100)?;
        validate_text_field("product_name", &self.product_name, 255)?;
        validate_text_field("category", &self.category, 100)?;
        validate_text_field("sub_category", &self.sub_category, 100)?;
        validate_decimal("price", &self.price, 10, 2)
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

/// Public projection of a user; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
