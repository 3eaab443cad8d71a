use crate::domain::model::{
    Granularity, NewUser, Product, ProductData, SalesData, SalesRecord, User,
};
use crate::utils::error::{ModelError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

/// A pre-trained forecasting model. Implementations are immutable once built and
/// are shared between requests behind an `Arc`.
pub trait Forecaster: Send + Sync + fmt::Debug {
    /// Short family name used in logs and error messages, e.g. "SARIMA".
    fn family(&self) -> &'static str;

    /// Latest timestamp the model was fitted on, if the artifact recorded it.
    fn last_training_date(&self) -> Option<NaiveDate>;

    /// Mean forecast for the `steps` periods following the training data.
    /// The returned vector has exactly `steps` elements.
    fn forecast(&self, steps: usize) -> std::result::Result<Vec<f64>, ModelError>;

    /// Direct date-indexed prediction, one value per input date.
    fn predict(&self, dates: &[NaiveDate]) -> std::result::Result<Vec<f64>, ModelError>;
}

/// Where the registry gets its models from.
pub trait ModelSource: Send + Sync {
    fn describe(&self, granularity: Granularity) -> String;

    fn load(&self, granularity: Granularity) -> Result<Arc<dyn Forecaster>>;
}

#[async_trait]
pub trait SalesStore: Send + Sync {
    /// All rows, newest order date first.
    async fn list_sales(&self) -> Result<Vec<SalesRecord>>;
    async fn get_sale(&self, id: i64) -> Result<Option<SalesRecord>>;
    async fn create_sale(&self, data: SalesData) -> Result<SalesRecord>;
    async fn update_sale(&self, id: i64, data: SalesData) -> Result<Option<SalesRecord>>;
    async fn delete_sale(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;
    /// Fails with a conflict when `product_id` is already taken.
    async fn create_product(&self, data: ProductData) -> Result<Product>;
    async fn update_product(&self, id: i64, data: ProductData) -> Result<Option<Product>>;
    async fn delete_product(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with a conflict when the username or email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn count_users(&self) -> Result<usize>;
}

/// Issues bearer tokens for authenticated users.
pub trait TokenIssuer: Send + Sync {
    fn issue_token(&self, user: &User) -> String;

    /// Resolves a previously issued token back to its user id.
    fn verify(&self, token: &str) -> Option<i64>;
}
