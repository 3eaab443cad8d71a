use crate::domain::model::{NewUser, Product, ProductData, SalesData, SalesRecord, User};
use crate::domain::ports::{ProductStore, SalesStore, UserStore};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

// No `T: Default` bound; the row types have no default value.
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
struct Tables {
    sales: Table<SalesData>,
    products: Table<ProductData>,
    users: Table<User>,
}

/// Process-local relational stand-in. Ids are assigned sequentially per table and
/// never reused.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk insert used for seeding; returns how many rows were added.
    pub async fn seed_sales(&self, rows: Vec<SalesData>) -> usize {
        let mut tables = self.tables.write().await;
        let count = rows.len();
        for data in rows {
            let id = tables.sales.next_id();
            tables.sales.rows.insert(id, data);
        }
        count
    }

    /// Bulk insert used for seeding. Rows whose `product_id` is already present are
    /// skipped; returns how many rows were added.
    pub async fn seed_products(&self, rows: Vec<ProductData>) -> usize {
        let mut tables = self.tables.write().await;
        let mut added = 0;
        for data in rows {
            if product_id_taken(&tables.products, &data.product_id, None) {
                tracing::warn!("Skipping duplicate product_id {} in seed data", data.product_id);
                continue;
            }
            let id = tables.products.next_id();
            tables.products.rows.insert(id, data);
            added += 1;
        }
        added
    }
}

fn product_id_taken(products: &Table<ProductData>, product_id: &str, except: Option<i64>) -> bool {
    products
        .rows
        .iter()
        .any(|(id, p)| Some(*id) != except && p.product_id == product_id)
}

fn duplicate_product(product_id: &str) -> AppError {
    AppError::ConflictError {
        message: format!("product with this product_id ({}) already exists.", product_id),
    }
}

#[async_trait]
impl SalesStore for InMemoryStore {
    async fn list_sales(&self) -> Result<Vec<SalesRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<SalesRecord> = tables
            .sales
            .rows
            .iter()
            .map(|(id, data)| SalesRecord {
                id: *id,
                data: data.clone(),
            })
            .collect();
        // newest first, stable by id within a day
        records.sort_by(|a, b| b.data.order_date.cmp(&a.data.order_date).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn get_sale(&self, id: i64) -> Result<Option<SalesRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.sales.rows.get(&id).map(|data| SalesRecord {
            id,
            data: data.clone(),
        }))
    }

    async fn create_sale(&self, data: SalesData) -> Result<SalesRecord> {
        let mut tables = self.tables.write().await;
        let id = tables.sales.next_id();
        tables.sales.rows.insert(id, data.clone());
        Ok(SalesRecord { id, data })
    }

    async fn update_sale(&self, id: i64, data: SalesData) -> Result<Option<SalesRecord>> {
        let mut tables = self.tables.write().await;
        Ok(tables.sales.rows.get_mut(&id).map(|row| {
            *row = data.clone();
            SalesRecord { id, data }
        }))
    }

    async fn delete_sale(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.sales.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .rows
            .iter()
            .map(|(id, data)| Product {
                id: *id,
                data: data.clone(),
            })
            .collect())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.rows.get(&id).map(|data| Product {
            id,
            data: data.clone(),
        }))
    }

    async fn create_product(&self, data: ProductData) -> Result<Product> {
        let mut tables = self.tables.write().await;
        if product_id_taken(&tables.products, &data.product_id, None) {
            return Err(duplicate_product(&data.product_id));
        }
        let id = tables.products.next_id();
        tables.products.rows.insert(id, data.clone());
        Ok(Product { id, data })
    }

    async fn update_product(&self, id: i64, data: ProductData) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        if !tables.products.rows.contains_key(&id) {
            return Ok(None);
        }
        if product_id_taken(&tables.products, &data.product_id, Some(id)) {
            return Err(duplicate_product(&data.product_id));
        }
        tables.products.rows.insert(id, data.clone());
        Ok(Some(Product { id, data }))
    }

    async fn delete_product(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.products.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        let users = &tables.users.rows;
        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::ConflictError {
                message: "A user with that username already exists.".to_string(),
            });
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::ConflictError {
                message: "A user with that email already exists.".to_string(),
            });
        }

        let id = tables.users.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            salt: user.salt,
        };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn count_users(&self) -> Result<usize> {
        Ok(self.tables.read().await.users.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sale(date: NaiveDate) -> SalesData {
        SalesData {
            order_date: date,
            customer_id: "DV-13045".to_string(),
            customer_name: "Darrin Van Huff".to_string(),
            segment: "Corporate".to_string(),
            country: "United States".to_string(),
            city: "Los Angeles".to_string(),
            state: "California".to_string(),
            postal_code: "90036".to_string(),
            region: "West".to_string(),
            product_id: "OFF-LA-10000240".to_string(),
            category: "Office Supplies".to_string(),
            sub_category: "Labels".to_string(),
            product_name: "Self-Adhesive Address Labels".to_string(),
            sales: dec!(14.62),
            quantity: 2,
            discount: dec!(0.00),
            profit: dec!(6.87),
            avg_for_week: dec!(0),
            avg_for_month: dec!(0),
            week_sales: dec!(0),
            month_sales: dec!(0),
            day_sales: dec!(0),
        }
    }

    #[tokio::test]
    async fn test_default_store_starts_empty() {
        let store = InMemoryStore::default();
        assert!(store.list_sales().await.unwrap().is_empty());
        assert!(store.list_products().await.unwrap().is_empty());
        assert_eq!(store.count_users().await.unwrap(), 0);

        let record = store
            .create_sale(sale(NaiveDate::from_ymd_opt(2017, 6, 12).unwrap()))
            .await
            .unwrap();
        assert_eq!(record.id, 1);
    }

    fn product(product_id: &str) -> ProductData {
        ProductData {
            product_id: product_id.to_string(),
            product_name: "Stapler".to_string(),
            category: "Office Supplies".to_string(),
            sub_category: "Fasteners".to_string(),
            price: dec!(12.50),
            stock_level: 40,
        }
    }

    #[tokio::test]
    async fn test_sales_crud_and_ordering() {
        let store = InMemoryStore::new();
        let older = store
            .create_sale(sale(NaiveDate::from_ymd_opt(2017, 6, 12).unwrap()))
            .await
            .unwrap();
        let newer = store
            .create_sale(sale(NaiveDate::from_ymd_opt(2017, 11, 8).unwrap()))
            .await
            .unwrap();

        let listed = store.list_sales().await.unwrap();
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

        let mut changed = older.data.clone();
        changed.quantity = 9;
        let updated = store.update_sale(older.id, changed).await.unwrap().unwrap();
        assert_eq!(updated.data.quantity, 9);
        assert!(store.update_sale(999, sale(older.data.order_date)).await.unwrap().is_none());

        assert!(store.delete_sale(older.id).await.unwrap());
        assert!(!store.delete_sale(older.id).await.unwrap());
        assert!(store.get_sale(older.id).await.unwrap().is_none());

        // ids are never reused
        let third = store.create_sale(sale(older.data.order_date)).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_product_id_is_unique() {
        let store = InMemoryStore::new();
        let first = store.create_product(product("TEC-PH-1")).await.unwrap();
        let second = store.create_product(product("TEC-PH-2")).await.unwrap();

        let err = store.create_product(product("TEC-PH-1")).await.unwrap_err();
        assert!(matches!(err, AppError::ConflictError { .. }));

        // updating a row onto its own product_id is fine, onto another is not
        assert!(store.update_product(first.id, product("TEC-PH-1")).await.is_ok());
        assert!(store.update_product(second.id, product("TEC-PH-1")).await.is_err());

        assert_eq!(store.seed_products(vec![product("TEC-PH-2"), product("TEC-PH-3")]).await, 1);
        assert_eq!(store.list_products().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_users_unique_by_username_and_email() {
        let store = InMemoryStore::new();
        let new_user = |username: &str, email: &str| NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "h".to_string(),
            salt: "s".to_string(),
        };

        let user = store.create_user(new_user("amy", "amy@example.com")).await.unwrap();
        assert!(store.create_user(new_user("amy", "x@example.com")).await.is_err());
        assert!(store.create_user(new_user("amy2", "amy@example.com")).await.is_err());

        assert_eq!(
            store.find_by_email("amy@example.com").await.unwrap().map(|u| u.id),
            Some(user.id)
        );
        assert_eq!(store.count_users().await.unwrap(), 1);
    }
}
