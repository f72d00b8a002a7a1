use crate::domain::{Customer, Order, Product};
use crate::error::{CrmError, Result};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row};
use rust_decimal::Decimal;
use std::env;
use std::fmt::Display;
use tracing::info;
use uuid::Uuid;

fn db_err(context: &str, e: impl Display) -> CrmError {
    CrmError::Persistence {
        message: format!("{context}: {e}"),
    }
}

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Create a new database manager with connection to Turso
    pub async fn new() -> Result<Self> {
        let url = env::var("LIBSQL_URL")
            .map_err(|_| CrmError::Config("LIBSQL_URL environment variable not set".to_string()))?;

        let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| {
            CrmError::Config("LIBSQL_AUTH_TOKEN environment variable not set".to_string())
        })?;

        info!("Connecting to Turso database at {}", url);

        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| db_err("Failed to connect to database", e))?;

        Ok(Self { db })
    }

    /// Get a connection to the database
    pub async fn get_connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| db_err("Failed to get database connection", e))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;
        let migration_sql = include_str!("../migrations/001_create_crm_tables.sql");

        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| db_err("Failed to run migrations", e))?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| db_err("Invalid uuid in row", e))
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|e| db_err("Invalid decimal in row", e))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| db_err("Invalid timestamp in row", e))
}

fn customer_from_row(row: &Row) -> Result<Customer> {
    let id: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
    let name: String = row.get(1).map_err(|e| db_err("Failed to get name", e))?;
    let email: String = row.get(2).map_err(|e| db_err("Failed to get email", e))?;
    let phone: Option<String> = row.get(3).ok();
    let created_at: String = row
        .get(4)
        .map_err(|e| db_err("Failed to get created_at", e))?;

    Ok(Customer {
        id: parse_uuid(&id)?,
        name,
        email,
        phone,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn product_from_row(row: &Row) -> Result<Product> {
    let id: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
    let name: String = row.get(1).map_err(|e| db_err("Failed to get name", e))?;
    let price: String = row.get(2).map_err(|e| db_err("Failed to get price", e))?;
    let stock: i64 = row.get(3).map_err(|e| db_err("Failed to get stock", e))?;

    Ok(Product {
        id: parse_uuid(&id)?,
        name,
        price: parse_decimal(&price)?,
        stock,
    })
}

/// Turso/libSQL-backed storage. List queries order by rowid so that the
/// default ordering matches insertion order, like the in-memory backend.
pub struct LibsqlStorage {
    manager: DatabaseManager,
}

impl LibsqlStorage {
    pub fn new(manager: DatabaseManager) -> Self {
        Self { manager }
    }

    async fn product_ids_for_order(&self, conn: &Connection, order_id: &str) -> Result<Vec<Uuid>> {
        let mut rows = conn
            .query(
                "SELECT product_id FROM order_products WHERE order_id = ? ORDER BY position",
                libsql::params![order_id],
            )
            .await
            .map_err(|e| db_err("Failed to query order products", e))?;

        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            let id: String = row.get(0).map_err(|e| db_err("Failed to get product_id", e))?;
            ids.push(parse_uuid(&id)?);
        }
        Ok(ids)
    }
}

#[async_trait]
impl Storage for LibsqlStorage {
    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        let conn = self.manager.get_connection().await?;
        let result = conn
            .execute(
                "INSERT INTO customers (id, name, email, phone, created_at) VALUES (?, ?, ?, ?, ?)",
                libsql::params![
                    customer.id.to_string(),
                    customer.name.clone(),
                    customer.email.clone(),
                    customer.phone.clone(),
                    customer.created_at.to_rfc3339()
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") => Err(CrmError::Conflict(format!(
                "{}: already exists",
                customer.email
            ))),
            Err(e) => Err(db_err("Failed to insert customer", e)),
        }
    }

    async fn create_customers_bulk(&self, customers: &[Customer]) -> Result<Vec<Customer>> {
        let conn = self.manager.get_connection().await?;

        conn.execute("BEGIN", libsql::params![])
            .await
            .map_err(|e| db_err("Failed to begin transaction", e))?;

        let mut created = Vec::new();
        let writes: Result<()> = async {
            for customer in customers {
                let mut rows = conn
                    .query(
                        "SELECT 1 FROM customers WHERE email = ? COLLATE NOCASE",
                        libsql::params![customer.email.clone()],
                    )
                    .await
                    .map_err(|e| db_err("Failed to query customer", e))?;
                if rows
                    .next()
                    .await
                    .map_err(|e| db_err("Failed to read row", e))?
                    .is_some()
                {
                    continue;
                }

                let insert = conn
                    .execute(
                        "INSERT INTO customers (id, name, email, phone, created_at) VALUES (?, ?, ?, ?, ?)",
                        libsql::params![
                            customer.id.to_string(),
                            customer.name.clone(),
                            customer.email.clone(),
                            customer.phone.clone(),
                            customer.created_at.to_rfc3339()
                        ],
                    )
                    .await;
                match insert {
                    Ok(_) => created.push(customer.clone()),
                    // Lost the uniqueness race against another connection
                    Err(e) if e.to_string().contains("UNIQUE") => continue,
                    Err(e) => return Err(db_err("Failed to insert customer", e)),
                }
            }
            Ok(())
        }
        .await;

        if let Err(e) = writes {
            let _ = conn.execute("ROLLBACK", libsql::params![]).await;
            return Err(e);
        }

        conn.execute("COMMIT", libsql::params![])
            .await
            .map_err(|e| db_err("Failed to commit transaction", e))?;
        Ok(created)
    }

    async fn get_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>> {
        let conn = self.manager.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, email, phone, created_at FROM customers WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query customer", e))?;

        match rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            Some(row) => Ok(Some(customer_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let conn = self.manager.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, email, phone, created_at FROM customers WHERE email = ? COLLATE NOCASE",
                libsql::params![email],
            )
            .await
            .map_err(|e| db_err("Failed to query customer", e))?;

        match rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            Some(row) => Ok(Some(customer_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.manager.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, email, phone, created_at FROM customers ORDER BY rowid",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query customers", e))?;

        let mut customers = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            customers.push(customer_from_row(&row)?);
        }
        Ok(customers)
    }

    async fn create_product(&self, product: &Product) -> Result<()> {
        let conn = self.manager.get_connection().await?;
        conn.execute(
            "INSERT INTO products (id, name, price, stock) VALUES (?, ?, ?, ?)",
            libsql::params![
                product.id.to_string(),
                product.name.clone(),
                product.price.to_string(),
                product.stock
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert product", e))?;
        Ok(())
    }

    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let conn = self.manager.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, price, stock FROM products WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query product", e))?;

        match rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            Some(row) => Ok(Some(product_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.get_product_by_id(*id).await? {
                products.push(product);
            }
        }
        Ok(products)
    }

    async fn get_all_products(&self) -> Result<Vec<Product>> {
        let conn = self.manager.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, price, stock FROM products ORDER BY rowid",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query products", e))?;

        let mut products = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            products.push(product_from_row(&row)?);
        }
        Ok(products)
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let conn = self.manager.get_connection().await?;
        let changed = conn
            .execute(
                "UPDATE products SET name = ?, price = ?, stock = ? WHERE id = ?",
                libsql::params![
                    product.name.clone(),
                    product.price.to_string(),
                    product.stock,
                    product.id.to_string()
                ],
            )
            .await
            .map_err(|e| db_err("Failed to update product", e))?;

        if changed == 0 {
            return Err(CrmError::NotFound(format!("product {}", product.id)));
        }
        Ok(())
    }

    async fn create_order(&self, order: &Order) -> Result<()> {
        let conn = self.manager.get_connection().await?;

        conn.execute("BEGIN", libsql::params![])
            .await
            .map_err(|e| db_err("Failed to begin transaction", e))?;

        let writes: Result<()> = async {
            conn.execute(
                "INSERT INTO orders (id, customer_id, order_date) VALUES (?, ?, ?)",
                libsql::params![
                    order.id.to_string(),
                    order.customer_id.to_string(),
                    order.order_date.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| db_err("Failed to insert order", e))?;

            for (position, product_id) in order.product_ids.iter().enumerate() {
                conn.execute(
                    "INSERT INTO order_products (order_id, product_id, position) VALUES (?, ?, ?)",
                    libsql::params![
                        order.id.to_string(),
                        product_id.to_string(),
                        position as i64
                    ],
                )
                .await
                .map_err(|e| db_err("Failed to insert order product", e))?;
            }
            Ok(())
        }
        .await;

        if let Err(e) = writes {
            let _ = conn.execute("ROLLBACK", libsql::params![]).await;
            return Err(e);
        }

        conn.execute("COMMIT", libsql::params![])
            .await
            .map_err(|e| db_err("Failed to commit transaction", e))?;
        Ok(())
    }

    async fn get_all_orders(&self) -> Result<Vec<Order>> {
        let conn = self.manager.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, customer_id, order_date FROM orders ORDER BY rowid",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query orders", e))?;

        let mut raw = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
        {
            let id: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
            let customer_id: String = row
                .get(1)
                .map_err(|e| db_err("Failed to get customer_id", e))?;
            let order_date: String = row
                .get(2)
                .map_err(|e| db_err("Failed to get order_date", e))?;
            raw.push((id, customer_id, order_date));
        }

        let mut orders = Vec::with_capacity(raw.len());
        for (id, customer_id, order_date) in raw {
            let product_ids = self.product_ids_for_order(&conn, &id).await?;
            orders.push(Order {
                id: parse_uuid(&id)?,
                customer_id: parse_uuid(&customer_id)?,
                product_ids,
                order_date: parse_timestamp(&order_date)?,
            });
        }
        Ok(orders)
    }
}
