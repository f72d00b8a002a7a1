use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer record. Email is globally unique; uniqueness is enforced by the
/// storage layer at write time. `created_at` is set once at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: String, email: String, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            created_at: Utc::now(),
        }
    }
}

/// A product with a fixed-precision price and a non-negative stock count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
}

impl Product {
    pub fn new(name: String, price: Decimal, stock: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            price,
            stock,
        }
    }
}

/// An order owned by one customer with a many-to-many product association.
/// Product associations are fixed at creation. The total amount is derived on
/// read from the current product prices, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_ids: Vec<Uuid>,
    pub order_date: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: Uuid, product_ids: Vec<Uuid>, order_date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            product_ids,
            order_date: order_date.unwrap_or_else(Utc::now),
        }
    }

    /// Sum of the given products' current prices.
    pub fn total_amount(products: &[Product]) -> Decimal {
        products.iter().map(|p| p.price).sum()
    }
}
