//! Composable predicates for the list queries.
//!
//! Every field is optional; absent fields impose no constraint and the
//! supplied ones are ANDed together. Numeric and date bounds are inclusive.
//! Order totals are derived values, so the order filter is evaluated against
//! fully resolved orders rather than pushed down to storage.

use crate::domain::{Customer, Order, Product};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub name_contains: Option<String>,
    pub email_contains: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
    pub phone_starts_with: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(name) = &self.name_contains {
            if !contains_ci(&customer.name, name) {
                return false;
            }
        }
        if let Some(email) = &self.email_contains {
            if !contains_ci(&customer.email, email) {
                return false;
            }
        }
        if let Some(gte) = self.created_at_gte {
            if customer.created_at < gte {
                return false;
            }
        }
        if let Some(lte) = self.created_at_lte {
            if customer.created_at > lte {
                return false;
            }
        }
        if let Some(prefix) = &self.phone_starts_with {
            match &customer.phone {
                Some(phone) if phone.starts_with(prefix.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub name_contains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i64>,
    pub stock_lte: Option<i64>,
    /// Selects products with stock strictly below the given threshold.
    pub low_stock: Option<i64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(name) = &self.name_contains {
            if !contains_ci(&product.name, name) {
                return false;
            }
        }
        if let Some(gte) = self.price_gte {
            if product.price < gte {
                return false;
            }
        }
        if let Some(lte) = self.price_lte {
            if product.price > lte {
                return false;
            }
        }
        if let Some(gte) = self.stock_gte {
            if product.stock < gte {
                return false;
            }
        }
        if let Some(lte) = self.stock_lte {
            if product.stock > lte {
                return false;
            }
        }
        if let Some(threshold) = self.low_stock {
            if product.stock >= threshold {
                return false;
            }
        }
        true
    }
}

/// An order joined with the rows it references, as needed for filtering and
/// for computing the derived total.
#[derive(Debug, Clone)]
pub struct ResolvedOrder {
    pub order: Order,
    pub customer: Customer,
    pub products: Vec<Product>,
}

impl ResolvedOrder {
    pub fn total_amount(&self) -> Decimal {
        Order::total_amount(&self.products)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name_contains: Option<String>,
    /// Matches when any associated product's name contains the value.
    pub product_name_contains: Option<String>,
    /// Matches when the given product id is among the order's associations.
    pub product_id: Option<uuid::Uuid>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
}

impl OrderFilter {
    pub fn matches(&self, resolved: &ResolvedOrder) -> bool {
        if let Some(gte) = self.order_date_gte {
            if resolved.order.order_date < gte {
                return false;
            }
        }
        if let Some(lte) = self.order_date_lte {
            if resolved.order.order_date > lte {
                return false;
            }
        }
        if let Some(name) = &self.customer_name_contains {
            if !contains_ci(&resolved.customer.name, name) {
                return false;
            }
        }
        if let Some(name) = &self.product_name_contains {
            if !resolved.products.iter().any(|p| contains_ci(&p.name, name)) {
                return false;
            }
        }
        if let Some(id) = self.product_id {
            if !resolved.order.product_ids.contains(&id) {
                return false;
            }
        }
        if let Some(gte) = self.total_amount_gte {
            if resolved.total_amount() < gte {
                return false;
            }
        }
        if let Some(lte) = self.total_amount_lte {
            if resolved.total_amount() > lte {
                return false;
            }
        }
        true
    }
}

/// Strips a leading `-` and reports whether the key requested descending order.
fn parse_key(key: &str) -> (&str, bool) {
    match key.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (key, false),
    }
}

fn apply<T, K: Ord>(items: &mut [T], descending: bool, key_fn: impl Fn(&T) -> K) {
    items.sort_by(|a, b| {
        let ord = key_fn(a).cmp(&key_fn(b));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Sorts by the given field names; a leading `-` means descending. Keys are
/// applied in reverse so the first key dominates (the sorts are stable).
/// Unknown field names are ignored.
pub fn sort_customers(customers: &mut [Customer], order_by: &[String]) {
    for key in order_by.iter().rev() {
        let (field, desc) = parse_key(key);
        match field {
            "name" => apply(customers, desc, |c: &Customer| c.name.to_lowercase()),
            "email" => apply(customers, desc, |c: &Customer| c.email.to_lowercase()),
            "createdAt" | "created_at" => apply(customers, desc, |c: &Customer| c.created_at),
            _ => {}
        }
    }
}

pub fn sort_products(products: &mut [Product], order_by: &[String]) {
    for key in order_by.iter().rev() {
        let (field, desc) = parse_key(key);
        match field {
            "name" => apply(products, desc, |p: &Product| p.name.to_lowercase()),
            "price" => apply(products, desc, |p: &Product| p.price),
            "stock" => apply(products, desc, |p: &Product| p.stock),
            _ => {}
        }
    }
}

pub fn sort_orders(orders: &mut [ResolvedOrder], order_by: &[String]) {
    for key in order_by.iter().rev() {
        let (field, desc) = parse_key(key);
        match field {
            "orderDate" | "order_date" => {
                apply(orders, desc, |o: &ResolvedOrder| o.order.order_date)
            }
            "customerName" | "customer_name" => {
                apply(orders, desc, |o: &ResolvedOrder| o.customer.name.to_lowercase())
            }
            "totalAmount" | "total_amount" => {
                apply(orders, desc, |o: &ResolvedOrder| o.total_amount())
            }
            _ => {}
        }
    }
}
