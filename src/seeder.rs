//! Development data seeder: synthetic but schema-valid customers, products
//! and orders with random customer/product associations.

use crate::domain::{Customer, Order, Product};
use crate::error::Result;
use crate::storage::Storage;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Erin", "Frank", "Grace", "Hector", "Ingrid", "Jamal",
    "Kara", "Liam", "Mona", "Noel", "Olga", "Pete", "Quinn", "Rosa", "Sam", "Tara",
];
const LAST_NAMES: &[&str] = &[
    "Anderson", "Baker", "Chen", "Diaz", "Evans", "Foster", "Garcia", "Hughes", "Ito", "Jones",
    "Kim", "Lopez", "Murphy", "Nguyen", "Okafor", "Patel", "Quist", "Rivera", "Singh", "Torres",
];
const PRODUCT_NAMES: &[&str] = &[
    "Laptop", "Monitor", "Keyboard", "Mouse", "Headset", "Webcam", "Dock", "Cable", "Charger",
    "Tablet", "Speaker", "Microphone", "Printer", "Router", "Backpack", "Stand",
];

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

fn random_phone(rng: &mut impl Rng) -> Option<String> {
    match rng.gen_range(0..3) {
        0 => Some(format!("+1{}", rng.gen_range(2_000_000_000u64..9_999_999_999u64))),
        1 => Some(format!(
            "{:03}-{:03}-{:04}",
            rng.gen_range(200..999),
            rng.gen_range(100..999),
            rng.gen_range(0..9999)
        )),
        _ => None,
    }
}

fn generate_customers(count: usize) -> Vec<Customer> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let first = FIRST_NAMES.choose(&mut rng).unwrap();
            let last = LAST_NAMES.choose(&mut rng).unwrap();
            // The index keeps generated emails unique
            let email = format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), i);
            Customer::new(format!("{first} {last}"), email, random_phone(&mut rng))
        })
        .collect()
}

fn generate_products(count: usize) -> Vec<Product> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let base = PRODUCT_NAMES[i % PRODUCT_NAMES.len()];
            let name = if i < PRODUCT_NAMES.len() {
                base.to_string()
            } else {
                format!("{} {}", base, i / PRODUCT_NAMES.len() + 1)
            };
            // 10.00 to 500.00, two decimal places
            let price = Decimal::new(rng.gen_range(1000..=50000), 2);
            Product::new(name, price, rng.gen_range(5..=100))
        })
        .collect()
}

fn generate_orders(count: usize, customers: &[Customer], products: &[Product]) -> Vec<Order> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let customer = customers.choose(&mut rng).unwrap();
            // 1 to 3 distinct products per order
            let take = rng.gen_range(1..=3usize.min(products.len()));
            let product_ids = rand::seq::index::sample(&mut rng, products.len(), take)
                .into_iter()
                .map(|i| products[i].id)
                .collect();
            let order_date = Utc::now() - Duration::minutes(rng.gen_range(0..30 * 24 * 60));
            Order::new(customer.id, product_ids, Some(order_date))
        })
        .collect()
}

/// Seed the given storage with the requested number of entities. Orders are
/// skipped when there are no customers or products to associate.
pub async fn seed(
    storage: &dyn Storage,
    num_customers: usize,
    num_products: usize,
    num_orders: usize,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let customers = generate_customers(num_customers);
    for customer in &customers {
        storage.create_customer(customer).await?;
        summary.customers += 1;
    }

    let products = generate_products(num_products);
    for product in &products {
        storage.create_product(product).await?;
        summary.products += 1;
    }

    if customers.is_empty() || products.is_empty() {
        info!("Skipping order creation - missing customers or products");
        return Ok(summary);
    }

    for order in generate_orders(num_orders, &customers, &products) {
        storage.create_order(&order).await?;
        summary.orders += 1;
    }

    info!(
        "Seeded {} customers, {} products, {} orders",
        summary.customers, summary.products, summary.orders
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use crate::validation::{is_valid_email, is_valid_phone};
    use std::collections::HashSet;

    #[tokio::test]
    async fn seeds_the_requested_counts() {
        let storage = InMemoryStorage::new();
        let summary = seed(&storage, 10, 8, 15).await.unwrap();
        assert_eq!(summary.customers, 10);
        assert_eq!(summary.products, 8);
        assert_eq!(summary.orders, 15);
        assert_eq!(storage.get_all_orders().await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn generated_fields_are_schema_valid() {
        let storage = InMemoryStorage::new();
        seed(&storage, 25, 5, 10).await.unwrap();

        let customers = storage.get_all_customers().await.unwrap();
        let emails: HashSet<&str> = customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails.len(), customers.len(), "emails must be unique");
        for customer in &customers {
            assert!(is_valid_email(&customer.email));
            if let Some(phone) = &customer.phone {
                assert!(is_valid_phone(phone), "bad phone: {phone}");
            }
        }

        for product in storage.get_all_products().await.unwrap() {
            assert!(product.price >= Decimal::new(1000, 2));
            assert!(product.stock >= 5);
        }

        for order in storage.get_all_orders().await.unwrap() {
            assert!(!order.product_ids.is_empty());
            assert!(order.product_ids.len() <= 3);
            let distinct: HashSet<_> = order.product_ids.iter().collect();
            assert_eq!(distinct.len(), order.product_ids.len());
        }
    }

    #[tokio::test]
    async fn skips_orders_without_products() {
        let storage = InMemoryStorage::new();
        let summary = seed(&storage, 3, 0, 5).await.unwrap();
        assert_eq!(summary.orders, 0);
    }
}
