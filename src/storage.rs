use crate::domain::{Customer, Order, Product};
use crate::error::{CrmError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Storage trait for persisting CRM entities.
///
/// List operations return rows in insertion order; that is the default order
/// of the list queries. Email uniqueness is enforced here, at write time.
#[async_trait]
pub trait Storage: Send + Sync {
    // Customer operations
    async fn create_customer(&self, customer: &Customer) -> Result<()>;
    /// Create many customers in one atomic scope. Entries whose email
    /// already exists, including earlier in the same batch, are skipped;
    /// the created subset is returned in insertion order. Any other failure
    /// discards every write in the scope.
    async fn create_customers_bulk(&self, customers: &[Customer]) -> Result<Vec<Customer>>;
    async fn get_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>>;
    async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>>;
    async fn get_all_customers(&self) -> Result<Vec<Customer>>;

    // Product operations
    async fn create_product(&self, product: &Product) -> Result<()>;
    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    /// Returns the products whose ids appear in `ids`; missing ids are simply
    /// absent from the result, callers compare lengths to detect them.
    async fn get_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn get_all_products(&self) -> Result<Vec<Product>>;
    async fn update_product(&self, product: &Product) -> Result<()>;

    // Order operations. The order row and its product associations are
    // written in one atomic scope.
    async fn create_order(&self, order: &Order) -> Result<()>;
    async fn get_all_orders(&self) -> Result<Vec<Order>>;
}

/// In-memory storage implementation for development/testing.
pub struct InMemoryStorage {
    customers: Arc<Mutex<Vec<Customer>>>,
    products: Arc<Mutex<Vec<Product>>>,
    orders: Arc<Mutex<Vec<Order>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            customers: Arc::new(Mutex::new(Vec::new())),
            products: Arc::new(Mutex::new(Vec::new())),
            orders: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        let mut customers = self.customers.lock().unwrap();
        if customers
            .iter()
            .any(|c| c.email.eq_ignore_ascii_case(&customer.email))
        {
            return Err(CrmError::Conflict(format!(
                "{}: already exists",
                customer.email
            )));
        }
        debug!("Created customer {} with id {}", customer.name, customer.id);
        customers.push(customer.clone());
        Ok(())
    }

    async fn create_customers_bulk(&self, customers: &[Customer]) -> Result<Vec<Customer>> {
        // One lock across the whole batch is the atomic scope here.
        let mut existing = self.customers.lock().unwrap();
        let mut created = Vec::new();
        for customer in customers {
            if existing
                .iter()
                .any(|c| c.email.eq_ignore_ascii_case(&customer.email))
            {
                continue;
            }
            existing.push(customer.clone());
            created.push(customer.clone());
        }
        debug!("Bulk created {} of {} customers", created.len(), customers.len());
        Ok(created)
    }

    async fn get_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>> {
        let customers = self.customers.lock().unwrap();
        Ok(customers.iter().find(|c| c.id == id).cloned())
    }

    async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let customers = self.customers.lock().unwrap();
        Ok(customers
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.lock().unwrap().clone())
    }

    async fn create_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.lock().unwrap();
        debug!("Created product {} with id {}", product.name, product.id);
        products.push(product.clone());
        Ok(())
    }

    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let products = self.products.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| products.iter().find(|p| p.id == *id).cloned())
            .collect())
    }

    async fn get_all_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.lock().unwrap();
        let existing = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| CrmError::NotFound(format!("product {}", product.id)))?;
        *existing = product.clone();
        debug!("Updated product {} with id {}", product.name, product.id);
        Ok(())
    }

    async fn create_order(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.lock().unwrap();
        debug!(
            "Created order {} for customer {} with {} products",
            order.id,
            order.customer_id,
            order.product_ids.len()
        );
        orders.push(order.clone());
        Ok(())
    }

    async fn get_all_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.lock().unwrap().clone())
    }
}
