use crate::domain::Product as DomainProduct;
use async_graphql::{Object, ID};
use rust_decimal::Decimal;

/// GraphQL representation of a Product
#[derive(Clone)]
pub struct Product {
    pub inner: DomainProduct,
}

impl From<DomainProduct> for Product {
    fn from(product: DomainProduct) -> Self {
        Self { inner: product }
    }
}

#[Object]
impl Product {
    /// The unique identifier for the product
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// The product's name
    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// The product's price
    async fn price(&self) -> Decimal {
        self.inner.price
    }

    /// Units currently in stock
    async fn stock(&self) -> i64 {
        self.inner.stock
    }
}
