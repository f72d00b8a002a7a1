use crate::domain::Order as DomainOrder;
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};
use rust_decimal::Decimal;

/// GraphQL representation of an Order
#[derive(Clone)]
pub struct Order {
    pub inner: DomainOrder,
}

impl From<DomainOrder> for Order {
    fn from(order: DomainOrder) -> Self {
        Self { inner: order }
    }
}

#[Object]
impl Order {
    /// The unique identifier for the order
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// When the order was placed
    async fn order_date(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.order_date
    }

    /// The customer who placed the order
    async fn customer(&self, ctx: &Context<'_>) -> FieldResult<super::customer::Customer> {
        let context = ctx.data::<GraphQLContext>()?;
        match context.storage.get_customer_by_id(self.inner.customer_id).await {
            Ok(Some(customer)) => Ok(customer.into()),
            Ok(None) => Err("Order customer not found".into()),
            Err(e) => Err(e.into()),
        }
    }

    /// The products associated with the order
    async fn products(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::product::Product>> {
        let context = ctx.data::<GraphQLContext>()?;
        match context.storage.get_products_by_ids(&self.inner.product_ids).await {
            Ok(products) => Ok(products.into_iter().map(|p| p.into()).collect()),
            Err(e) => Err(e.into()),
        }
    }

    /// Sum of the current prices of the associated products. Recomputed on
    /// every read; a later price change is reflected in past orders.
    async fn total_amount(&self, ctx: &Context<'_>) -> FieldResult<Decimal> {
        let context = ctx.data::<GraphQLContext>()?;
        let products = context
            .storage
            .get_products_by_ids(&self.inner.product_ids)
            .await?;
        Ok(DomainOrder::total_amount(&products))
    }
}
