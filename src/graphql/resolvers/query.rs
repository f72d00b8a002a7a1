use crate::domain::Order as DomainOrder;
use crate::filters::{self, CustomerFilter, OrderFilter, ProductFilter, ResolvedOrder};
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Customer, Order, Product};
use async_graphql::{Context, FieldResult, InputObject, Object, ID};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Filter arguments for the customers query. Absent fields impose no
/// constraint; date bounds are inclusive.
#[derive(InputObject, Default)]
pub struct CustomerFilterInput {
    /// Case-insensitive substring match on the customer name
    pub name: Option<String>,
    /// Case-insensitive substring match on the email address
    pub email: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
    /// Matches customers whose phone number starts with the prefix (e.g. "+1")
    pub phone_starts_with: Option<String>,
}

impl From<CustomerFilterInput> for CustomerFilter {
    fn from(input: CustomerFilterInput) -> Self {
        Self {
            name_contains: input.name,
            email_contains: input.email,
            created_at_gte: input.created_at_gte,
            created_at_lte: input.created_at_lte,
            phone_starts_with: input.phone_starts_with,
        }
    }
}

/// Filter arguments for the products query. Numeric bounds are inclusive;
/// `lowStock` selects stock strictly below the threshold.
#[derive(InputObject, Default)]
pub struct ProductFilterInput {
    /// Case-insensitive substring match on the product name
    pub name: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i64>,
    pub stock_lte: Option<i64>,
    pub low_stock: Option<i64>,
}

impl From<ProductFilterInput> for ProductFilter {
    fn from(input: ProductFilterInput) -> Self {
        Self {
            name_contains: input.name,
            price_gte: input.price_gte,
            price_lte: input.price_lte,
            stock_gte: input.stock_gte,
            stock_lte: input.stock_lte,
            low_stock: input.low_stock,
        }
    }
}

/// Filter arguments for the orders query. The total-amount bounds are
/// evaluated against the derived total, recomputed per order.
#[derive(InputObject, Default)]
pub struct OrderFilterInput {
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    /// Case-insensitive substring match on the owning customer's name
    pub customer_name: Option<String>,
    /// Matches orders where any associated product's name contains the value
    pub product_name: Option<String>,
    /// Matches orders whose product associations contain the given id
    pub product_id: Option<ID>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
}

impl OrderFilterInput {
    fn into_filter(self) -> FieldResult<OrderFilter> {
        let product_id = match self.product_id {
            Some(id) => Some(Uuid::parse_str(&id)?),
            None => None,
        };
        Ok(OrderFilter {
            order_date_gte: self.order_date_gte,
            order_date_lte: self.order_date_lte,
            customer_name_contains: self.customer_name,
            product_name_contains: self.product_name,
            product_id,
            total_amount_gte: self.total_amount_gte,
            total_amount_lte: self.total_amount_lte,
        })
    }
}

/// Root query object for GraphQL
pub struct Query;

async fn resolve_orders(context: &GraphQLContext) -> FieldResult<Vec<ResolvedOrder>> {
    let orders = context.storage.get_all_orders().await?;
    let mut resolved = Vec::with_capacity(orders.len());
    for order in orders {
        let Some(customer) = context.storage.get_customer_by_id(order.customer_id).await? else {
            continue;
        };
        let products = context.storage.get_products_by_ids(&order.product_ids).await?;
        resolved.push(ResolvedOrder {
            order,
            customer,
            products,
        });
    }
    Ok(resolved)
}

#[Object]
impl Query {
    /// Liveness probe used by the heartbeat job
    async fn hello(&self) -> &str {
        "Hello, CRM is alive!"
    }

    /// List customers, optionally filtered and ordered.
    /// `orderBy` takes field names, each with an optional `-` prefix for
    /// descending; default is insertion order.
    async fn customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilterInput>,
        order_by: Option<Vec<String>>,
    ) -> FieldResult<Vec<Customer>> {
        let context = ctx.data::<GraphQLContext>()?;
        let mut customers = context.storage.get_all_customers().await?;
        if let Some(filter) = filter {
            let filter = CustomerFilter::from(filter);
            customers.retain(|c| filter.matches(c));
        }
        if let Some(order_by) = order_by {
            filters::sort_customers(&mut customers, &order_by);
        }
        Ok(customers.into_iter().map(|c| c.into()).collect())
    }

    /// List products, optionally filtered and ordered
    async fn products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
        order_by: Option<Vec<String>>,
    ) -> FieldResult<Vec<Product>> {
        let context = ctx.data::<GraphQLContext>()?;
        let mut products = context.storage.get_all_products().await?;
        if let Some(filter) = filter {
            let filter = ProductFilter::from(filter);
            products.retain(|p| filter.matches(p));
        }
        if let Some(order_by) = order_by {
            filters::sort_products(&mut products, &order_by);
        }
        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    /// List orders, optionally filtered and ordered. Total-amount filters are
    /// evaluated per order because the total is derived, not stored.
    async fn orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilterInput>,
        order_by: Option<Vec<String>>,
    ) -> FieldResult<Vec<Order>> {
        let context = ctx.data::<GraphQLContext>()?;
        let mut resolved = resolve_orders(context).await?;
        if let Some(filter) = filter {
            let filter = filter.into_filter()?;
            resolved.retain(|r| filter.matches(r));
        }
        if let Some(order_by) = order_by {
            filters::sort_orders(&mut resolved, &order_by);
        }
        Ok(resolved.into_iter().map(|r| r.order.into()).collect())
    }

    /// Total number of customers
    async fn total_customers(&self, ctx: &Context<'_>) -> FieldResult<i64> {
        let context = ctx.data::<GraphQLContext>()?;
        Ok(context.storage.get_all_customers().await?.len() as i64)
    }

    /// Total number of orders
    async fn total_orders(&self, ctx: &Context<'_>) -> FieldResult<i64> {
        let context = ctx.data::<GraphQLContext>()?;
        Ok(context.storage.get_all_orders().await?.len() as i64)
    }

    /// Sum of the derived totals of all orders
    async fn total_revenue(&self, ctx: &Context<'_>) -> FieldResult<Decimal> {
        let context = ctx.data::<GraphQLContext>()?;
        let mut revenue = Decimal::ZERO;
        for order in context.storage.get_all_orders().await? {
            let products = context.storage.get_products_by_ids(&order.product_ids).await?;
            revenue += DomainOrder::total_amount(&products);
        }
        Ok(revenue)
    }
}
