use crate::constants::{LOW_STOCK_THRESHOLD, RESTOCK_AMOUNT};
use crate::domain;
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Customer, Order, Product};
use crate::validation::{is_valid_email, is_valid_phone};
use async_graphql::{Context, FieldResult, InputObject, Object, SimpleObject, ID};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(InputObject, Clone)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(SimpleObject)]
pub struct CreateCustomerPayload {
    pub customer: Option<Customer>,
    pub success: bool,
    pub message: String,
}

impl CreateCustomerPayload {
    fn failure(message: &str) -> Self {
        Self {
            customer: None,
            success: false,
            message: message.to_string(),
        }
    }
}

#[derive(SimpleObject)]
pub struct BulkCreateCustomersPayload {
    pub customers: Vec<Customer>,
    pub errors: Vec<String>,
}

#[derive(InputObject)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    pub stock: Option<i64>,
}

#[derive(SimpleObject)]
pub struct CreateProductPayload {
    pub product: Option<Product>,
    pub success: bool,
    pub message: String,
}

impl CreateProductPayload {
    fn failure(message: &str) -> Self {
        Self {
            product: None,
            success: false,
            message: message.to_string(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateOrderInput {
    pub customer_id: ID,
    pub product_ids: Vec<ID>,
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(SimpleObject)]
pub struct CreateOrderPayload {
    pub order: Option<Order>,
    pub message: Option<String>,
    pub errors: Vec<String>,
}

impl CreateOrderPayload {
    fn failure(error: String) -> Self {
        Self {
            order: None,
            message: None,
            errors: vec![error],
        }
    }
}

#[derive(SimpleObject)]
pub struct UpdateLowStockProductsPayload {
    pub products: Vec<Product>,
    pub success: bool,
    pub message: String,
}

/// Returns the first format violation for a customer input, if any.
fn format_violation(input: &CustomerInput) -> Option<&'static str> {
    if !is_valid_email(&input.email) {
        return Some("Invalid email format.");
    }
    if let Some(phone) = &input.phone {
        if !is_valid_phone(phone) {
            return Some("Invalid phone format. Use +1234567890 or 123-456-7890.");
        }
    }
    None
}

/// Root mutation object for GraphQL.
///
/// Business-rule failures (validation, conflicts, unknown ids) are returned
/// as structured payloads with a success flag or error list, never as
/// GraphQL-level errors, so clients can tell "request succeeded, rule failed"
/// from "request failed".
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a single customer. Email format, email uniqueness and phone
    /// format are all checked before anything is written.
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CustomerInput,
    ) -> FieldResult<CreateCustomerPayload> {
        let context = ctx.data::<GraphQLContext>()?;

        if let Some(message) = format_violation(&input) {
            return Ok(CreateCustomerPayload::failure(message));
        }
        if context.storage.get_customer_by_email(&input.email).await?.is_some() {
            return Ok(CreateCustomerPayload::failure("Email already exists."));
        }

        let customer = domain::Customer::new(input.name, input.email, input.phone);
        match context.storage.create_customer(&customer).await {
            Ok(()) => Ok(CreateCustomerPayload {
                customer: Some(customer.into()),
                success: true,
                message: "Customer created successfully.".to_string(),
            }),
            // A concurrent write can still lose the uniqueness race.
            Err(crate::error::CrmError::Conflict(_)) => {
                Ok(CreateCustomerPayload::failure("Email already exists."))
            }
            Err(e) => Ok(CreateCustomerPayload::failure(&format!(
                "Unexpected error: {e}"
            ))),
        }
    }

    /// Create many customers in one call, inside one atomic scope. A
    /// duplicate email or format violation is recorded as an error string for
    /// that entry and the rest of the batch proceeds; any other failure
    /// discards every write in the call.
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<CustomerInput>,
    ) -> FieldResult<BulkCreateCustomersPayload> {
        let context = ctx.data::<GraphQLContext>()?;

        // One slot per entry keeps error messages in input order.
        let mut slots: Vec<Option<String>> = Vec::with_capacity(input.len());
        let mut candidates = Vec::new();
        let mut candidate_slots = Vec::new();
        for entry in input {
            if let Some(message) = format_violation(&entry) {
                slots.push(Some(format!("{}: {}", entry.email, message)));
                continue;
            }
            let customer = domain::Customer::new(entry.name, entry.email, entry.phone);
            candidate_slots.push((slots.len(), customer.id, customer.email.clone()));
            slots.push(None);
            candidates.push(customer);
        }

        let created = match context.storage.create_customers_bulk(&candidates).await {
            Ok(created) => created,
            Err(e) => {
                return Ok(BulkCreateCustomersPayload {
                    customers: vec![],
                    errors: vec![format!("Unexpected error: {e}")],
                })
            }
        };

        // Anything the storage skipped inside the scope was a duplicate.
        let created_ids: HashSet<Uuid> = created.iter().map(|c| c.id).collect();
        for (slot, id, email) in candidate_slots {
            if !created_ids.contains(&id) {
                slots[slot] = Some(format!("{email}: already exists"));
            }
        }

        Ok(BulkCreateCustomersPayload {
            customers: created.into_iter().map(|c| c.into()).collect(),
            errors: slots.into_iter().flatten().collect(),
        })
    }

    /// Create a product. Price and stock must be non-negative; stock defaults
    /// to 0 when absent.
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: CreateProductInput,
    ) -> FieldResult<CreateProductPayload> {
        let context = ctx.data::<GraphQLContext>()?;

        if input.price < Decimal::ZERO {
            return Ok(CreateProductPayload::failure("Price must be positive"));
        }
        let stock = input.stock.unwrap_or(0);
        if stock < 0 {
            return Ok(CreateProductPayload::failure("Stock must be positive"));
        }

        let product = domain::Product::new(input.name, input.price, stock);
        match context.storage.create_product(&product).await {
            Ok(()) => Ok(CreateProductPayload {
                product: Some(product.into()),
                success: true,
                message: "Product created successfully.".to_string(),
            }),
            Err(e) => Ok(CreateProductPayload::failure(&format!(
                "Unexpected error: {e}"
            ))),
        }
    }

    /// Create an order for a customer with one or more products. The order
    /// row and its associations are written in one atomic scope; an
    /// unexpected persistence failure is surfaced as a generic error entry.
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        input: CreateOrderInput,
    ) -> FieldResult<CreateOrderPayload> {
        let context = ctx.data::<GraphQLContext>()?;

        let customer_id = match Uuid::parse_str(&input.customer_id) {
            Ok(id) => id,
            Err(_) => return Ok(CreateOrderPayload::failure("Invalid customer ID.".into())),
        };
        let customer = match context.storage.get_customer_by_id(customer_id).await? {
            Some(customer) => customer,
            None => return Ok(CreateOrderPayload::failure("Invalid customer ID.".into())),
        };

        if input.product_ids.is_empty() {
            return Ok(CreateOrderPayload::failure(
                "At least one product must be selected.".into(),
            ));
        }

        // Ids that do not parse as UUIDs cannot resolve either; report them
        // together with the unknown ones.
        let mut product_ids = Vec::with_capacity(input.product_ids.len());
        let mut invalid_ids = Vec::new();
        for id in &input.product_ids {
            match Uuid::parse_str(id) {
                Ok(parsed) => product_ids.push(parsed),
                Err(_) => invalid_ids.push(id.to_string()),
            }
        }
        // The association is a set: a repeated id counts once.
        let mut seen = HashSet::new();
        product_ids.retain(|id| seen.insert(*id));

        let products = context.storage.get_products_by_ids(&product_ids).await?;
        if products.len() != product_ids.len() {
            let found: Vec<Uuid> = products.iter().map(|p| p.id).collect();
            invalid_ids.extend(
                product_ids
                    .iter()
                    .filter(|id| !found.contains(id))
                    .map(|id| id.to_string()),
            );
        }
        if !invalid_ids.is_empty() {
            return Ok(CreateOrderPayload::failure(format!(
                "Invalid product IDs: {}",
                invalid_ids.join(", ")
            )));
        }

        let order = domain::Order::new(customer.id, product_ids, input.order_date);
        match context.storage.create_order(&order).await {
            Ok(()) => Ok(CreateOrderPayload {
                order: Some(order.into()),
                message: Some("Order created successfully".to_string()),
                errors: vec![],
            }),
            Err(e) => Ok(CreateOrderPayload::failure(format!("Unexpected error: {e}"))),
        }
    }

    /// Raise the stock of every low-stock product. Threshold and restock
    /// amount are server-side policy; the restock job just invokes this.
    async fn update_low_stock_products(
        &self,
        ctx: &Context<'_>,
    ) -> FieldResult<UpdateLowStockProductsPayload> {
        let context = ctx.data::<GraphQLContext>()?;

        let low_stock: Vec<domain::Product> = context
            .storage
            .get_all_products()
            .await?
            .into_iter()
            .filter(|p| p.stock < LOW_STOCK_THRESHOLD)
            .collect();

        let mut updated = Vec::with_capacity(low_stock.len());
        for mut product in low_stock {
            product.stock += RESTOCK_AMOUNT;
            if let Err(e) = context.storage.update_product(&product).await {
                return Ok(UpdateLowStockProductsPayload {
                    products: updated,
                    success: false,
                    message: format!("Unexpected error: {e}"),
                });
            }
            updated.push(product.into());
        }

        let message = format!("Successfully restocked {} products", updated.len());
        Ok(UpdateLowStockProductsPayload {
            products: updated,
            success: true,
            message,
        })
    }
}
