use anyhow::Result;
use async_graphql::{Request, Variables};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;

use crm_backend::domain::{Customer, Order, Product};
use crm_backend::graphql::{create_schema, GraphQLSchema};
use crm_backend::storage::{InMemoryStorage, Storage};

struct TestApp {
    storage: Arc<InMemoryStorage>,
    schema: GraphQLSchema,
}

fn app() -> TestApp {
    let storage = Arc::new(InMemoryStorage::new());
    let schema = create_schema(storage.clone());
    TestApp { storage, schema }
}

async fn execute(schema: &GraphQLSchema, request: impl Into<Request>) -> Value {
    let response = schema.execute(request).await;
    assert!(
        response.errors.is_empty(),
        "unexpected GraphQL errors: {:?}",
        response.errors
    );
    response.data.into_json().expect("data should be JSON")
}

fn create_customer_mutation(name: &str, email: &str, phone: Option<&str>) -> String {
    let phone = match phone {
        Some(p) => format!(r#", phone: "{p}""#),
        None => String::new(),
    };
    format!(
        r#"mutation {{
            createCustomer(input: {{ name: "{name}", email: "{email}"{phone} }}) {{
                success
                message
                customer {{ id name email phone }}
            }}
        }}"#
    )
}

#[tokio::test]
async fn create_customer_rejects_malformed_email_without_writing() -> Result<()> {
    let app = app();
    for email in ["not-an-email", "missing@tld", "@example.com"] {
        let data = execute(
            &app.schema,
            create_customer_mutation("Alice", email, None).as_str(),
        )
        .await;
        assert_eq!(data["createCustomer"]["success"], json!(false));
        assert_eq!(data["createCustomer"]["message"], "Invalid email format.");
        assert!(data["createCustomer"]["customer"].is_null());
    }
    assert!(app.storage.get_all_customers().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_reported_and_row_count_unchanged() -> Result<()> {
    let app = app();
    let first = execute(
        &app.schema,
        create_customer_mutation("Alice", "alice@example.com", None).as_str(),
    )
    .await;
    assert_eq!(first["createCustomer"]["success"], json!(true));

    let second = execute(
        &app.schema,
        create_customer_mutation("Impostor", "alice@example.com", None).as_str(),
    )
    .await;
    assert_eq!(second["createCustomer"]["success"], json!(false));
    assert_eq!(second["createCustomer"]["message"], "Email already exists.");
    assert_eq!(app.storage.get_all_customers().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn phone_format_is_validated_when_present() -> Result<()> {
    let app = app();

    let bad = execute(
        &app.schema,
        create_customer_mutation("Bob", "bob@example.com", Some("555 1234")).as_str(),
    )
    .await;
    assert_eq!(bad["createCustomer"]["success"], json!(false));
    assert_eq!(
        bad["createCustomer"]["message"],
        "Invalid phone format. Use +1234567890 or 123-456-7890."
    );

    for (i, phone) in ["+1234567890", "123-456-7890"].iter().enumerate() {
        let email = format!("bob{i}@example.com");
        let ok = execute(
            &app.schema,
            create_customer_mutation("Bob", &email, Some(phone)).as_str(),
        )
        .await;
        assert_eq!(ok["createCustomer"]["success"], json!(true));
        assert_eq!(ok["createCustomer"]["customer"]["phone"], json!(phone));
    }
    assert_eq!(app.storage.get_all_customers().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn create_product_validates_price_and_stock_independently() -> Result<()> {
    let app = app();

    let bad_price = execute(
        &app.schema,
        r#"mutation { createProduct(input: { name: "X", price: "-1.00", stock: 5 }) { success message } }"#,
    )
    .await;
    assert_eq!(bad_price["createProduct"]["success"], json!(false));
    assert_eq!(bad_price["createProduct"]["message"], "Price must be positive");

    let bad_stock = execute(
        &app.schema,
        r#"mutation { createProduct(input: { name: "X", price: "1.00", stock: -5 }) { success message } }"#,
    )
    .await;
    assert_eq!(bad_stock["createProduct"]["success"], json!(false));
    assert_eq!(bad_stock["createProduct"]["message"], "Stock must be positive");

    let defaulted = execute(
        &app.schema,
        r#"mutation { createProduct(input: { name: "Laptop", price: "999.99" }) { success product { stock } } }"#,
    )
    .await;
    assert_eq!(defaulted["createProduct"]["success"], json!(true));
    assert_eq!(defaulted["createProduct"]["product"]["stock"], json!(0));
    assert_eq!(app.storage.get_all_products().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn create_order_requires_at_least_one_product() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;

    let query = format!(
        r#"mutation {{
            createOrder(input: {{ customerId: "{}", productIds: [] }}) {{ order {{ id }} errors }}
        }}"#,
        customer.id
    );
    let data = execute(&app.schema, query.as_str()).await;
    assert!(data["createOrder"]["order"].is_null());
    assert_eq!(
        data["createOrder"]["errors"],
        json!(["At least one product must be selected."])
    );
    assert!(app.storage.get_all_orders().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_order_rejects_unknown_customer() -> Result<()> {
    let app = app();
    let product = Product::new("Laptop".into(), Decimal::new(99999, 2), 3);
    app.storage.create_product(&product).await?;

    let query = format!(
        r#"mutation {{
            createOrder(input: {{ customerId: "{}", productIds: ["{}"] }}) {{ order {{ id }} errors }}
        }}"#,
        uuid::Uuid::new_v4(),
        product.id
    );
    let data = execute(&app.schema, query.as_str()).await;
    assert_eq!(data["createOrder"]["errors"], json!(["Invalid customer ID."]));
    assert!(app.storage.get_all_orders().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_order_lists_exactly_the_unresolvable_product_ids() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;
    let product = Product::new("Laptop".into(), Decimal::new(99999, 2), 3);
    app.storage.create_product(&product).await?;

    let missing_a = uuid::Uuid::new_v4();
    let missing_b = uuid::Uuid::new_v4();
    let query = format!(
        r#"mutation {{
            createOrder(input: {{ customerId: "{}", productIds: ["{}", "{missing_a}", "{missing_b}"] }}) {{
                order {{ id }}
                errors
            }}
        }}"#,
        customer.id, product.id
    );
    let data = execute(&app.schema, query.as_str()).await;
    assert_eq!(
        data["createOrder"]["errors"],
        json!([format!("Invalid product IDs: {missing_a}, {missing_b}")])
    );
    assert!(app.storage.get_all_orders().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn successful_order_reports_total_from_current_prices() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;
    let laptop = Product::new("Laptop".into(), Decimal::new(100000, 2), 3);
    let mouse = Product::new("Mouse".into(), Decimal::new(2500, 2), 10);
    app.storage.create_product(&laptop).await?;
    app.storage.create_product(&mouse).await?;

    let mutation = format!(
        r#"mutation {{
            createOrder(input: {{ customerId: "{}", productIds: ["{}", "{}"] }}) {{
                message
                errors
                order {{ id totalAmount customer {{ email }} }}
            }}
        }}"#,
        customer.id, laptop.id, mouse.id
    );
    let data = execute(&app.schema, mutation.as_str()).await;
    assert_eq!(data["createOrder"]["message"], "Order created successfully");
    assert_eq!(data["createOrder"]["errors"], json!([]));
    assert_eq!(data["createOrder"]["order"]["totalAmount"], json!("1025.00"));
    assert_eq!(
        data["createOrder"]["order"]["customer"]["email"],
        "alice@example.com"
    );

    // The total is derived on read: a later price change shows up in the
    // reported total for the existing order.
    let mut cheaper = laptop.clone();
    cheaper.price = Decimal::new(50000, 2);
    app.storage.update_product(&cheaper).await?;

    let data = execute(&app.schema, "{ orders { totalAmount } }").await;
    assert_eq!(data["orders"][0]["totalAmount"], json!("525.00"));
    Ok(())
}

#[tokio::test]
async fn bulk_create_skips_bad_entries_without_aborting() -> Result<()> {
    let app = app();
    let existing = Customer::new("Seen".into(), "dup@example.com".into(), None);
    app.storage.create_customer(&existing).await?;

    let mutation = r#"mutation {
        bulkCreateCustomers(input: [
            { name: "A", email: "a@example.com" },
            { name: "B", email: "dup@example.com" },
            { name: "C", email: "not-an-email" },
            { name: "D", email: "d@example.com", phone: "+1206555" },
            { name: "E", email: "e@example.com", phone: "123-456-7890" }
        ]) {
            customers { email }
            errors
        }
    }"#;
    let data = execute(&app.schema, mutation).await;

    let created = data["bulkCreateCustomers"]["customers"].as_array().unwrap();
    let emails: Vec<&str> = created.iter().map(|c| c["email"].as_str().unwrap()).collect();
    assert_eq!(emails, vec!["a@example.com", "d@example.com", "e@example.com"]);

    let errors = data["bulkCreateCustomers"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "dup@example.com: already exists");
    assert!(errors[1]
        .as_str()
        .unwrap()
        .starts_with("not-an-email: Invalid email format."));

    // 1 pre-existing + 3 created
    assert_eq!(app.storage.get_all_customers().await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn bulk_create_detects_duplicates_within_the_same_batch() -> Result<()> {
    let app = app();

    let mutation = r#"mutation {
        bulkCreateCustomers(input: [
            { name: "First", email: "same@example.com" },
            { name: "Second", email: "same@example.com" }
        ]) {
            customers { name }
            errors
        }
    }"#;
    let data = execute(&app.schema, mutation).await;

    let created = data["bulkCreateCustomers"]["customers"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["name"], "First");
    assert_eq!(
        data["bulkCreateCustomers"]["errors"],
        json!(["same@example.com: already exists"])
    );
    assert_eq!(app.storage.get_all_customers().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn repeated_product_id_counts_once_per_order() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;
    let product = Product::new("Laptop".into(), Decimal::new(100000, 2), 3);
    app.storage.create_product(&product).await?;

    let mutation = format!(
        r#"mutation {{
            createOrder(input: {{ customerId: "{}", productIds: ["{}", "{}"] }}) {{
                errors
                order {{ totalAmount products {{ id }} }}
            }}
        }}"#,
        customer.id, product.id, product.id
    );
    let data = execute(&app.schema, mutation.as_str()).await;
    assert_eq!(data["createOrder"]["errors"], json!([]));
    assert_eq!(data["createOrder"]["order"]["totalAmount"], json!("1000.00"));
    assert_eq!(
        data["createOrder"]["order"]["products"].as_array().unwrap().len(),
        1
    );

    let orders = app.storage.get_all_orders().await?;
    assert_eq!(orders[0].product_ids, vec![product.id]);
    Ok(())
}

#[tokio::test]
async fn low_stock_filter_excludes_the_threshold_itself() -> Result<()> {
    let app = app();
    for (name, stock) in [("under", 19), ("at", 20), ("over", 21)] {
        let product = Product::new(name.into(), Decimal::new(1000, 2), stock);
        app.storage.create_product(&product).await?;
    }

    let data = execute(
        &app.schema,
        "{ products(filter: { lowStock: 20 }) { name stock } }",
    )
    .await;
    let products = data["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "under");
    Ok(())
}

#[tokio::test]
async fn order_product_id_filter_matches_containment_without_duplicates() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;
    let target = Product::new("Laptop".into(), Decimal::new(100000, 2), 3);
    let other = Product::new("Mouse".into(), Decimal::new(2500, 2), 10);
    app.storage.create_product(&target).await?;
    app.storage.create_product(&other).await?;

    let with_target = Order::new(customer.id, vec![target.id, other.id], None);
    let without = Order::new(customer.id, vec![other.id], None);
    app.storage.create_order(&with_target).await?;
    app.storage.create_order(&without).await?;

    let query = format!(r#"{{ orders(filter: {{ productId: "{}" }}) {{ id }} }}"#, target.id);
    let data = execute(&app.schema, query.as_str()).await;
    let orders = data["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], json!(with_target.id.to_string()));
    Ok(())
}

#[tokio::test]
async fn order_date_filter_supports_the_reminder_window() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;
    let product = Product::new("Laptop".into(), Decimal::new(100000, 2), 3);
    app.storage.create_product(&product).await?;

    let recent = Order::new(customer.id, vec![product.id], Some(Utc::now() - Duration::days(2)));
    let stale = Order::new(customer.id, vec![product.id], Some(Utc::now() - Duration::days(30)));
    app.storage.create_order(&recent).await?;
    app.storage.create_order(&stale).await?;

    let query = r#"query RecentOrders($fromDate: DateTime!) {
        orders(filter: { orderDateGte: $fromDate }) {
            id
            customer { email }
        }
    }"#;
    let from_date = (Utc::now() - Duration::days(7)).to_rfc3339();
    let request =
        Request::new(query).variables(Variables::from_json(json!({ "fromDate": from_date })));
    let data = execute(&app.schema, request).await;

    let orders = data["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], json!(recent.id.to_string()));
    assert_eq!(orders[0]["customer"]["email"], "alice@example.com");
    Ok(())
}

#[tokio::test]
async fn order_by_sorts_lists() -> Result<()> {
    let app = app();
    for (name, price) in [("Mid", 2000i64), ("Cheap", 1000), ("Dear", 3000)] {
        let product = Product::new(name.into(), Decimal::new(price, 2), 10);
        app.storage.create_product(&product).await?;
    }

    let data = execute(&app.schema, r#"{ products(orderBy: ["-price"]) { name } }"#).await;
    let names: Vec<&str> = data["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dear", "Mid", "Cheap"]);
    Ok(())
}

#[tokio::test]
async fn aggregates_cover_the_report_query() -> Result<()> {
    let app = app();
    let customer = Customer::new("Alice".into(), "alice@example.com".into(), None);
    app.storage.create_customer(&customer).await?;
    let product = Product::new("Laptop".into(), Decimal::new(100000, 2), 3);
    app.storage.create_product(&product).await?;
    for _ in 0..2 {
        let order = Order::new(customer.id, vec![product.id], None);
        app.storage.create_order(&order).await?;
    }

    let data = execute(&app.schema, "{ totalCustomers totalOrders totalRevenue }").await;
    assert_eq!(data["totalCustomers"], json!(1));
    assert_eq!(data["totalOrders"], json!(2));
    assert_eq!(data["totalRevenue"], json!("2000.00"));
    Ok(())
}

#[tokio::test]
async fn update_low_stock_products_applies_server_side_policy() -> Result<()> {
    let app = app();
    let low = Product::new("Cable".into(), Decimal::new(500, 2), 4);
    let boundary = Product::new("Mouse".into(), Decimal::new(2500, 2), 10);
    let high = Product::new("Laptop".into(), Decimal::new(100000, 2), 50);
    for product in [&low, &boundary, &high] {
        app.storage.create_product(product).await?;
    }

    let data = execute(
        &app.schema,
        "mutation { updateLowStockProducts { success message products { name stock } } }",
    )
    .await;
    assert_eq!(data["updateLowStockProducts"]["success"], json!(true));
    assert_eq!(
        data["updateLowStockProducts"]["message"],
        "Successfully restocked 1 products"
    );
    let updated = data["updateLowStockProducts"]["products"].as_array().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["name"], "Cable");
    assert_eq!(updated[0]["stock"], json!(14));

    // Stock at the threshold is not considered low
    let kept = app.storage.get_product_by_id(boundary.id).await?.unwrap();
    assert_eq!(kept.stock, 10);
    Ok(())
}

#[tokio::test]
async fn hello_probe_answers() -> Result<()> {
    let app = app();
    let data = execute(&app.schema, "{ hello }").await;
    assert_eq!(data["hello"], "Hello, CRM is alive!");
    Ok(())
}
