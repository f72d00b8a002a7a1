use crate::domain::Customer as DomainCustomer;
use async_graphql::{Object, ID};

/// GraphQL representation of a Customer
#[derive(Clone)]
pub struct Customer {
    pub inner: DomainCustomer,
}

impl From<DomainCustomer> for Customer {
    fn from(customer: DomainCustomer) -> Self {
        Self { inner: customer }
    }
}

#[Object]
impl Customer {
    /// The unique identifier for the customer
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// The customer's name
    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// The customer's email address (globally unique)
    async fn email(&self) -> &str {
        &self.inner.email
    }

    /// The customer's phone number, if one was supplied
    async fn phone(&self) -> Option<&str> {
        self.inner.phone.as_deref()
    }

    /// When the customer was created
    async fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.created_at
    }
}
