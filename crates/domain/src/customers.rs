//! Customer directory.

use common::CustomerId;
use common::model::Customer;
use store::{Store, StoreError, StoreExt, Write};

use crate::error::{DomainError, Result, non_blank, required};

/// Fields accepted when creating or updating a customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    fn normalize(self) -> Result<Self> {
        Ok(Self {
            name: required(&self.name, "Customer name")?,
            phone: non_blank(self.phone),
            email: non_blank(self.email),
        })
    }
}

/// Service for managing customers.
pub struct CustomerService<S: Store> {
    store: S,
}

impl<S: Store> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_customer(&self, details: CustomerDetails) -> Result<Customer> {
        let details = details.normalize()?;
        let customer = Customer::new(details.name, details.phone, details.email);

        self.store
            .commit_one(Write::PutCustomer(customer.clone()))
            .await?;

        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    /// Lists customers by name; `search` matches name, email or phone.
    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self, search: Option<&str>) -> Result<Vec<Customer>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.store.customers(search).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer> {
        self.store
            .customer(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        details: CustomerDetails,
    ) -> Result<Customer> {
        let details = details.normalize()?;
        let mut customer = self.get_customer(id).await?;
        customer.name = details.name;
        customer.phone = details.phone;
        customer.email = details.email;

        self.store
            .commit_one(Write::PutCustomer(customer.clone()))
            .await?;
        Ok(customer)
    }

    /// Deletes a customer. Refused while any reservation, order or invoice
    /// references them.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        match self.store.commit_one(Write::DeleteCustomer(id)).await {
            Ok(()) => {
                tracing::info!(customer_id = %id, "customer deleted");
                Ok(())
            }
            Err(StoreError::StillReferenced { referenced_by, .. }) => Err(DomainError::conflict(
                format!("cannot delete: customer still has {referenced_by}"),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
