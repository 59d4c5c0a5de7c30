use chrono::{DateTime, Utc};
use common::model::Invoice;
use common::CustomerId;

/// Builder for constructing invoice ledger queries.
///
/// Results are always ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    /// Filter by customer.
    pub customer_id: Option<CustomerId>,

    /// Invoices created at or after this timestamp.
    pub from: Option<DateTime<Utc>>,

    /// Invoices created at or before this timestamp.
    pub to: Option<DateTime<Utc>>,

    /// Maximum number of invoices to return.
    pub limit: Option<usize>,

    /// Number of invoices to skip.
    pub offset: Option<usize>,
}

impl InvoiceQuery {
    /// Creates a query matching every invoice.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Creates a query for invoices created in `[from, to]`.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn customer_id(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if `invoice` passes every filter (ignores paging).
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(customer_id) = self.customer_id
            && invoice.customer_id != customer_id
        {
            return false;
        }
        if let Some(from) = self.from
            && invoice.created_at < from
        {
            return false;
        }
        if let Some(to) = self.to
            && invoice.created_at > to
        {
            return false;
        }
        true
    }
}
