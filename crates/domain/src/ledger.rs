//! Read side of the invoice ledger.

use common::model::Invoice;
use common::{InvoiceId, ReservationId};
use store::{InvoiceQuery, Store};

use crate::error::{DomainError, Result};

/// Service for reading past sales. Invoices are append-only, so this service
/// never writes.
pub struct LedgerService<S: Store> {
    store: S,
}

impl<S: Store> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Every invoice, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        self.query_invoices(&InvoiceQuery::new()).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn query_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(DomainError::validation(format!(
                "Invalid range: {from} is after {to}"
            )));
        }
        Ok(self.store.invoices(query).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice> {
        self.store
            .invoice(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Invoice", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn invoice_for_reservation(&self, id: ReservationId) -> Result<Option<Invoice>> {
        Ok(self.store.invoice_for_reservation(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use store::InMemoryStore;

    #[tokio::test]
    async fn empty_ledger() {
        let ledger = LedgerService::new(InMemoryStore::new());
        assert!(ledger.list_invoices().await.unwrap().is_empty());
        assert!(matches!(
            ledger.get_invoice(InvoiceId::new()).await,
            Err(DomainError::NotFound { entity: "Invoice", .. })
        ));
        assert!(
            ledger
                .invoice_for_reservation(ReservationId::new())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let ledger = LedgerService::new(InMemoryStore::new());
        let now = Utc::now();
        let result = ledger
            .query_invoices(&InvoiceQuery::between(now, now - Duration::hours(1)))
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
