use async_trait::async_trait;
use common::model::{
    Category, Customer, Invoice, MenuItem, Order, OrderStatus, Reservation, Table,
};
use common::{
    CategoryId, CustomerId, InvoiceId, MenuItemId, OrderId, ReservationId, TableId,
};

use crate::{InvoiceQuery, Result, StoreError, Write, WriteBatch};

/// Core trait for store implementations.
///
/// Reads return `Ok(None)` for missing rows so callers decide what absence
/// means. All mutation goes through [`Store::commit`], which applies a
/// [`WriteBatch`] atomically. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Customers ordered by name, optionally filtered by a case-insensitive
    /// search over name, email and phone.
    async fn customers(&self, search: Option<&str>) -> Result<Vec<Customer>>;

    async fn table(&self, id: TableId) -> Result<Option<Table>>;

    /// Tables ordered by name.
    async fn tables(&self) -> Result<Vec<Table>>;

    async fn category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Categories ordered by name.
    async fn categories(&self) -> Result<Vec<Category>>;

    async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>>;

    /// Menu items ordered by name.
    async fn menu_items(&self) -> Result<Vec<MenuItem>>;

    async fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>>;

    /// Reservations ordered by date/time, latest first.
    async fn reservations(&self) -> Result<Vec<Reservation>>;

    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Orders ordered by opening time, latest first.
    async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>>;

    async fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>>;

    async fn invoice_for_reservation(&self, id: ReservationId) -> Result<Option<Invoice>>;

    /// Invoices matching `query`, newest first.
    async fn invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>>;

    /// Applies every write in `batch` atomically.
    ///
    /// On error nothing from the batch is visible to later reads.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;
}

/// Extension trait providing convenience methods for stores.
#[async_trait]
pub trait StoreExt: Store {
    /// Commits a single write.
    async fn commit_one(&self, write: Write) -> Result<()> {
        self.commit(WriteBatch::from(write)).await
    }

    async fn customer_exists(&self, id: CustomerId) -> Result<bool> {
        Ok(self.customer(id).await?.is_some())
    }

    async fn table_exists(&self, id: TableId) -> Result<bool> {
        Ok(self.table(id).await?.is_some())
    }
}

// Blanket implementation for all Store implementations
impl<T: Store + ?Sized> StoreExt for T {}

/// Rejects batches that can never be committed.
pub(crate) fn validate_batch(batch: &WriteBatch) -> Result<()> {
    if batch.is_empty() {
        return Err(StoreError::Rejected(
            "Cannot commit an empty write batch".to_string(),
        ));
    }
    Ok(())
}
