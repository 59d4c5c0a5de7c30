use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::model::{
    Category, Customer, Invoice, MenuItem, Order, OrderStatus, Reservation, Table,
};
use common::{
    CategoryId, CustomerId, InvoiceId, MenuItemId, OrderId, ReservationId, TableId,
};
use tokio::sync::RwLock;

use crate::{
    InvoiceQuery, Result, StoreError, Write, WriteBatch,
    store::{Store, validate_batch},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: HashMap<CustomerId, Customer>,
    tables: HashMap<TableId, Table>,
    categories: HashMap<CategoryId, Category>,
    menu_items: HashMap<MenuItemId, MenuItem>,
    reservations: HashMap<ReservationId, Reservation>,
    orders: HashMap<OrderId, Order>,
    /// Append-only, in insertion order.
    invoices: Vec<Invoice>,
}

#[derive(Debug, Default)]
struct State {
    data: Tables,
    /// Index of a write in the next committed batch that should fail.
    fail_at_write: Option<usize>,
}

/// In-memory store implementation.
///
/// Enforces the same referential rules as the PostgreSQL schema. A commit
/// applies its batch to a copy of the data and swaps it in only when every
/// write succeeded, so a failed batch leaves nothing behind.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the write at `index` of the next committed batch fail, after the
    /// writes before it have been applied to the working copy.
    pub async fn fail_on_write(&self, index: usize) {
        self.state.write().await.fail_at_write = Some(index);
    }

    /// Returns the number of invoices stored.
    pub async fn invoice_count(&self) -> usize {
        self.state.read().await.data.invoices.len()
    }

    /// Returns the number of reservations stored.
    pub async fn reservation_count(&self) -> usize {
        self.state.read().await.data.reservations.len()
    }
}

impl Tables {
    fn apply(&mut self, write: Write) -> Result<()> {
        match write {
            Write::PutCustomer(customer) => {
                self.customers.insert(customer.id, customer);
            }
            Write::DeleteCustomer(id) => {
                if !self.customers.contains_key(&id) {
                    return Err(StoreError::not_found("Customer", id));
                }
                if self.reservations.values().any(|r| r.customer_id == id) {
                    return Err(StoreError::still_referenced("Customer", id, "reservations"));
                }
                if self.orders.values().any(|o| o.customer_id == Some(id)) {
                    return Err(StoreError::still_referenced("Customer", id, "orders"));
                }
                if self.invoices.iter().any(|i| i.customer_id == id) {
                    return Err(StoreError::still_referenced("Customer", id, "invoices"));
                }
                self.customers.remove(&id);
            }
            Write::PutTable(table) => {
                check_integer(table.capacity, "capacity")?;
                self.tables.insert(table.id, table);
            }
            Write::SetTableStatus { table_id, status } => {
                let table = self
                    .tables
                    .get_mut(&table_id)
                    .ok_or_else(|| StoreError::not_found("Table", table_id))?;
                table.status = status;
            }
            Write::DeleteTable(id) => {
                if !self.tables.contains_key(&id) {
                    return Err(StoreError::not_found("Table", id));
                }
                if self.orders.values().any(|o| o.table_id == id) {
                    return Err(StoreError::still_referenced("Table", id, "orders"));
                }
                for reservation in self.reservations.values_mut() {
                    if reservation.table_id == Some(id) {
                        reservation.table_id = None;
                    }
                }
                self.tables.remove(&id);
            }
            Write::PutCategory(category) => {
                self.categories.insert(category.id, category);
            }
            Write::DeleteCategory(id) => {
                if !self.categories.contains_key(&id) {
                    return Err(StoreError::not_found("Category", id));
                }
                if self.menu_items.values().any(|m| m.category_id == id) {
                    return Err(StoreError::still_referenced("Category", id, "menu items"));
                }
                self.categories.remove(&id);
            }
            Write::PutMenuItem(item) => {
                if !self.categories.contains_key(&item.category_id) {
                    return Err(StoreError::not_found("Category", item.category_id));
                }
                self.menu_items.insert(item.id, item);
            }
            Write::DeleteMenuItem(id) => {
                if !self.menu_items.contains_key(&id) {
                    return Err(StoreError::not_found("Menu item", id));
                }
                let invoiced = self
                    .invoices
                    .iter()
                    .flat_map(|i| &i.lines)
                    .any(|line| line.menu_item_id == Some(id));
                if invoiced {
                    return Err(StoreError::still_referenced("Menu item", id, "invoice lines"));
                }
                let ordered = self
                    .orders
                    .values()
                    .flat_map(|o| &o.lines)
                    .any(|line| line.menu_item_id == id);
                if ordered {
                    return Err(StoreError::still_referenced("Menu item", id, "order lines"));
                }
                self.menu_items.remove(&id);
            }
            Write::InsertReservation(reservation) => {
                check_integer(reservation.party_size, "party_size")?;
                if self.reservations.contains_key(&reservation.id) {
                    return Err(StoreError::Rejected(format!(
                        "Reservation {} already exists",
                        reservation.id
                    )));
                }
                if !self.customers.contains_key(&reservation.customer_id) {
                    return Err(StoreError::not_found("Customer", reservation.customer_id));
                }
                if let Some(table_id) = reservation.table_id
                    && !self.tables.contains_key(&table_id)
                {
                    return Err(StoreError::not_found("Table", table_id));
                }
                self.reservations.insert(reservation.id, reservation);
            }
            Write::DeleteReservation(id) => {
                if !self.reservations.contains_key(&id) {
                    return Err(StoreError::not_found("Reservation", id));
                }
                if self.invoices.iter().any(|i| i.reservation_id == id) {
                    return Err(StoreError::still_referenced("Reservation", id, "invoices"));
                }
                self.reservations.remove(&id);
            }
            Write::PutOrder(order) => {
                for line in &order.lines {
                    check_integer(line.quantity, "quantity")?;
                }
                if !self.tables.contains_key(&order.table_id) {
                    return Err(StoreError::not_found("Table", order.table_id));
                }
                if let Some(customer_id) = order.customer_id
                    && !self.customers.contains_key(&customer_id)
                {
                    return Err(StoreError::not_found("Customer", customer_id));
                }
                if let Some(line) = order
                    .lines
                    .iter()
                    .find(|line| !self.menu_items.contains_key(&line.menu_item_id))
                {
                    return Err(StoreError::not_found("Menu item", line.menu_item_id));
                }
                self.orders.insert(order.id, order);
            }
            Write::InsertInvoice(invoice) => {
                for line in &invoice.lines {
                    check_integer(line.quantity, "quantity")?;
                }
                if !self.reservations.contains_key(&invoice.reservation_id) {
                    return Err(StoreError::not_found("Reservation", invoice.reservation_id));
                }
                if !self.customers.contains_key(&invoice.customer_id) {
                    return Err(StoreError::not_found("Customer", invoice.customer_id));
                }
                if self
                    .invoices
                    .iter()
                    .any(|i| i.reservation_id == invoice.reservation_id)
                {
                    return Err(StoreError::AlreadyInvoiced(invoice.reservation_id));
                }
                if let Some(missing) = invoice
                    .lines
                    .iter()
                    .filter_map(|line| line.menu_item_id)
                    .find(|id| !self.menu_items.contains_key(id))
                {
                    return Err(StoreError::not_found("Menu item", missing));
                }
                self.invoices.push(invoice);
            }
        }
        Ok(())
    }
}

/// Refuses counts the Postgres `INTEGER` columns cannot hold.
fn check_integer(value: u32, field: &str) -> Result<()> {
    if i32::try_from(value).is_err() {
        return Err(StoreError::Rejected(format!("{field} too large: {value}")));
    }
    Ok(())
}

fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(key);
    rows
}

#[async_trait]
impl Store for InMemoryStore {
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.state.read().await.data.customers.get(&id).cloned())
    }

    async fn customers(&self, search: Option<&str>) -> Result<Vec<Customer>> {
        let state = self.state.read().await;
        let rows: Vec<Customer> = state
            .data
            .customers
            .values()
            .filter(|c| search.is_none_or(|term| c.matches(term)))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |c| (c.name.clone(), c.id)))
    }

    async fn table(&self, id: TableId) -> Result<Option<Table>> {
        Ok(self.state.read().await.data.tables.get(&id).cloned())
    }

    async fn tables(&self) -> Result<Vec<Table>> {
        let state = self.state.read().await;
        let rows: Vec<Table> = state.data.tables.values().cloned().collect();
        Ok(sorted_by(rows, |t| (t.name.clone(), t.id)))
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.data.categories.get(&id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let rows: Vec<Category> = state.data.categories.values().cloned().collect();
        Ok(sorted_by(rows, |c| (c.name.clone(), c.id)))
    }

    async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>> {
        Ok(self.state.read().await.data.menu_items.get(&id).cloned())
    }

    async fn menu_items(&self) -> Result<Vec<MenuItem>> {
        let state = self.state.read().await;
        let rows: Vec<MenuItem> = state.data.menu_items.values().cloned().collect();
        Ok(sorted_by(rows, |m| (m.name.clone(), m.id)))
    }

    async fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        Ok(self.state.read().await.data.reservations.get(&id).cloned())
    }

    async fn reservations(&self) -> Result<Vec<Reservation>> {
        let state = self.state.read().await;
        let rows: Vec<Reservation> = state.data.reservations.values().cloned().collect();
        Ok(sorted_by(rows, |r| {
            std::cmp::Reverse((r.scheduled_for, r.id))
        }))
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.data.orders.get(&id).cloned())
    }

    async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let rows: Vec<Order> = state
            .data
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |o| std::cmp::Reverse((o.opened_at, o.id))))
    }

    async fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>> {
        let state = self.state.read().await;
        Ok(state.data.invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn invoice_for_reservation(&self, id: ReservationId) -> Result<Option<Invoice>> {
        let state = self.state.read().await;
        Ok(state
            .data
            .invoices
            .iter()
            .find(|i| i.reservation_id == id)
            .cloned())
    }

    async fn invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>> {
        let state = self.state.read().await;
        let rows: Vec<Invoice> = state
            .data
            .invoices
            .iter()
            .filter(|i| query.matches(i))
            .cloned()
            .collect();
        let rows = sorted_by(rows, |i| std::cmp::Reverse((i.created_at, i.id)));

        // Apply offset and limit
        let rows = rows.into_iter().skip(query.offset.unwrap_or(0));
        Ok(match query.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        })
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        validate_batch(&batch)?;

        let mut state = self.state.write().await;
        let fail_at = state.fail_at_write.take();
        let mut working = state.data.clone();

        for (index, write) in batch.into_iter().enumerate() {
            if fail_at == Some(index) {
                metrics::counter!("store_commit_failures_total").increment(1);
                return Err(StoreError::Rejected(format!(
                    "Injected failure at write {index} ({})",
                    write.kind()
                )));
            }
            let kind = write.kind();
            if let Err(e) = working.apply(write) {
                tracing::debug!(index, kind, error = %e, "write batch rolled back");
                metrics::counter!("store_commit_failures_total").increment(1);
                return Err(e);
            }
        }

        state.data = working;
        metrics::counter!("store_commits_total").increment(1);
        Ok(())
    }
}
