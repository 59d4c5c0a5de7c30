//! Order service providing the API for open tabs.

use common::model::{Order, OrderStatus};
use common::{CustomerId, MenuItemId, Money, OrderId, OrderLineId, TableId};
use store::{Store, StoreExt, Write};

use crate::error::{DomainError, Result};

use super::{OrderCommands, OrderError};

/// Service for managing orders.
///
/// Loads the order, runs a state-checked command against it and stores the
/// result as a single write.
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Opens a tab at a table, optionally for a known customer.
    #[tracing::instrument(skip(self))]
    pub async fn open_order(
        &self,
        table_id: TableId,
        customer_id: Option<CustomerId>,
    ) -> Result<Order> {
        if !self.store.table_exists(table_id).await? {
            return Err(DomainError::validation(format!(
                "Table {table_id} does not exist"
            )));
        }
        if let Some(customer_id) = customer_id
            && !self.store.customer_exists(customer_id).await?
        {
            return Err(DomainError::validation(format!(
                "Customer {customer_id} does not exist"
            )));
        }

        let order = Order::open(table_id, customer_id);
        self.store.commit_one(Write::PutOrder(order.clone())).await?;

        metrics::counter!("orders_opened_total").increment(1);
        tracing::info!(order_id = %order.id, table_id = %table_id, "order opened");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_line(
        &self,
        order_id: OrderId,
        menu_item_id: MenuItemId,
        quantity: u32,
        note: Option<String>,
    ) -> Result<(Order, OrderLineId)> {
        if self.store.menu_item(menu_item_id).await?.is_none() {
            return Err(DomainError::validation(format!(
                "Menu item {menu_item_id} does not exist"
            )));
        }
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        self.execute(order_id, |order| order.add_line(menu_item_id, quantity, note))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_line_quantity(
        &self,
        order_id: OrderId,
        line_id: OrderLineId,
        quantity: u32,
    ) -> Result<Order> {
        let (order, ()) = self
            .execute(order_id, |order| order.update_line_quantity(line_id, quantity))
            .await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_line(&self, order_id: OrderId, line_id: OrderLineId) -> Result<Order> {
        let (order, ()) = self
            .execute(order_id, |order| order.remove_line(line_id))
            .await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn send_to_kitchen(&self, order_id: OrderId) -> Result<Order> {
        let (order, ()) = self
            .execute(order_id, |order| order.send_to_kitchen())
            .await?;
        tracing::info!(order_id = %order_id, lines = order.lines.len(), "order sent to kitchen");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_served(&self, order_id: OrderId) -> Result<Order> {
        let (order, ()) = self.execute(order_id, |order| order.mark_served()).await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let (order, ()) = self.execute(order_id, |order| order.cancel()).await?;
        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(order_id = %order_id, "order cancelled");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .order(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", order_id))
    }

    /// Orders, most recently opened first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        Ok(self.store.orders(status).await?)
    }

    /// Prices the order at the menu's *current* prices.
    ///
    /// Unlike an invoice, this follows catalog changes. Lines whose menu item
    /// no longer exists count as zero.
    #[tracing::instrument(skip(self))]
    pub async fn order_total(&self, order_id: OrderId) -> Result<Money> {
        let order = self.get_order(order_id).await?;

        let mut total = Money::zero();
        for line in &order.lines {
            if let Some(item) = self.store.menu_item(line.menu_item_id).await? {
                total = item
                    .price
                    .checked_multiply(line.quantity)
                    .and_then(|line_total| total.checked_add(line_total))
                    .ok_or_else(|| DomainError::validation("Order total is too large"))?;
            }
        }
        Ok(total)
    }

    /// Loads an order, applies `command` and stores the result.
    async fn execute<T>(
        &self,
        order_id: OrderId,
        command: impl FnOnce(&mut Order) -> std::result::Result<T, OrderError> + Send,
    ) -> Result<(Order, T)> {
        let mut order = self.get_order(order_id).await?;
        let output = command(&mut order)?;
        self.store.commit_one(Write::PutOrder(order.clone())).await?;
        Ok((order, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::floor::FloorService;
    use common::model::MenuItem;
    use store::InMemoryStore;

    struct Fixture {
        orders: OrderService<InMemoryStore>,
        catalog: CatalogService<InMemoryStore>,
        table_id: TableId,
        pasta: MenuItem,
    }

    async fn setup() -> Fixture {
        let store = InMemoryStore::new();
        let catalog = CatalogService::new(store.clone());
        let category = catalog.create_category("Pastas").await.unwrap();
        let pasta = catalog
            .create_menu_item("Pasta", Money::from_units(10), category.id)
            .await
            .unwrap();
        let table = FloorService::new(store.clone())
            .create_table("T1", 4)
            .await
            .unwrap();
        Fixture {
            orders: OrderService::new(store),
            catalog,
            table_id: table.id,
            pasta,
        }
    }

    #[tokio::test]
    async fn open_order_validates_references() {
        let fx = setup().await;

        let result = fx.orders.open_order(TableId::new(), None).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = fx
            .orders
            .open_order(fx.table_id, Some(CustomerId::new()))
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        assert!(fx.orders.list_orders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lines_are_persisted() {
        let fx = setup().await;
        let order = fx.orders.open_order(fx.table_id, None).await.unwrap();

        let (_, line_id) = fx
            .orders
            .add_line(order.id, fx.pasta.id, 2, Some("  al dente ".to_string()))
            .await
            .unwrap();
        fx.orders
            .update_line_quantity(order.id, line_id, 3)
            .await
            .unwrap();

        let stored = fx.orders.get_order(order.id).await.unwrap();
        let line = stored.line(line_id).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.note.as_deref(), Some("al dente"));
    }

    #[tokio::test]
    async fn unknown_menu_item_is_rejected() {
        let fx = setup().await;
        let order = fx.orders.open_order(fx.table_id, None).await.unwrap();

        let result = fx.orders.add_line(order.id, MenuItemId::new(), 1, None).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn rejected_transition_is_not_persisted() {
        let fx = setup().await;
        let order = fx.orders.open_order(fx.table_id, None).await.unwrap();

        let result = fx.orders.mark_served(order.id).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidStateTransition { .. }))
        ));

        let result = fx.orders.send_to_kitchen(order.id).await;
        assert!(matches!(result, Err(DomainError::Order(OrderError::NoLines))));

        let stored = fx.orders.get_order(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Open);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let fx = setup().await;
        let first = fx.orders.open_order(fx.table_id, None).await.unwrap();
        let second = fx.orders.open_order(fx.table_id, None).await.unwrap();
        fx.orders.cancel_order(first.id).await.unwrap();

        let open = fx.orders.list_orders(Some(OrderStatus::Open)).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, second.id);
        assert_eq!(fx.orders.list_orders(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn live_total_follows_current_prices() {
        let fx = setup().await;
        let order = fx.orders.open_order(fx.table_id, None).await.unwrap();
        fx.orders
            .add_line(order.id, fx.pasta.id, 2, None)
            .await
            .unwrap();
        assert_eq!(
            fx.orders.order_total(order.id).await.unwrap(),
            Money::from_units(20)
        );

        fx.catalog
            .update_menu_item(fx.pasta.id, "Pasta", Money::from_units(15), fx.pasta.category_id)
            .await
            .unwrap();

        assert_eq!(
            fx.orders.order_total(order.id).await.unwrap(),
            Money::from_units(30)
        );
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let fx = setup().await;
        assert!(matches!(
            fx.orders.order_total(OrderId::new()).await,
            Err(DomainError::NotFound { entity: "Order", .. })
        ));
    }
}
