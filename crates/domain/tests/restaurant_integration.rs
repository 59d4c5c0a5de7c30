//! Integration tests for the order-to-invoice pipeline.
//!
//! These tests drive the services together against the in-memory store and
//! check the totals, table occupancy and atomicity rules end to end.

use common::model::{Category, Customer, MenuItem, OrderStatus, Table, TableStatus};
use common::{Money, ReservationId};
use domain::{
    BillingService, CatalogService, CustomerDetails, CustomerService, DomainError, FloorService,
    LedgerService, OrderError, OrderService, Selection, ServiceKind,
};
use store::{InMemoryStore, InvoiceQuery, Store};

/// All services over one shared store.
struct Restaurant {
    store: InMemoryStore,
    customers: CustomerService<InMemoryStore>,
    floor: FloorService<InMemoryStore>,
    catalog: CatalogService<InMemoryStore>,
    orders: OrderService<InMemoryStore>,
    billing: BillingService<InMemoryStore>,
    ledger: LedgerService<InMemoryStore>,
}

impl Restaurant {
    fn new() -> Self {
        let store = InMemoryStore::new();
        Self {
            customers: CustomerService::new(store.clone()),
            floor: FloorService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            billing: BillingService::new(store.clone()),
            ledger: LedgerService::new(store.clone()),
            store,
        }
    }
}

struct Fixture {
    r: Restaurant,
    customer: Customer,
    table: Table,
    category: Category,
    pasta: MenuItem,
}

async fn fixture() -> Fixture {
    let r = Restaurant::new();
    let customer = r
        .customers
        .create_customer(CustomerDetails::new("Ana").phone("809-555-0101"))
        .await
        .unwrap();
    let table = r.floor.create_table("Mesa 1", 4).await.unwrap();
    let category = r.catalog.create_category("Pastas").await.unwrap();
    let pasta = r
        .catalog
        .create_menu_item("Pasta", Money::from_units(10), category.id)
        .await
        .unwrap();
    Fixture {
        r,
        customer,
        table,
        category,
        pasta,
    }
}

impl Fixture {
    async fn seat(&self) -> ReservationId {
        self.r
            .floor
            .create_reservation("2026-05-01 20:00", 2, self.customer.id, self.table.id)
            .await
            .unwrap()
            .id
    }

    async fn table_status(&self) -> TableStatus {
        self.r.floor.get_table(self.table.id).await.unwrap().status
    }
}

mod billing {
    use super::*;

    #[tokio::test]
    async fn pasta_dine_in_sale() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;
        assert_eq!(fx.table_status().await, TableStatus::Occupied);

        let invoice = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[Selection::new(fx.pasta.id, "2")],
                ServiceKind::DineIn,
            )
            .await
            .unwrap();

        assert_eq!(invoice.subtotal, Money::from_cents(2000));
        assert_eq!(invoice.tax, Money::from_cents(360));
        assert_eq!(invoice.service_charge, Money::from_cents(200));
        assert_eq!(invoice.total, Money::from_cents(2560));
        assert_eq!(invoice.customer_id, fx.customer.id);
        assert!(invoice.is_balanced());
        assert_eq!(fx.table_status().await, TableStatus::Available);
    }

    #[tokio::test]
    async fn repricing_does_not_touch_past_invoices() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;
        let invoice = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[Selection::new(fx.pasta.id, "2")],
                ServiceKind::DineIn,
            )
            .await
            .unwrap();

        fx.r.catalog
            .update_menu_item(fx.pasta.id, "Pasta", Money::from_units(15), fx.category.id)
            .await
            .unwrap();

        let stored = fx.r.ledger.get_invoice(invoice.id).await.unwrap();
        assert_eq!(stored.lines[0].unit_price, Money::from_units(10));
        assert_eq!(stored.lines[0].line_total, Money::from_units(20));
        assert_eq!(stored.lines[0].description, "Pasta");
        assert_eq!(stored.total, Money::from_cents(2560));
    }

    #[tokio::test]
    async fn takeout_totals() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;

        let invoice = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[Selection::new(fx.pasta.id, "3")],
                ServiceKind::Takeout,
            )
            .await
            .unwrap();

        assert_eq!(invoice.subtotal, Money::from_units(30));
        assert_eq!(invoice.tax, Money::from_cents(540));
        assert_eq!(invoice.service_charge, Money::zero());
        assert_eq!(invoice.total, Money::from_cents(3540));
    }

    #[tokio::test]
    async fn invalid_selection_has_no_side_effects() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;

        let result = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[
                    Selection::new(fx.pasta.id, ""),
                    Selection::new(fx.pasta.id, "2.5"),
                ],
                ServiceKind::DineIn,
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(fx.r.store.invoice_count().await, 0);
        assert_eq!(fx.table_status().await, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn oversized_sale_is_rejected_without_side_effects() {
        let fx = fixture().await;
        let caviar = fx
            .r
            .catalog
            .create_menu_item("Caviar", Money::from_cents(i64::MAX / 10 * 9), fx.category.id)
            .await
            .unwrap();
        let reservation_id = fx.seat().await;

        let result = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[Selection::new(caviar.id, "1")],
                ServiceKind::DineIn,
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(fx.r.store.invoice_count().await, 0);
        assert_eq!(fx.table_status().await, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn quantity_beyond_storable_range_counts_as_zero() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;

        let invoice = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[
                    Selection::new(fx.pasta.id, "2147483648"),
                    Selection::new(fx.pasta.id, "1"),
                ],
                ServiceKind::DineIn,
            )
            .await
            .unwrap();

        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn injected_failure_rolls_back_sale() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;
        // second write of the sale batch is the table release
        fx.r.store.fail_on_write(1).await;

        let result = fx
            .r
            .billing
            .process_sale(
                reservation_id,
                &[Selection::new(fx.pasta.id, "1")],
                ServiceKind::DineIn,
            )
            .await;

        assert!(matches!(result, Err(DomainError::Persistence(_))));
        assert_eq!(fx.r.store.invoice_count().await, 0);
        assert_eq!(fx.r.store.reservation_count().await, 1);
        assert_eq!(fx.table_status().await, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn reservation_cannot_be_invoiced_twice() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;
        let selections = [Selection::new(fx.pasta.id, "1")];
        fx.r.billing
            .process_sale(reservation_id, &selections, ServiceKind::DineIn)
            .await
            .unwrap();

        let result = fx
            .r
            .billing
            .process_sale(reservation_id, &selections, ServiceKind::DineIn)
            .await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(fx.r.store.invoice_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_reservation_is_not_found() {
        let fx = fixture().await;
        let result = fx
            .r
            .billing
            .process_sale(
                ReservationId::new(),
                &[Selection::new(fx.pasta.id, "1")],
                ServiceKind::DineIn,
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "Reservation", .. })
        ));
    }

    #[tokio::test]
    async fn invoiced_reservation_cannot_be_cancelled() {
        let fx = fixture().await;
        let reservation_id = fx.seat().await;
        fx.r.billing
            .process_sale(
                reservation_id,
                &[Selection::new(fx.pasta.id, "1")],
                ServiceKind::DineIn,
            )
            .await
            .unwrap();

        let result = fx.r.floor.cancel_reservation(reservation_id).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert!(fx.r.floor.get_reservation(reservation_id).await.is_ok());
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn sold_menu_item_cannot_be_deleted() {
        let fx = fixture().await;
        fx.r.billing
            .direct_sale(fx.customer.id, &[Selection::new(fx.pasta.id, "1")])
            .await
            .unwrap();

        let result = fx.r.catalog.delete_menu_item(fx.pasta.id).await;

        match result {
            Err(DomainError::Conflict(message)) => {
                assert_eq!(message, "cannot delete: has sales history")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(fx.r.catalog.get_menu_item(fx.pasta.id).await.is_ok());
    }

    #[tokio::test]
    async fn ordered_menu_item_cannot_be_deleted() {
        let fx = fixture().await;
        let order = fx.r.orders.open_order(fx.table.id, None).await.unwrap();
        fx.r.orders
            .add_line(order.id, fx.pasta.id, 1, None)
            .await
            .unwrap();

        let result = fx.r.catalog.delete_menu_item(fx.pasta.id).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }
}

mod customers {
    use super::*;

    #[tokio::test]
    async fn invoiced_customer_cannot_be_deleted() {
        let fx = fixture().await;
        fx.r.billing
            .direct_sale(fx.customer.id, &[Selection::new(fx.pasta.id, "1")])
            .await
            .unwrap();

        let result = fx.r.customers.delete_customer(fx.customer.id).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert!(fx.r.customers.get_customer(fx.customer.id).await.is_ok());
    }
}

mod order_lifecycle {
    use super::*;

    #[tokio::test]
    async fn checkout_bills_order_and_frees_table() {
        let fx = fixture().await;
        let order = fx
            .r
            .orders
            .open_order(fx.table.id, Some(fx.customer.id))
            .await
            .unwrap();
        fx.r.orders
            .add_line(order.id, fx.pasta.id, 2, None)
            .await
            .unwrap();
        fx.r.orders.send_to_kitchen(order.id).await.unwrap();
        fx.r.orders.mark_served(order.id).await.unwrap();
        fx.r.floor
            .update_table(fx.table.id, "Mesa 1", 4, TableStatus::Occupied)
            .await
            .unwrap();

        let invoice = fx.r.billing.checkout_order(order.id).await.unwrap();

        assert_eq!(invoice.total, Money::from_cents(2560));
        let order = fx.r.orders.get_order(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(fx.table_status().await, TableStatus::Available);

        let reservation = fx
            .r
            .floor
            .get_reservation(invoice.reservation_id)
            .await
            .unwrap();
        assert_eq!(reservation.table_id, Some(fx.table.id));
        assert_eq!(
            fx.r.ledger
                .invoice_for_reservation(reservation.id)
                .await
                .unwrap(),
            Some(invoice)
        );
    }

    #[tokio::test]
    async fn paid_order_cannot_be_checked_out_again() {
        let fx = fixture().await;
        let order = fx
            .r
            .orders
            .open_order(fx.table.id, Some(fx.customer.id))
            .await
            .unwrap();
        fx.r.orders
            .add_line(order.id, fx.pasta.id, 1, None)
            .await
            .unwrap();
        fx.r.billing.checkout_order(order.id).await.unwrap();

        let result = fx.r.billing.checkout_order(order.id).await;

        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidStateTransition { .. }))
        ));
        assert_eq!(fx.r.store.invoice_count().await, 1);
    }

    #[tokio::test]
    async fn checkout_requires_customer_and_lines() {
        let fx = fixture().await;
        let anonymous = fx.r.orders.open_order(fx.table.id, None).await.unwrap();
        fx.r.orders
            .add_line(anonymous.id, fx.pasta.id, 1, None)
            .await
            .unwrap();
        assert!(matches!(
            fx.r.billing.checkout_order(anonymous.id).await,
            Err(DomainError::Validation(_))
        ));

        let empty = fx
            .r
            .orders
            .open_order(fx.table.id, Some(fx.customer.id))
            .await
            .unwrap();
        assert!(matches!(
            fx.r.billing.checkout_order(empty.id).await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(fx.r.store.invoice_count().await, 0);
    }

    #[tokio::test]
    async fn failed_checkout_leaves_order_open() {
        let fx = fixture().await;
        let order = fx
            .r
            .orders
            .open_order(fx.table.id, Some(fx.customer.id))
            .await
            .unwrap();
        fx.r.orders
            .add_line(order.id, fx.pasta.id, 1, None)
            .await
            .unwrap();
        fx.r.store.fail_on_write(2).await;

        let result = fx.r.billing.checkout_order(order.id).await;

        assert!(matches!(result, Err(DomainError::Persistence(_))));
        let order = fx.r.orders.get_order(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(fx.r.store.invoice_count().await, 0);
        assert_eq!(fx.r.store.reservation_count().await, 0);
    }

    #[tokio::test]
    async fn live_total_moves_with_price_but_invoice_does_not() {
        let fx = fixture().await;
        let order = fx
            .r
            .orders
            .open_order(fx.table.id, Some(fx.customer.id))
            .await
            .unwrap();
        fx.r.orders
            .add_line(order.id, fx.pasta.id, 2, None)
            .await
            .unwrap();
        let invoice = fx.r.billing.checkout_order(order.id).await.unwrap();

        fx.r.catalog
            .update_menu_item(fx.pasta.id, "Pasta", Money::from_units(15), fx.category.id)
            .await
            .unwrap();

        assert_eq!(
            fx.r.orders.order_total(order.id).await.unwrap(),
            Money::from_units(30)
        );
        let stored = fx.r.ledger.get_invoice(invoice.id).await.unwrap();
        assert_eq!(stored.subtotal, Money::from_units(20));
    }

    #[tokio::test]
    async fn live_total_overflow_is_a_validation_error() {
        let fx = fixture().await;
        let caviar = fx
            .r
            .catalog
            .create_menu_item("Caviar", Money::from_cents(i64::MAX / 10 * 9), fx.category.id)
            .await
            .unwrap();
        let order = fx.r.orders.open_order(fx.table.id, None).await.unwrap();
        fx.r.orders
            .add_line(order.id, caviar.id, 2, None)
            .await
            .unwrap();

        let result = fx.r.orders.order_total(order.id).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn invoices_listed_newest_first_and_filtered() {
        let fx = fixture().await;
        let other = fx
            .r
            .customers
            .create_customer(CustomerDetails::new("Luis"))
            .await
            .unwrap();
        let selections = [Selection::new(fx.pasta.id, "1")];
        let first = fx
            .r
            .billing
            .direct_sale(fx.customer.id, &selections)
            .await
            .unwrap();
        let second = fx
            .r
            .billing
            .direct_sale(other.id, &selections)
            .await
            .unwrap();

        let all = fx.r.ledger.list_invoices().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);

        let ana = fx
            .r
            .ledger
            .query_invoices(&InvoiceQuery::for_customer(fx.customer.id))
            .await
            .unwrap();
        assert_eq!(ana, vec![first.clone()]);

        let window = fx
            .r
            .ledger
            .query_invoices(&InvoiceQuery::between(first.created_at, second.created_at))
            .await
            .unwrap();
        assert_eq!(window.len(), 2);

        let reservations = fx.r.store.reservations().await.unwrap();
        assert_eq!(reservations.len(), 2);
    }
}
