//! Billing service: prices selections and writes invoices.

use chrono::{SubsecRound, Utc};
use common::model::{Invoice, InvoiceLine, Order, Reservation, ReservationTime, TableStatus};
use common::{CustomerId, InvoiceId, InvoiceLineId, Money, OrderId, ReservationId};
use store::{Store, StoreError, StoreExt, Write, WriteBatch};

use crate::error::{DomainError, Result};
use crate::orders::{OrderCommands, OrderError};

use super::{SaleTotals, Selection, ServiceKind, UNKNOWN_PRODUCT, parse_quantity};

/// Message returned when no selection survives quantity parsing.
pub const NO_ITEMS_MESSAGE: &str = "must select at least one product with valid quantity";

/// Service that turns selections into invoices.
///
/// Every sale is one [`WriteBatch`]: the invoice with its lines, plus any
/// reservation it synthesizes and the release of the table it frees. A
/// failure anywhere leaves no trace of the sale.
pub struct BillingService<S: Store> {
    store: S,
}

impl<S: Store> BillingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Bills an existing reservation and frees its table.
    #[tracing::instrument(skip(self, selections), fields(selections = selections.len()))]
    pub async fn process_sale(
        &self,
        reservation_id: ReservationId,
        selections: &[Selection],
        kind: ServiceKind,
    ) -> Result<Invoice> {
        let reservation = self
            .store
            .reservation(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))?;
        if self
            .store
            .invoice_for_reservation(reservation_id)
            .await?
            .is_some()
        {
            return Err(self.reject(
                "already_invoiced",
                DomainError::from(StoreError::AlreadyInvoiced(reservation_id)),
            ));
        }

        let invoice = self.build_invoice(&reservation, selections, kind).await?;

        let mut batch = WriteBatch::new().with(Write::InsertInvoice(invoice.clone()));
        if let Some(table_id) = reservation.table_id {
            batch.push(Write::SetTableStatus {
                table_id,
                status: TableStatus::Available,
            });
        }
        self.commit_sale(batch, &invoice, kind).await?;
        Ok(invoice)
    }

    /// Bills a walk-in customer as takeout.
    ///
    /// A tableless, zero-party reservation stamped with the current minute is
    /// created alongside the invoice.
    #[tracing::instrument(skip(self, selections), fields(selections = selections.len()))]
    pub async fn direct_sale(
        &self,
        customer_id: CustomerId,
        selections: &[Selection],
    ) -> Result<Invoice> {
        if !self.store.customer_exists(customer_id).await? {
            return Err(self.reject(
                "validation",
                DomainError::validation(format!("Customer {customer_id} does not exist")),
            ));
        }

        let reservation = Reservation::walk_in(customer_id);
        let kind = ServiceKind::Takeout;
        let invoice = self.build_invoice(&reservation, selections, kind).await?;

        let batch = WriteBatch::new()
            .with(Write::InsertReservation(reservation))
            .with(Write::InsertInvoice(invoice.clone()));
        self.commit_sale(batch, &invoice, kind).await?;
        Ok(invoice)
    }

    /// Bills an order as a dine-in sale.
    ///
    /// The order's lines become the selections, a reservation for the
    /// order's customer at the order's table is synthesized, and the order
    /// moves to Paid and its table to Available in the same commit.
    #[tracing::instrument(skip(self))]
    pub async fn checkout_order(&self, order_id: OrderId) -> Result<Invoice> {
        let mut order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", order_id))?;
        if !order.status.can_checkout() {
            return Err(OrderError::InvalidStateTransition {
                current_state: order.status,
                action: "check out",
            }
            .into());
        }
        let Some(customer_id) = order.customer_id else {
            return Err(self.reject(
                "validation",
                DomainError::validation("Order has no customer to bill"),
            ));
        };
        if order.lines.is_empty() {
            return Err(self.reject("no_items", DomainError::validation(NO_ITEMS_MESSAGE)));
        }

        let table_id = order.table_id;
        let reservation = Reservation::new(ReservationTime::now(), 0, customer_id, Some(table_id));
        let kind = ServiceKind::DineIn;
        let invoice = self
            .build_invoice(&reservation, &selections_for(&order), kind)
            .await?;
        order.mark_paid()?;

        let batch = WriteBatch::new()
            .with(Write::InsertReservation(reservation))
            .with(Write::InsertInvoice(invoice.clone()))
            .with(Write::PutOrder(order))
            .with(Write::SetTableStatus {
                table_id,
                status: TableStatus::Available,
            });
        self.commit_sale(batch, &invoice, kind).await?;
        Ok(invoice)
    }

    /// Prices `selections` for `reservation`, snapshotting each menu item's
    /// current name and price into the invoice lines.
    async fn build_invoice(
        &self,
        reservation: &Reservation,
        selections: &[Selection],
        kind: ServiceKind,
    ) -> Result<Invoice> {
        let invoice_id = InvoiceId::new();
        let mut lines = Vec::with_capacity(selections.len());
        let mut subtotal = Money::zero();

        for selection in selections {
            let quantity = parse_quantity(&selection.quantity);
            if quantity == 0 {
                continue;
            }

            let item = self.store.menu_item(selection.menu_item_id).await?;
            let (menu_item_id, unit_price, description) = match item {
                Some(item) => (Some(item.id), item.price, item.name),
                None => (None, Money::zero(), UNKNOWN_PRODUCT.to_string()),
            };
            let line_total = unit_price
                .checked_multiply(quantity)
                .ok_or_else(|| self.reject("too_large", too_large()))?;
            subtotal = subtotal
                .checked_add(line_total)
                .ok_or_else(|| self.reject("too_large", too_large()))?;

            lines.push(InvoiceLine {
                id: InvoiceLineId::new(),
                invoice_id,
                menu_item_id,
                quantity,
                unit_price,
                description,
                line_total,
            });
        }

        if lines.is_empty() {
            return Err(self.reject("no_items", DomainError::validation(NO_ITEMS_MESSAGE)));
        }

        let totals = SaleTotals::compute(subtotal, kind)
            .ok_or_else(|| self.reject("too_large", too_large()))?;
        Ok(Invoice {
            id: invoice_id,
            reservation_id: reservation.id,
            customer_id: reservation.customer_id,
            // microseconds: the precision Postgres keeps
            created_at: Utc::now().trunc_subsecs(6),
            subtotal: totals.subtotal,
            tax: totals.tax,
            service_charge: totals.service_charge,
            total: totals.total,
            lines,
        })
    }

    async fn commit_sale(
        &self,
        batch: WriteBatch,
        invoice: &Invoice,
        kind: ServiceKind,
    ) -> Result<()> {
        if let Err(e) = self.store.commit(batch).await {
            let reason = match e {
                StoreError::AlreadyInvoiced(_) => "already_invoiced",
                _ => "persistence",
            };
            tracing::warn!(invoice_id = %invoice.id, error = %e, "sale rolled back");
            return Err(self.reject(reason, e.into()));
        }

        metrics::counter!("sales_processed_total", "service" => kind.as_str()).increment(1);
        metrics::histogram!("invoice_total_cents").record(invoice.total.cents() as f64);
        tracing::info!(
            invoice_id = %invoice.id,
            reservation_id = %invoice.reservation_id,
            total = %invoice.total,
            service = kind.as_str(),
            "sale processed"
        );
        Ok(())
    }

    fn reject(&self, reason: &'static str, error: DomainError) -> DomainError {
        metrics::counter!("sales_rejected_total", "reason" => reason).increment(1);
        error
    }
}

fn too_large() -> DomainError {
    DomainError::validation("Sale amount is too large")
}

fn selections_for(order: &Order) -> Vec<Selection> {
    order
        .lines
        .iter()
        .map(|line| Selection::new(line.menu_item_id, line.quantity.to_string()))
        .collect()
}
