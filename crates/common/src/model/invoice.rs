//! Invoices: immutable records of completed sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomerId, InvoiceId, InvoiceLineId, MenuItemId, Money, ReservationId};

/// One billed line.
///
/// `unit_price` and `description` are copies taken at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: InvoiceLineId,
    pub invoice_id: InvoiceId,
    /// `None` when the selected item could not be resolved at sale time.
    pub menu_item_id: Option<MenuItemId>,
    pub quantity: u32,
    pub unit_price: Money,
    pub description: String,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub reservation_id: ReservationId,
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
    pub subtotal: Money,
    /// ITBIS, 18% of the subtotal.
    pub tax: Money,
    /// 10% of the subtotal on dine-in sales, zero otherwise.
    pub service_charge: Money,
    pub total: Money,
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// Sum of the line totals.
    pub fn lines_subtotal(&self) -> Money {
        self.lines.iter().map(|line| line.line_total).sum()
    }

    /// Returns true if the line totals and the derived amounts agree.
    pub fn is_balanced(&self) -> bool {
        self.subtotal == self.lines_subtotal()
            && self.total == self.subtotal + self.tax + self.service_charge
    }
}
