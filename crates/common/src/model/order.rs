//! Open tabs and their state machine.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomerId, MenuItemId, OrderId, OrderLineId, TableId};

use super::UnknownVariant;

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Open ──► InKitchen ──► Served ──► Paid
///   │          │            │
///   └──────────┴────────────┴──► Cancelled
/// ```
/// Checkout may also move Open or InKitchen straight to Paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Tab is open, lines can be added and removed.
    #[default]
    Open,

    /// Sent to the kitchen; lines can still be added.
    InKitchen,

    /// Food is on the table.
    Served,

    /// Billed (terminal state).
    Paid,

    /// Abandoned (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if lines can be added, changed or removed in this state.
    pub fn can_modify_lines(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::InKitchen)
    }

    pub fn can_send_to_kitchen(&self) -> bool {
        matches!(self, OrderStatus::Open)
    }

    pub fn can_serve(&self) -> bool {
        matches!(self, OrderStatus::InKitchen)
    }

    /// Returns true if the order can be billed in this state.
    pub fn can_checkout(&self) -> bool {
        !self.is_terminal()
    }

    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "Open",
            OrderStatus::InKitchen => "InKitchen",
            OrderStatus::Served => "Served",
            OrderStatus::Paid => "Paid",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(OrderStatus::Open),
            "InKitchen" => Ok(OrderStatus::InKitchen),
            "Served" => Ok(OrderStatus::Served),
            "Paid" => Ok(OrderStatus::Paid),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownVariant::new("order status", other)),
        }
    }
}

/// Largest line quantity that can be stored (an SQL `INTEGER`).
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// A line on an open tab.
///
/// Carries no price: its value is always derived from the menu item's
/// current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub note: Option<String>,
}

/// An open tab at a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub table_id: TableId,
    pub customer_id: Option<CustomerId>,
    pub opened_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn open(table_id: TableId, customer_id: Option<CustomerId>) -> Self {
        Self {
            id: OrderId::new(),
            table_id,
            customer_id,
            // microseconds: the precision Postgres keeps
            opened_at: Utc::now().trunc_subsecs(6),
            status: OrderStatus::Open,
            lines: Vec::new(),
        }
    }

    pub fn line(&self, line_id: OrderLineId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn line_mut(&mut self, line_id: OrderLineId) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|line| line.id == line_id)
    }

    /// Appends a line and returns its id.
    pub fn push_line(
        &mut self,
        menu_item_id: MenuItemId,
        quantity: u32,
        note: Option<String>,
    ) -> OrderLineId {
        let id = OrderLineId::new();
        self.lines.push(OrderLine {
            id,
            order_id: self.id,
            menu_item_id,
            quantity,
            note,
        });
        id
    }

    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
