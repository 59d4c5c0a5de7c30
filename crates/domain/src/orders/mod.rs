//! Open tabs: line edits and the kitchen/serve/pay state machine.

mod service;

pub use service::OrderService;

use common::model::{MAX_QUANTITY, Order, OrderStatus};
use common::{MenuItemId, OrderLineId};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order is not in the expected state.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: OrderStatus,
        action: &'static str,
    },

    /// Line not found on the order.
    #[error("Order line not found: {line_id}")]
    LineNotFound { line_id: OrderLineId },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be between 1 and {max})", max = MAX_QUANTITY)]
    InvalidQuantity { quantity: u32 },

    /// Order has no lines.
    #[error("Order has no lines")]
    NoLines,
}

impl OrderError {
    /// Returns true if the error is about the order's state rather than the
    /// request.
    pub fn is_conflict(&self) -> bool {
        matches!(self, OrderError::InvalidStateTransition { .. })
    }
}

/// State-checked commands on an [`Order`].
///
/// Each command validates against the current status and mutates the order
/// in place only when allowed; callers persist the result.
pub trait OrderCommands {
    fn add_line(
        &mut self,
        menu_item_id: MenuItemId,
        quantity: u32,
        note: Option<String>,
    ) -> Result<OrderLineId, OrderError>;

    fn update_line_quantity(&mut self, line_id: OrderLineId, quantity: u32)
    -> Result<(), OrderError>;

    fn remove_line(&mut self, line_id: OrderLineId) -> Result<(), OrderError>;

    fn send_to_kitchen(&mut self) -> Result<(), OrderError>;

    fn mark_served(&mut self) -> Result<(), OrderError>;

    fn cancel(&mut self) -> Result<(), OrderError>;

    fn mark_paid(&mut self) -> Result<(), OrderError>;
}

fn guard(order: &Order, allowed: bool, action: &'static str) -> Result<(), OrderError> {
    if allowed {
        Ok(())
    } else {
        Err(OrderError::InvalidStateTransition {
            current_state: order.status,
            action,
        })
    }
}

fn validate_quantity(quantity: u32) -> Result<(), OrderError> {
    if quantity == 0 || quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidQuantity { quantity });
    }
    Ok(())
}

impl OrderCommands for Order {
    fn add_line(
        &mut self,
        menu_item_id: MenuItemId,
        quantity: u32,
        note: Option<String>,
    ) -> Result<OrderLineId, OrderError> {
        guard(self, self.status.can_modify_lines(), "add line")?;
        validate_quantity(quantity)?;
        Ok(self.push_line(menu_item_id, quantity, note))
    }

    fn update_line_quantity(
        &mut self,
        line_id: OrderLineId,
        quantity: u32,
    ) -> Result<(), OrderError> {
        guard(self, self.status.can_modify_lines(), "update line")?;
        validate_quantity(quantity)?;
        let line = self
            .line_mut(line_id)
            .ok_or(OrderError::LineNotFound { line_id })?;
        line.quantity = quantity;
        Ok(())
    }

    fn remove_line(&mut self, line_id: OrderLineId) -> Result<(), OrderError> {
        guard(self, self.status.can_modify_lines(), "remove line")?;
        if self.line(line_id).is_none() {
            return Err(OrderError::LineNotFound { line_id });
        }
        self.lines.retain(|line| line.id != line_id);
        Ok(())
    }

    fn send_to_kitchen(&mut self) -> Result<(), OrderError> {
        guard(self, self.status.can_send_to_kitchen(), "send to kitchen")?;
        if self.lines.is_empty() {
            return Err(OrderError::NoLines);
        }
        self.status = OrderStatus::InKitchen;
        Ok(())
    }

    fn mark_served(&mut self) -> Result<(), OrderError> {
        guard(self, self.status.can_serve(), "serve")?;
        self.status = OrderStatus::Served;
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), OrderError> {
        guard(self, self.status.can_cancel(), "cancel")?;
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    fn mark_paid(&mut self) -> Result<(), OrderError> {
        guard(self, self.status.can_checkout(), "check out")?;
        if self.lines.is_empty() {
            return Err(OrderError::NoLines);
        }
        self.status = OrderStatus::Paid;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TableId;

    fn order_with_line() -> (Order, OrderLineId) {
        let mut order = Order::open(TableId::new(), None);
        let line_id = order.add_line(MenuItemId::new(), 2, None).unwrap();
        (order, line_id)
    }

    #[test]
    fn full_lifecycle() {
        let (mut order, _) = order_with_line();

        order.send_to_kitchen().unwrap();
        assert_eq!(order.status, OrderStatus::InKitchen);

        order.mark_served().unwrap();
        assert_eq!(order.status, OrderStatus::Served);

        order.mark_paid().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let (mut order, line_id) = order_with_line();
        assert!(matches!(
            order.add_line(MenuItemId::new(), 0, None),
            Err(OrderError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            order.update_line_quantity(line_id, 0),
            Err(OrderError::InvalidQuantity { .. })
        ));
        assert_eq!(order.total_quantity(), 2);
    }

    #[test]
    fn quantity_above_storable_maximum_is_rejected() {
        let (mut order, line_id) = order_with_line();
        let too_many = MAX_QUANTITY + 1;
        assert!(matches!(
            order.add_line(MenuItemId::new(), too_many, None),
            Err(OrderError::InvalidQuantity { quantity }) if quantity == too_many
        ));
        assert!(matches!(
            order.update_line_quantity(line_id, too_many),
            Err(OrderError::InvalidQuantity { .. })
        ));
        order.update_line_quantity(line_id, MAX_QUANTITY).unwrap();
        assert_eq!(order.total_quantity(), u64::from(MAX_QUANTITY));
    }

    #[test]
    fn lines_can_change_in_kitchen_but_not_after_serving() {
        let (mut order, line_id) = order_with_line();
        order.send_to_kitchen().unwrap();

        order.update_line_quantity(line_id, 5).unwrap();
        assert_eq!(order.total_quantity(), 5);

        order.mark_served().unwrap();
        let err = order.remove_line(line_id).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(order.lines.len(), 1);
    }

    #[test]
    fn unknown_line_is_reported() {
        let (mut order, _) = order_with_line();
        let missing = OrderLineId::new();
        assert!(matches!(
            order.remove_line(missing),
            Err(OrderError::LineNotFound { line_id }) if line_id == missing
        ));
    }

    #[test]
    fn empty_order_cannot_go_to_kitchen() {
        let mut order = Order::open(TableId::new(), None);
        assert!(matches!(order.send_to_kitchen(), Err(OrderError::NoLines)));
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn cannot_serve_before_kitchen() {
        let (mut order, _) = order_with_line();
        let err = order.mark_served().unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidStateTransition {
                current_state: OrderStatus::Open,
                action: "serve"
            }
        ));
    }

    #[test]
    fn terminal_orders_reject_everything() {
        let (mut order, line_id) = order_with_line();
        order.cancel().unwrap();

        assert!(order.cancel().unwrap_err().is_conflict());
        assert!(order.mark_paid().unwrap_err().is_conflict());
        assert!(order.add_line(MenuItemId::new(), 1, None).unwrap_err().is_conflict());
        assert!(order.update_line_quantity(line_id, 3).unwrap_err().is_conflict());
    }
}
