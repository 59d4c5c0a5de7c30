//! Entity records shared by the store and the domain services.

mod catalog;
mod invoice;
mod order;
mod party;
mod table;

pub use catalog::{Category, MenuItem};
pub use invoice::{Invoice, InvoiceLine};
pub use order::{MAX_QUANTITY, Order, OrderLine, OrderStatus};
pub use party::{Customer, InvalidReservationTime, Reservation, ReservationTime};
pub use table::{Table, TableStatus};

use thiserror::Error;

/// Error returned when a stored enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
