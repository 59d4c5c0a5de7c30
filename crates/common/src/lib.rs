//! Shared types for the restaurant service: typed identifiers, money and the
//! entity records persisted by the store.

pub mod ids;
pub mod model;
pub mod money;

pub use ids::{
    CategoryId, CustomerId, InvoiceId, InvoiceLineId, MenuItemId, OrderId, OrderLineId,
    ReservationId, TableId,
};
pub use money::Money;
