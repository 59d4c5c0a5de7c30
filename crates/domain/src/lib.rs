//! Domain layer for the restaurant front of house.
//!
//! Each service owns a [`store::Store`] handle and exposes one concern:
//! - [`CustomerService`]: the customer directory
//! - [`FloorService`]: tables, occupancy and reservations
//! - [`CatalogService`]: categories and menu items
//! - [`OrderService`]: open tabs and their state machine
//! - [`BillingService`]: selections to invoices, atomically
//! - [`LedgerService`]: reading past invoices

pub mod billing;
pub mod catalog;
pub mod customers;
pub mod error;
pub mod floor;
pub mod ledger;
pub mod orders;

pub use billing::{
    BillingService, SERVICE_CHARGE_PERCENT, SaleTotals, Selection, ServiceKind, TAX_PERCENT,
    parse_quantity,
};
pub use catalog::CatalogService;
pub use customers::{CustomerDetails, CustomerService};
pub use error::{DomainError, Result};
pub use floor::FloorService;
pub use ledger::LedgerService;
pub use orders::{OrderCommands, OrderError, OrderService};
