//! HTTP handlers, one module per resource.

pub mod catalog;
pub mod customers;
pub mod health;
pub mod invoices;
pub mod metrics;
pub mod orders;
pub mod reservations;
pub mod sales;
pub mod tables;

use domain::{
    BillingService, CatalogService, CustomerService, FloorService, LedgerService, OrderService,
};
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub customers: CustomerService<S>,
    pub floor: FloorService<S>,
    pub catalog: CatalogService<S>,
    pub orders: OrderService<S>,
    pub billing: BillingService<S>,
    pub ledger: LedgerService<S>,
    pub store: S,
}
