pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod write;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::InvoiceQuery;
pub use store::{Store, StoreExt};
pub use write::{Write, WriteBatch};
