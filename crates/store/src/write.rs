use common::model::{Category, Customer, Invoice, MenuItem, Order, Reservation, Table, TableStatus};
use common::{CategoryId, CustomerId, MenuItemId, ReservationId, TableId};

/// A single mutation. Writes are only ever applied through a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum Write {
    /// Inserts or replaces a customer.
    PutCustomer(Customer),
    /// Deletes a customer; refused while reservations, orders or invoices
    /// reference it.
    DeleteCustomer(CustomerId),

    /// Inserts or replaces a table.
    PutTable(Table),
    SetTableStatus {
        table_id: TableId,
        status: TableStatus,
    },
    /// Deletes a table. Reservations seated there lose their table reference;
    /// refused while an order references it.
    DeleteTable(TableId),

    PutCategory(Category),
    /// Deletes a category; refused while it still owns menu items.
    DeleteCategory(CategoryId),

    /// Inserts or replaces a menu item. The category must exist.
    PutMenuItem(MenuItem),
    /// Deletes a menu item; refused while invoice or order lines reference it.
    DeleteMenuItem(MenuItemId),

    /// Inserts a reservation. Customer and table (if any) must exist.
    InsertReservation(Reservation),
    /// Deletes a reservation; refused once it has been invoiced.
    DeleteReservation(ReservationId),

    /// Inserts or replaces an order together with all of its lines.
    PutOrder(Order),

    /// Appends an invoice and its lines. At most one invoice per reservation.
    InsertInvoice(Invoice),
}

impl Write {
    /// Short name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Write::PutCustomer(_) => "put_customer",
            Write::DeleteCustomer(_) => "delete_customer",
            Write::PutTable(_) => "put_table",
            Write::SetTableStatus { .. } => "set_table_status",
            Write::DeleteTable(_) => "delete_table",
            Write::PutCategory(_) => "put_category",
            Write::DeleteCategory(_) => "delete_category",
            Write::PutMenuItem(_) => "put_menu_item",
            Write::DeleteMenuItem(_) => "delete_menu_item",
            Write::InsertReservation(_) => "insert_reservation",
            Write::DeleteReservation(_) => "delete_reservation",
            Write::PutOrder(_) => "put_order",
            Write::InsertInvoice(_) => "insert_invoice",
        }
    }
}

/// An ordered list of writes committed atomically: either every write applies
/// or none does.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a write, builder style.
    pub fn with(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    pub fn push(&mut self, write: Write) {
        self.writes.push(write);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Write> {
        self.writes.iter()
    }
}

impl From<Write> for WriteBatch {
    fn from(write: Write) -> Self {
        Self {
            writes: vec![write],
        }
    }
}

impl IntoIterator for WriteBatch {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_order() {
        let table = Table::new("T1", 2);
        let batch = WriteBatch::new()
            .with(Write::PutTable(table.clone()))
            .with(Write::SetTableStatus {
                table_id: table.id,
                status: TableStatus::Occupied,
            });

        let kinds: Vec<_> = batch.iter().map(Write::kind).collect();
        assert_eq!(kinds, ["put_table", "set_table_status"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn single_write_converts_into_batch() {
        let batch: WriteBatch = Write::DeleteTable(TableId::new()).into();
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
    }
}
