//! Tables, occupancy and reservations.
//!
//! Creating a reservation seats the party (table becomes Occupied); cancelling
//! it, or billing it, frees the table again. Each of these is one atomic
//! [`WriteBatch`].
//!
//! Two reservations may be seated at the same table: creation does not check
//! occupancy, and concurrent edits to the same table are not coordinated.

use common::model::{Reservation, ReservationTime, Table, TableStatus};
use common::{CustomerId, ReservationId, TableId};
use store::{Store, StoreError, StoreExt, Write, WriteBatch};

use crate::error::{DomainError, Result, required};

/// Service for the dining room: tables and reservations.
pub struct FloorService<S: Store> {
    store: S,
}

impl<S: Store> FloorService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a table in the Available state.
    #[tracing::instrument(skip(self))]
    pub async fn create_table(&self, name: &str, capacity: u32) -> Result<Table> {
        let name = required(name, "Table name")?;
        validate_capacity(capacity)?;
        let table = Table::new(name, capacity);

        self.store.commit_one(Write::PutTable(table.clone())).await?;

        tracing::info!(table_id = %table.id, "table created");
        Ok(table)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_tables(&self) -> Result<Vec<Table>> {
        Ok(self.store.tables().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_table(&self, id: TableId) -> Result<Table> {
        self.store
            .table(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Table", id))
    }

    /// Direct edit; the status is taken as given.
    #[tracing::instrument(skip(self))]
    pub async fn update_table(
        &self,
        id: TableId,
        name: &str,
        capacity: u32,
        status: TableStatus,
    ) -> Result<Table> {
        let name = required(name, "Table name")?;
        validate_capacity(capacity)?;
        let mut table = self.get_table(id).await?;
        table.name = name;
        table.capacity = capacity;
        table.status = status;

        self.store.commit_one(Write::PutTable(table.clone())).await?;
        Ok(table)
    }

    /// Deletes a table. Reservations seated there lose their table reference.
    #[tracing::instrument(skip(self))]
    pub async fn delete_table(&self, id: TableId) -> Result<()> {
        match self.store.commit_one(Write::DeleteTable(id)).await {
            Ok(()) => {
                tracing::info!(table_id = %id, "table deleted");
                Ok(())
            }
            Err(StoreError::StillReferenced { referenced_by, .. }) => Err(DomainError::conflict(
                format!("cannot delete: table is referenced by {referenced_by}"),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Marks a table Available regardless of its current status.
    #[tracing::instrument(skip(self))]
    pub async fn release_table(&self, id: TableId) -> Result<Table> {
        let mut table = self.get_table(id).await?;
        self.store
            .commit_one(Write::SetTableStatus {
                table_id: id,
                status: TableStatus::Available,
            })
            .await?;

        table.status = TableStatus::Available;
        tracing::info!(table_id = %id, "table released");
        Ok(table)
    }

    /// Books a party and seats it: the reservation and the table's move to
    /// Occupied are committed together.
    #[tracing::instrument(skip(self))]
    pub async fn create_reservation(
        &self,
        scheduled_for: &str,
        party_size: u32,
        customer_id: CustomerId,
        table_id: TableId,
    ) -> Result<Reservation> {
        let scheduled_for = ReservationTime::parse(scheduled_for)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        if party_size == 0 {
            return Err(DomainError::validation("Party size must be at least 1"));
        }
        if !self.store.customer_exists(customer_id).await? {
            return Err(DomainError::validation(format!(
                "Customer {customer_id} does not exist"
            )));
        }
        if !self.store.table_exists(table_id).await? {
            return Err(DomainError::validation(format!(
                "Table {table_id} does not exist"
            )));
        }

        let reservation = Reservation::new(scheduled_for, party_size, customer_id, Some(table_id));
        let batch = WriteBatch::new()
            .with(Write::InsertReservation(reservation.clone()))
            .with(Write::SetTableStatus {
                table_id,
                status: TableStatus::Occupied,
            });
        self.store.commit(batch).await?;

        tracing::info!(
            reservation_id = %reservation.id,
            table_id = %table_id,
            "reservation created, table occupied"
        );
        Ok(reservation)
    }

    /// Reservations, latest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        Ok(self.store.reservations().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_reservation(&self, id: ReservationId) -> Result<Reservation> {
        self.store
            .reservation(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }

    /// Deletes a reservation and frees its table in one commit.
    ///
    /// An invoiced reservation cannot be cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_reservation(&self, id: ReservationId) -> Result<()> {
        let reservation = self.get_reservation(id).await?;

        let mut batch = WriteBatch::new();
        if let Some(table_id) = reservation.table_id {
            batch.push(Write::SetTableStatus {
                table_id,
                status: TableStatus::Available,
            });
        }
        batch.push(Write::DeleteReservation(id));

        match self.store.commit(batch).await {
            Ok(()) => {
                tracing::info!(reservation_id = %id, "reservation cancelled");
                Ok(())
            }
            Err(StoreError::StillReferenced { .. }) => Err(DomainError::conflict(
                "cannot cancel: reservation has already been invoiced",
            )),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_capacity(capacity: u32) -> Result<()> {
    if capacity == 0 {
        return Err(DomainError::validation("Table capacity must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::{CustomerDetails, CustomerService};
    use store::InMemoryStore;

    async fn setup() -> (InMemoryStore, FloorService<InMemoryStore>, CustomerId, Table) {
        let store = InMemoryStore::new();
        let customer = CustomerService::new(store.clone())
            .create_customer(CustomerDetails::new("Ana"))
            .await
            .unwrap();
        let floor = FloorService::new(store.clone());
        let table = floor.create_table("T1", 4).await.unwrap();
        (store, floor, customer.id, table)
    }

    #[tokio::test]
    async fn new_table_is_available() {
        let (_, floor, _, table) = setup().await;
        assert_eq!(table.status, TableStatus::Available);
        assert_eq!(floor.list_tables().await.unwrap(), vec![table]);
    }

    #[tokio::test]
    async fn table_requires_name_and_capacity() {
        let (_, floor, _, _) = setup().await;
        assert!(matches!(
            floor.create_table(" ", 4).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            floor.create_table("T2", 0).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn reservation_occupies_table() {
        let (_, floor, customer_id, table) = setup().await;

        let reservation = floor
            .create_reservation("2026-05-01T20:00", 2, customer_id, table.id)
            .await
            .unwrap();

        assert_eq!(reservation.scheduled_for.to_string(), "2026-05-01 20:00");
        assert_eq!(reservation.table_id, Some(table.id));
        let table = floor.get_table(table.id).await.unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn reservation_validates_references_without_writing() {
        let (store, floor, customer_id, table) = setup().await;

        let result = floor
            .create_reservation("2026-05-01 20:00", 2, CustomerId::new(), table.id)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = floor
            .create_reservation("2026-05-01 20:00", 2, customer_id, TableId::new())
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = floor
            .create_reservation("tomorrow", 2, customer_id, table.id)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = floor
            .create_reservation("2026-05-01 20:00", 0, customer_id, table.id)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        assert_eq!(store.reservation_count().await, 0);
        let table = floor.get_table(table.id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn cancel_frees_table_and_removes_reservation() {
        let (_, floor, customer_id, table) = setup().await;
        let reservation = floor
            .create_reservation("2026-05-01 20:00", 2, customer_id, table.id)
            .await
            .unwrap();

        floor.cancel_reservation(reservation.id).await.unwrap();

        assert!(matches!(
            floor.get_reservation(reservation.id).await,
            Err(DomainError::NotFound { .. })
        ));
        let table = floor.get_table(table.id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn failed_reservation_commit_leaves_table_alone() {
        let (store, floor, customer_id, table) = setup().await;
        store.fail_on_write(1).await;

        let result = floor
            .create_reservation("2026-05-01 20:00", 2, customer_id, table.id)
            .await;

        assert!(matches!(result, Err(DomainError::Persistence(_))));
        assert_eq!(store.reservation_count().await, 0);
        let table = floor.get_table(table.id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn release_is_unconditional() {
        let (_, floor, _, table) = setup().await;
        floor
            .update_table(table.id, "T1", 4, TableStatus::Occupied)
            .await
            .unwrap();

        let released = floor.release_table(table.id).await.unwrap();
        assert_eq!(released.status, TableStatus::Available);

        let again = floor.release_table(table.id).await.unwrap();
        assert_eq!(again.status, TableStatus::Available);

        assert!(matches!(
            floor.release_table(TableId::new()).await,
            Err(DomainError::NotFound { entity: "Table", .. })
        ));
    }

    #[tokio::test]
    async fn deleting_table_unseats_reservation() {
        let (_, floor, customer_id, table) = setup().await;
        let reservation = floor
            .create_reservation("2026-05-01 20:00", 2, customer_id, table.id)
            .await
            .unwrap();

        floor.delete_table(table.id).await.unwrap();

        let reservation = floor.get_reservation(reservation.id).await.unwrap();
        assert_eq!(reservation.table_id, None);
        assert!(matches!(
            floor.delete_table(table.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn reservations_list_latest_first() {
        let (_, floor, customer_id, table) = setup().await;
        let early = floor
            .create_reservation("2026-05-01 12:00", 2, customer_id, table.id)
            .await
            .unwrap();
        let late = floor
            .create_reservation("2026-05-03 09:30", 2, customer_id, table.id)
            .await
            .unwrap();

        let ids: Vec<_> = floor
            .list_reservations()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }
}
