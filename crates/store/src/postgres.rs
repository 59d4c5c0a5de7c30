use std::collections::HashMap;

use async_trait::async_trait;
use common::model::{
    Category, Customer, Invoice, InvoiceLine, MenuItem, Order, OrderLine, OrderStatus,
    Reservation, ReservationTime, Table, TableStatus,
};
use common::{
    CategoryId, CustomerId, InvoiceId, InvoiceLineId, MenuItemId, Money, OrderId, OrderLineId,
    ReservationId, TableId,
};
use sqlx::postgres::{PgDatabaseError, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::{
    InvoiceQuery, Result, StoreError, Write, WriteBatch,
    store::{Store, validate_batch},
};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

const INVOICE_COLUMNS: &str = "id, reservation_id, customer_id, created_at, subtotal_cents, \
     tax_cents, service_charge_cents, total_cents";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn order_lines(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderLine>>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, menu_item_id, quantity, note
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id: Uuid = row.try_get("order_id")?;
            grouped
                .entry(order_id)
                .or_default()
                .push(row_to_order_line(&row)?);
        }
        Ok(grouped)
    }

    async fn with_order_lines(&self, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut lines = self.order_lines(&ids).await?;

        rows.iter()
            .map(|row| {
                let mut order = row_to_order(row)?;
                order.lines = lines.remove(&order.id.as_uuid()).unwrap_or_default();
                Ok(order)
            })
            .collect()
    }

    async fn invoice_lines(&self, invoice_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<InvoiceLine>>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, menu_item_id, quantity, unit_price_cents, description,
                   line_total_cents
            FROM invoice_lines
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, position
            "#,
        )
        .bind(invoice_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<InvoiceLine>> = HashMap::new();
        for row in rows {
            let invoice_id: Uuid = row.try_get("invoice_id")?;
            grouped
                .entry(invoice_id)
                .or_default()
                .push(row_to_invoice_line(&row)?);
        }
        Ok(grouped)
    }

    async fn with_invoice_lines(&self, rows: Vec<PgRow>) -> Result<Vec<Invoice>> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut lines = self.invoice_lines(&ids).await?;

        rows.iter()
            .map(|row| {
                let mut invoice = row_to_invoice(row)?;
                invoice.lines = lines.remove(&invoice.id.as_uuid()).unwrap_or_default();
                Ok(invoice)
            })
            .collect()
    }
}

fn to_u32(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} = {value}")))
}

fn to_i32(value: u32, field: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| StoreError::Rejected(format!("{field} too large: {value}")))
}

fn row_to_customer(row: &PgRow) -> Result<Customer> {
    Ok(Customer {
        id: CustomerId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
    })
}

fn row_to_table(row: &PgRow) -> Result<Table> {
    let status: String = row.try_get("status")?;
    Ok(Table {
        id: TableId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        capacity: to_u32(row.try_get("capacity")?, "capacity")?,
        status: status
            .parse::<TableStatus>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
    })
}

fn row_to_category(row: &PgRow) -> Result<Category> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}

fn row_to_menu_item(row: &PgRow) -> Result<MenuItem> {
    Ok(MenuItem {
        id: MenuItemId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        category_id: CategoryId::from_uuid(row.try_get("category_id")?),
    })
}

fn row_to_reservation(row: &PgRow) -> Result<Reservation> {
    let scheduled_for: String = row.try_get("scheduled_for")?;
    Ok(Reservation {
        id: ReservationId::from_uuid(row.try_get("id")?),
        scheduled_for: ReservationTime::parse(&scheduled_for)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        party_size: to_u32(row.try_get("party_size")?, "party_size")?,
        customer_id: CustomerId::from_uuid(row.try_get("customer_id")?),
        table_id: row
            .try_get::<Option<Uuid>, _>("table_id")?
            .map(TableId::from_uuid),
    })
}

fn row_to_order(row: &PgRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id")?),
        table_id: TableId::from_uuid(row.try_get("table_id")?),
        customer_id: row
            .try_get::<Option<Uuid>, _>("customer_id")?
            .map(CustomerId::from_uuid),
        opened_at: row.try_get("opened_at")?,
        status: status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        lines: Vec::new(),
    })
}

fn row_to_order_line(row: &PgRow) -> Result<OrderLine> {
    Ok(OrderLine {
        id: OrderLineId::from_uuid(row.try_get("id")?),
        order_id: OrderId::from_uuid(row.try_get("order_id")?),
        menu_item_id: MenuItemId::from_uuid(row.try_get("menu_item_id")?),
        quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        note: row.try_get("note")?,
    })
}

fn row_to_invoice(row: &PgRow) -> Result<Invoice> {
    Ok(Invoice {
        id: InvoiceId::from_uuid(row.try_get("id")?),
        reservation_id: ReservationId::from_uuid(row.try_get("reservation_id")?),
        customer_id: CustomerId::from_uuid(row.try_get("customer_id")?),
        created_at: row.try_get("created_at")?,
        subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
        tax: Money::from_cents(row.try_get("tax_cents")?),
        service_charge: Money::from_cents(row.try_get("service_charge_cents")?),
        total: Money::from_cents(row.try_get("total_cents")?),
        lines: Vec::new(),
    })
}

fn row_to_invoice_line(row: &PgRow) -> Result<InvoiceLine> {
    Ok(InvoiceLine {
        id: InvoiceLineId::from_uuid(row.try_get("id")?),
        invoice_id: InvoiceId::from_uuid(row.try_get("invoice_id")?),
        menu_item_id: row
            .try_get::<Option<Uuid>, _>("menu_item_id")?
            .map(MenuItemId::from_uuid),
        quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        description: row.try_get("description")?,
        line_total: Money::from_cents(row.try_get("line_total_cents")?),
    })
}

/// Returns the violated constraint name if `e` is a violation with `code`.
fn violated_constraint<'e>(e: &'e sqlx::Error, code: &str) -> Option<&'e str> {
    match e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(code) => {
            Some(db.constraint().unwrap_or_default())
        }
        _ => None,
    }
}

/// Maps a foreign key constraint to the table holding the reference.
fn referencing_rows(constraint: &str) -> &'static str {
    const PREFIXES: [(&str, &str); 6] = [
        ("reservations_", "reservations"),
        ("order_lines_", "order lines"),
        ("orders_", "orders"),
        ("invoice_lines_", "invoice lines"),
        ("invoices_", "invoices"),
        ("menu_items_", "menu items"),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _)| constraint.starts_with(prefix))
        .map_or("other rows", |(_, rows)| rows)
}

/// Maps a foreign key constraint to the entity it points at.
fn referenced_entity(constraint: &str) -> &'static str {
    const COLUMNS: [(&str, &str); 5] = [
        ("_category_id_", "Category"),
        ("_customer_id_", "Customer"),
        ("_table_id_", "Table"),
        ("_menu_item_id_", "Menu item"),
        ("_reservation_id_", "Reservation"),
    ];
    COLUMNS
        .iter()
        .find(|(column, _)| constraint.contains(column))
        .map_or("Row", |(_, entity)| entity)
}

/// Translates an insert/update failure, turning a dangling foreign key into
/// `NotFound` for the missing parent row.
fn insert_error(e: sqlx::Error) -> StoreError {
    let Some(constraint) = violated_constraint(&e, FOREIGN_KEY_VIOLATION) else {
        return StoreError::Database(e);
    };
    let entity = referenced_entity(constraint);
    // detail reads: Key (category_id)=(<uuid>) is not present in table "categories".
    let id = match &e {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|pg| pg.detail())
            .and_then(|detail| detail.split_once(")=(")?.1.split_once(')'))
            .map(|(value, _)| value.to_string()),
        _ => None,
    };
    StoreError::NotFound {
        entity,
        id: id.unwrap_or_else(|| constraint.to_string()),
    }
}

async fn delete_row(
    conn: &mut PgConnection,
    sql: &'static str,
    entity: &'static str,
    id: Uuid,
) -> Result<()> {
    let result = sqlx::query(sql)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            match violated_constraint(&e, FOREIGN_KEY_VIOLATION).map(referencing_rows) {
                Some(rows) => StoreError::still_referenced(entity, id, rows),
                None => StoreError::Database(e),
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(entity, id));
    }
    Ok(())
}

async fn put_order(conn: &mut PgConnection, order: &Order) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, table_id, customer_id, opened_at, status)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            table_id = EXCLUDED.table_id,
            customer_id = EXCLUDED.customer_id,
            status = EXCLUDED.status
        "#,
    )
    .bind(order.id.as_uuid())
    .bind(order.table_id.as_uuid())
    .bind(order.customer_id.map(|id| id.as_uuid()))
    .bind(order.opened_at)
    .bind(order.status.as_str())
    .execute(&mut *conn)
    .await
    .map_err(insert_error)?;

    sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
        .bind(order.id.as_uuid())
        .execute(&mut *conn)
        .await?;

    for (position, line) in order.lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_lines (id, order_id, position, menu_item_id, quantity, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(order.id.as_uuid())
        .bind(position as i32)
        .bind(line.menu_item_id.as_uuid())
        .bind(to_i32(line.quantity, "quantity")?)
        .bind(line.note.as_deref())
        .execute(&mut *conn)
        .await
        .map_err(insert_error)?;
    }
    Ok(())
}

async fn insert_invoice(conn: &mut PgConnection, invoice: &Invoice) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (id, reservation_id, customer_id, created_at, subtotal_cents,
                              tax_cents, service_charge_cents, total_cents)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(invoice.id.as_uuid())
    .bind(invoice.reservation_id.as_uuid())
    .bind(invoice.customer_id.as_uuid())
    .bind(invoice.created_at)
    .bind(invoice.subtotal.cents())
    .bind(invoice.tax.cents())
    .bind(invoice.service_charge.cents())
    .bind(invoice.total.cents())
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if violated_constraint(&e, UNIQUE_VIOLATION) == Some("unique_invoice_reservation") {
            return StoreError::AlreadyInvoiced(invoice.reservation_id);
        }
        insert_error(e)
    })?;

    for (position, line) in invoice.lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO invoice_lines (id, invoice_id, position, menu_item_id, quantity,
                                       unit_price_cents, description, line_total_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(invoice.id.as_uuid())
        .bind(position as i32)
        .bind(line.menu_item_id.map(|id| id.as_uuid()))
        .bind(to_i32(line.quantity, "quantity")?)
        .bind(line.unit_price.cents())
        .bind(&line.description)
        .bind(line.line_total.cents())
        .execute(&mut *conn)
        .await
        .map_err(insert_error)?;
    }
    Ok(())
}

async fn apply(conn: &mut PgConnection, write: Write) -> Result<()> {
    match write {
        Write::PutCustomer(customer) => {
            sqlx::query(
                r#"
                INSERT INTO customers (id, name, phone, email)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    phone = EXCLUDED.phone,
                    email = EXCLUDED.email
                "#,
            )
            .bind(customer.id.as_uuid())
            .bind(&customer.name)
            .bind(customer.phone.as_deref())
            .bind(customer.email.as_deref())
            .execute(&mut *conn)
            .await?;
        }
        Write::DeleteCustomer(id) => {
            delete_row(
                conn,
                "DELETE FROM customers WHERE id = $1",
                "Customer",
                id.as_uuid(),
            )
            .await?;
        }
        Write::PutTable(table) => {
            sqlx::query(
                r#"
                INSERT INTO dining_tables (id, name, capacity, status)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    capacity = EXCLUDED.capacity,
                    status = EXCLUDED.status
                "#,
            )
            .bind(table.id.as_uuid())
            .bind(&table.name)
            .bind(to_i32(table.capacity, "capacity")?)
            .bind(table.status.as_str())
            .execute(&mut *conn)
            .await?;
        }
        Write::SetTableStatus { table_id, status } => {
            let result = sqlx::query("UPDATE dining_tables SET status = $2 WHERE id = $1")
                .bind(table_id.as_uuid())
                .bind(status.as_str())
                .execute(&mut *conn)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Table", table_id));
            }
        }
        Write::DeleteTable(id) => {
            delete_row(
                conn,
                "DELETE FROM dining_tables WHERE id = $1",
                "Table",
                id.as_uuid(),
            )
            .await?;
        }
        Write::PutCategory(category) => {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name) VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
                "#,
            )
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .execute(&mut *conn)
            .await?;
        }
        Write::DeleteCategory(id) => {
            delete_row(
                conn,
                "DELETE FROM categories WHERE id = $1",
                "Category",
                id.as_uuid(),
            )
            .await?;
        }
        Write::PutMenuItem(item) => {
            sqlx::query(
                r#"
                INSERT INTO menu_items (id, name, price_cents, category_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    price_cents = EXCLUDED.price_cents,
                    category_id = EXCLUDED.category_id
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(&item.name)
            .bind(item.price.cents())
            .bind(item.category_id.as_uuid())
            .execute(&mut *conn)
            .await
            .map_err(insert_error)?;
        }
        Write::DeleteMenuItem(id) => {
            delete_row(
                conn,
                "DELETE FROM menu_items WHERE id = $1",
                "Menu item",
                id.as_uuid(),
            )
            .await?;
        }
        Write::InsertReservation(reservation) => {
            sqlx::query(
                r#"
                INSERT INTO reservations (id, scheduled_for, party_size, customer_id, table_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(reservation.id.as_uuid())
            .bind(reservation.scheduled_for.to_string())
            .bind(to_i32(reservation.party_size, "party_size")?)
            .bind(reservation.customer_id.as_uuid())
            .bind(reservation.table_id.map(|id| id.as_uuid()))
            .execute(&mut *conn)
            .await
            .map_err(insert_error)?;
        }
        Write::DeleteReservation(id) => {
            delete_row(
                conn,
                "DELETE FROM reservations WHERE id = $1",
                "Reservation",
                id.as_uuid(),
            )
            .await?;
        }
        Write::PutOrder(order) => put_order(conn, &order).await?,
        Write::InsertInvoice(invoice) => insert_invoice(conn, &invoice).await?,
    }
    Ok(())
}

#[async_trait]
impl Store for PostgresStore {
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, phone, email FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_customer).transpose()
    }

    async fn customers(&self, search: Option<&str>) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, email
            FROM customers
            WHERE $1::TEXT IS NULL
               OR name ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
               OR phone ILIKE '%' || $1 || '%'
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect()
    }

    async fn table(&self, id: TableId) -> Result<Option<Table>> {
        let row =
            sqlx::query("SELECT id, name, capacity, status FROM dining_tables WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        row.as_ref().map(row_to_table).transpose()
    }

    async fn tables(&self) -> Result<Vec<Table>> {
        let rows = sqlx::query(
            "SELECT id, name, capacity, status FROM dining_tables ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_table).collect()
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_category).collect()
    }

    async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>> {
        let row = sqlx::query(
            "SELECT id, name, price_cents, category_id FROM menu_items WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_menu_item).transpose()
    }

    async fn menu_items(&self) -> Result<Vec<MenuItem>> {
        let rows = sqlx::query(
            "SELECT id, name, price_cents, category_id FROM menu_items ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_menu_item).collect()
    }

    async fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT id, scheduled_for, party_size, customer_id, table_id
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_reservation).transpose()
    }

    async fn reservations(&self) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, scheduled_for, party_size, customer_id, table_id
            FROM reservations
            ORDER BY scheduled_for DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_reservation).collect()
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let rows = sqlx::query(
            "SELECT id, table_id, customer_id, opened_at, status FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(self.with_order_lines(rows).await?.into_iter().next())
    }

    async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, table_id, customer_id, opened_at, status
            FROM orders
            WHERE $1::TEXT IS NULL OR status = $1
            ORDER BY opened_at DESC, id DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        self.with_order_lines(rows).await
    }

    async fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>> {
        let rows = sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        Ok(self.with_invoice_lines(rows).await?.into_iter().next())
    }

    async fn invoice_for_reservation(&self, id: ReservationId) -> Result<Option<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE reservation_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(self.with_invoice_lines(rows).await?.into_iter().next())
    }

    async fn invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>> {
        let mut sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.customer_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND customer_id = ${param_count}"));
        }
        if query.from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if query.to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at <= ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(customer_id) = query.customer_id {
            sqlx_query = sqlx_query.bind(customer_id.as_uuid());
        }
        if let Some(from) = query.from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.to {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        self.with_invoice_lines(rows).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        validate_batch(&batch)?;

        // Start a transaction; dropping it without commit rolls back.
        let mut tx = self.pool.begin().await?;

        for (index, write) in batch.into_iter().enumerate() {
            let kind = write.kind();
            if let Err(e) = apply(&mut tx, write).await {
                tracing::debug!(index, kind, error = %e, "write batch rolled back");
                metrics::counter!("store_commit_failures_total").increment(1);
                return Err(e);
            }
        }

        tx.commit().await?;
        metrics::counter!("store_commits_total").increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referencing_rows_maps_default_constraint_names() {
        assert_eq!(
            referencing_rows("invoice_lines_menu_item_id_fkey"),
            "invoice lines"
        );
        assert_eq!(referencing_rows("order_lines_menu_item_id_fkey"), "order lines");
        assert_eq!(referencing_rows("orders_table_id_fkey"), "orders");
        assert_eq!(referencing_rows("invoices_customer_id_fkey"), "invoices");
        assert_eq!(referencing_rows("something_else"), "other rows");
    }

    #[test]
    fn referenced_entity_maps_column_names() {
        assert_eq!(referenced_entity("menu_items_category_id_fkey"), "Category");
        assert_eq!(referenced_entity("reservations_table_id_fkey"), "Table");
        assert_eq!(referenced_entity("invoices_reservation_id_fkey"), "Reservation");
        assert_eq!(referenced_entity("invoice_lines_menu_item_id_fkey"), "Menu item");
    }
}
