//! Customers and reservations.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CustomerId, ReservationId, TableId};

/// A restaurant customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: Option<String>, email: Option<String>) -> Self {
        Self {
            id: CustomerId::new(),
            name: name.into(),
            phone,
            email,
        }
    }

    /// Returns true if the name, email or phone contains `term`, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let contains = |field: &str| field.to_lowercase().contains(&term);
        contains(&self.name)
            || self.email.as_deref().is_some_and(contains)
            || self.phone.as_deref().is_some_and(contains)
    }
}

/// Error returned when a reservation time string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reservation time '{0}': expected YYYY-MM-DD HH:MM")]
pub struct InvalidReservationTime(pub String);

/// Date and time of a reservation at minute precision.
///
/// Accepts `YYYY-MM-DDTHH:MM` (browser `datetime-local`) or `YYYY-MM-DD HH:MM`,
/// with optional seconds that are dropped. Always renders as
/// `YYYY-MM-DD HH:MM`, which sorts chronologically as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReservationTime(NaiveDateTime);

impl ReservationTime {
    const FORMAT: &'static str = "%Y-%m-%d %H:%M";

    pub fn parse(raw: &str) -> Result<Self, InvalidReservationTime> {
        let normalized = raw.trim().replacen('T', " ", 1);
        let parsed = NaiveDateTime::parse_from_str(&normalized, Self::FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S"))
            .map_err(|_| InvalidReservationTime(raw.to_string()))?;
        Ok(Self::from_datetime(parsed))
    }

    /// Truncates `datetime` to the minute.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let truncated = datetime
            .with_second(0)
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(datetime);
        Self(truncated)
    }

    /// The current local wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(chrono::Local::now().naive_local())
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl std::fmt::Display for ReservationTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl std::str::FromStr for ReservationTime {
    type Err = InvalidReservationTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ReservationTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReservationTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A reservation, or the synthetic record behind a walk-in sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub scheduled_for: ReservationTime,
    pub party_size: u32,
    pub customer_id: CustomerId,
    /// `None` when nobody is seated, e.g. a walk-in or takeout sale.
    pub table_id: Option<TableId>,
}

impl Reservation {
    pub fn new(
        scheduled_for: ReservationTime,
        party_size: u32,
        customer_id: CustomerId,
        table_id: Option<TableId>,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            scheduled_for,
            party_size,
            customer_id,
            table_id,
        }
    }

    /// A zero-party, tableless reservation stamped with the current time.
    pub fn walk_in(customer_id: CustomerId) -> Self {
        Self::new(ReservationTime::now(), 0, customer_id, None)
    }
}
