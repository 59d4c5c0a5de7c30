//! Dining tables and their occupancy state.

use serde::{Deserialize, Serialize};

use crate::TableId;

use super::UnknownVariant;

/// Occupancy state of a table.
///
/// ```text
/// Available ──(reservation created)──► Occupied
///     ▲                                   │
///     └──(cancelled / invoiced / released)┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "Available",
            TableStatus::Occupied => "Occupied",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, TableStatus::Available)
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TableStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(TableStatus::Available),
            "Occupied" => Ok(TableStatus::Occupied),
            other => Err(UnknownVariant::new("table status", other)),
        }
    }
}

/// A dining table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub capacity: u32,
    pub status: TableStatus,
}

impl Table {
    /// Creates a new, available table.
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: TableId::new(),
            name: name.into(),
            capacity,
            status: TableStatus::Available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_available() {
        let table = Table::new("Terraza 1", 4);
        assert_eq!(table.status, TableStatus::Available);
        assert_eq!(table.capacity, 4);
    }

    #[test]
    fn status_parses_its_display_form() {
        for status in [TableStatus::Available, TableStatus::Occupied] {
            assert_eq!(status.to_string().parse::<TableStatus>().unwrap(), status);
        }
        assert!("Ocupada".parse::<TableStatus>().is_err());
    }
}
