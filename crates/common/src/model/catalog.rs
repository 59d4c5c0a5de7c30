//! Menu categories and items.

use serde::{Deserialize, Serialize};

use crate::{CategoryId, MenuItemId, Money};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
        }
    }
}

/// A dish or drink on the menu.
///
/// `price` is the current selling price. Invoices copy it at sale time, so
/// changing it never alters past invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Money,
    pub category_id: CategoryId,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: Money, category_id: CategoryId) -> Self {
        Self {
            id: MenuItemId::new(),
            name: name.into(),
            price,
            category_id,
        }
    }
}
