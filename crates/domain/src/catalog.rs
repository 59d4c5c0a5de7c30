//! Menu items and their categories.

use common::model::{Category, MenuItem};
use common::{CategoryId, MenuItemId, Money};
use store::{Store, StoreError, StoreExt, Write};

use crate::error::{DomainError, Result, required};

/// Service for the menu.
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let category = Category::new(required(name, "Category name")?);
        self.store
            .commit_one(Write::PutCategory(category.clone()))
            .await?;

        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.categories().await?)
    }

    /// Deletes a category; refused while it still owns menu items.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        match self.store.commit_one(Write::DeleteCategory(id)).await {
            Ok(()) => Ok(()),
            Err(StoreError::StillReferenced { .. }) => Err(DomainError::conflict(
                "cannot delete: category still has menu items",
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_menu_item(
        &self,
        name: &str,
        price: Money,
        category_id: CategoryId,
    ) -> Result<MenuItem> {
        let name = required(name, "Menu item name")?;
        self.validate_item(price, category_id).await?;
        let item = MenuItem::new(name, price, category_id);

        self.store.commit_one(Write::PutMenuItem(item.clone())).await?;

        tracing::info!(menu_item_id = %item.id, price = %item.price, "menu item created");
        Ok(item)
    }

    /// Updates a menu item. Past invoices keep the price they were billed at.
    #[tracing::instrument(skip(self))]
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        name: &str,
        price: Money,
        category_id: CategoryId,
    ) -> Result<MenuItem> {
        let name = required(name, "Menu item name")?;
        let mut item = self.get_menu_item(id).await?;
        self.validate_item(price, category_id).await?;
        item.name = name;
        item.price = price;
        item.category_id = category_id;

        self.store.commit_one(Write::PutMenuItem(item.clone())).await?;
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_menu_item(&self, id: MenuItemId) -> Result<MenuItem> {
        self.store
            .menu_item(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Menu item", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>> {
        Ok(self.store.menu_items().await?)
    }

    /// Deletes a menu item that has never been sold or ordered.
    #[tracing::instrument(skip(self))]
    pub async fn delete_menu_item(&self, id: MenuItemId) -> Result<()> {
        match self.store.commit_one(Write::DeleteMenuItem(id)).await {
            Ok(()) => {
                tracing::info!(menu_item_id = %id, "menu item deleted");
                Ok(())
            }
            Err(StoreError::StillReferenced {
                referenced_by: "invoice lines",
                ..
            }) => Err(DomainError::conflict("cannot delete: has sales history")),
            Err(StoreError::StillReferenced { .. }) => Err(DomainError::conflict(
                "cannot delete: item is on an order",
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn validate_item(&self, price: Money, category_id: CategoryId) -> Result<()> {
        if price.is_negative() {
            return Err(DomainError::validation("Price cannot be negative"));
        }
        if self.store.category(category_id).await?.is_none() {
            return Err(DomainError::validation(format!(
                "Category {category_id} does not exist"
            )));
        }
        Ok(())
    }
}
