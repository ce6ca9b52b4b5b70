//! Per-resource category and item queries.

use uuid::Uuid;

use super::menus::{CATEGORY_COLUMNS, ITEM_COLUMNS};
use super::{is_foreign_key_violation, Database};
use crate::error::{AppError, Result};
use crate::models::{Category, Item, ItemPatch, NewCategory, NewItem};

impl Database {
    pub async fn list_categories(&self, menu_id: Option<Uuid>) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE ($1::uuid IS NULL OR menu_id = $1) \
             ORDER BY position, created_at"
        ))
        .bind(menu_id)
        .fetch_all(self.pool())
        .await?;

        Ok(categories)
    }

    pub async fn create_category(&self, input: &NewCategory) -> Result<Category> {
        let result = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (menu_id, name, position) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(input.menu_id)
        .bind(&input.name)
        .bind(input.position)
        .fetch_one(self.pool())
        .await;

        match result {
            Ok(category) => Ok(category),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::NotFound("Menu not found")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_items(&self, category_id: Option<Uuid>) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE ($1::uuid IS NULL OR category_id = $1) \
             ORDER BY position, created_at, id"
        ))
        .bind(category_id)
        .fetch_all(self.pool())
        .await?;

        Ok(items)
    }

    /// Insert an item; without a position it goes after the category's last one
    pub async fn create_item(&self, input: &NewItem) -> Result<Item> {
        let result = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items \
             (category_id, name, description, price_cents, currency, image_url, tags, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, \
                     COALESCE($8, (SELECT COALESCE(MAX(position) + 1, 0) FROM items WHERE category_id = $1))) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.description.as_deref().unwrap_or_default())
        .bind(input.price_cents)
        .bind(input.currency_code())
        .bind(&input.image_url)
        .bind(&input.tags)
        .bind(input.position)
        .fetch_one(self.pool())
        .await;

        match result {
            Ok(item) => Ok(item),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::NotFound("Category not found")),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply the fields present in `patch`
    pub async fn update_item(&self, id: Uuid, patch: &ItemPatch) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                price_cents = COALESCE($4, price_cents), \
                image_url = CASE WHEN $5 THEN $6 ELSE image_url END, \
                tags = COALESCE($7, tags), \
                allergens = COALESCE($8, allergens), \
                is_visible = COALESCE($9, is_visible), \
                position = COALESCE($10, position), \
                updated_at = now() \
             WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.price_cents)
        .bind(patch.image_url.is_some())
        .bind(patch.image_url.clone().flatten())
        .bind(&patch.tags)
        .bind(&patch.allergens)
        .bind(patch.is_visible)
        .bind(patch.position)
        .fetch_optional(self.pool())
        .await?;

        Ok(item)
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "DELETE FROM items WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(item)
    }
}
