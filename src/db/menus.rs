use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use super::{is_foreign_key_violation, Database};
use crate::constants::{DEMO_RESTAURANT_NAME, DEMO_RESTAURANT_OWNER, DEMO_RESTAURANT_SLUG};
use crate::error::{AppError, Result};
use crate::menus::{
    rewrite_menu, write_menu, CategoryRecord, CreatedMenu, ItemRecord, MenuPayload, MenuRecord,
    MenuStore, MenuWriter,
};
use crate::models::{
    assemble_menu_details, Category, Item, Menu, MenuDetail, MenuOwner, MenuPatch, MenuSummary,
};

const MENU_COLUMNS: &str = "id, restaurant_id, name, is_default, created_at, updated_at";

pub(crate) const CATEGORY_COLUMNS: &str =
    "id, menu_id, name, description, position, created_at, updated_at";

pub(crate) const ITEM_COLUMNS: &str = "id, category_id, name, description, price_cents, currency, \
     image_url, is_visible, tags, allergens, position, created_at, updated_at";

/// [`MenuWriter`] over one open connection, normally a transaction
pub struct PgMenuWriter<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgMenuWriter<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> MenuWriter for PgMenuWriter<'c> {
    async fn insert_menu(&mut self, restaurant_id: Uuid, menu: &MenuRecord) -> Result<Menu> {
        let result = sqlx::query_as::<_, Menu>(&format!(
            "INSERT INTO menus (restaurant_id, name, is_default) VALUES ($1, $2, $3) \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(restaurant_id)
        .bind(&menu.name)
        .bind(menu.is_default)
        .fetch_one(&mut *self.conn)
        .await;

        match result {
            Ok(menu) => Ok(menu),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::NotFound("Restaurant not found")),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_menu(&mut self, menu_id: Uuid, menu: &MenuRecord) -> Result<Option<Menu>> {
        let updated = sqlx::query_as::<_, Menu>(&format!(
            "UPDATE menus SET name = $2, is_default = $3, updated_at = now() \
             WHERE id = $1 RETURNING {MENU_COLUMNS}"
        ))
        .bind(menu_id)
        .bind(&menu.name)
        .bind(menu.is_default)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(updated)
    }

    async fn clear_categories(&mut self, menu_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE menu_id = $1")
            .bind(menu_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_category(
        &mut self,
        menu_id: Uuid,
        category: &CategoryRecord,
    ) -> Result<Category> {
        let created = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (menu_id, name, description, position) \
             VALUES ($1, $2, $3, $4) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(menu_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.position)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(created)
    }

    async fn insert_item(&mut self, category_id: Uuid, item: &ItemRecord) -> Result<Item> {
        let created = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items \
             (category_id, name, description, price_cents, currency, image_url, is_visible, tags, allergens, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(category_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(&item.currency)
        .bind(&item.thumbnail)
        .bind(item.is_visible)
        .bind(&item.labels)
        .bind(&item.allergens)
        .bind(item.position)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(created)
    }
}

#[async_trait]
impl MenuStore for Database {
    /// Demo restaurant, identified by its owner rather than its slug
    async fn demo_restaurant(&self) -> Result<Uuid> {
        if let Some(id) = self.demo_restaurant_id().await? {
            return Ok(id);
        }

        sqlx::query(
            "INSERT INTO restaurants (owner_user_id, name, slug) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(DEMO_RESTAURANT_OWNER)
        .bind(DEMO_RESTAURANT_NAME)
        .bind(DEMO_RESTAURANT_SLUG)
        .execute(self.pool())
        .await?;

        // A concurrent first call may have inserted it instead
        self.demo_restaurant_id().await?.ok_or_else(|| {
            AppError::Internal(format!(
                "Slug {DEMO_RESTAURANT_SLUG} is held by a restaurant not owned by {DEMO_RESTAURANT_OWNER}"
            ))
        })
    }

    async fn persist_menu(
        &self,
        restaurant_id: Uuid,
        payload: &MenuPayload,
    ) -> Result<CreatedMenu> {
        let mut tx = self.pool().begin().await?;

        // Dropping tx on error rolls everything back
        let created = {
            let mut writer = PgMenuWriter::new(&mut *tx);
            write_menu(&mut writer, restaurant_id, payload).await?
        };

        tx.commit().await?;
        Ok(created)
    }

    async fn replace_menu(&self, menu_id: Uuid, payload: &MenuPayload) -> Result<CreatedMenu> {
        let mut tx = self.pool().begin().await?;

        let replaced = {
            let mut writer = PgMenuWriter::new(&mut *tx);
            rewrite_menu(&mut writer, menu_id, payload).await?
        };

        tx.commit().await?;
        Ok(replaced)
    }
}

impl Database {
    async fn demo_restaurant_id(&self) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM restaurants WHERE owner_user_id = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(DEMO_RESTAURANT_OWNER)
        .fetch_optional(self.pool())
        .await?;

        Ok(id)
    }

    /// Menus newest first, with item and category counts
    pub async fn list_menus(&self, restaurant_id: Option<Uuid>) -> Result<Vec<MenuSummary>> {
        let menus = sqlx::query_as::<_, MenuSummary>(
            "SELECT m.id, m.name, m.is_default, m.created_at, \
                    COUNT(DISTINCT i.id) AS items_count, \
                    COUNT(DISTINCT c.id) AS categories_count \
             FROM menus m \
             LEFT JOIN categories c ON c.menu_id = m.id \
             LEFT JOIN items i ON i.category_id = c.id \
             WHERE ($1::uuid IS NULL OR m.restaurant_id = $1) \
             GROUP BY m.id \
             ORDER BY m.created_at DESC",
        )
        .bind(restaurant_id)
        .fetch_all(self.pool())
        .await?;

        Ok(menus)
    }

    pub async fn find_menu(&self, id: Uuid) -> Result<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(menu)
    }

    pub async fn menu_owner(&self, id: Uuid) -> Result<Option<MenuOwner>> {
        let owner = sqlx::query_as::<_, MenuOwner>(
            "SELECT m.restaurant_id, r.owner_user_id \
             FROM menus m JOIN restaurants r ON r.id = m.restaurant_id \
             WHERE m.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(owner)
    }

    pub async fn menu_detail(&self, id: Uuid) -> Result<Option<MenuDetail>> {
        let Some(menu) = self.find_menu(id).await? else {
            return Ok(None);
        };
        Ok(self.load_details(vec![menu]).await?.pop())
    }

    /// Menus of a restaurant, default first then newest, fully nested
    pub async fn restaurant_menu_details(&self, restaurant_id: Uuid) -> Result<Vec<MenuDetail>> {
        let menus = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE restaurant_id = $1 \
             ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(restaurant_id)
        .fetch_all(self.pool())
        .await?;

        self.load_details(menus).await
    }

    async fn load_details(&self, menus: Vec<Menu>) -> Result<Vec<MenuDetail>> {
        if menus.is_empty() {
            return Ok(Vec::new());
        }
        let menu_ids: Vec<Uuid> = menus.iter().map(|m| m.id).collect();

        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE menu_id = ANY($1) \
             ORDER BY position, created_at"
        ))
        .bind(&menu_ids)
        .fetch_all(self.pool())
        .await?;

        let items = sqlx::query_as::<_, Item>(
            "SELECT i.id, i.category_id, i.name, i.description, i.price_cents, i.currency, \
                    i.image_url, i.is_visible, i.tags, i.allergens, i.position, \
                    i.created_at, i.updated_at \
             FROM items i JOIN categories c ON c.id = i.category_id \
             WHERE c.menu_id = ANY($1) \
             ORDER BY i.position, i.created_at, i.id",
        )
        .bind(&menu_ids)
        .fetch_all(self.pool())
        .await?;

        Ok(assemble_menu_details(menus, categories, items))
    }

    pub async fn patch_menu(&self, id: Uuid, patch: &MenuPatch) -> Result<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "UPDATE menus SET name = COALESCE($2, name), \
                              is_default = COALESCE($3, is_default), \
                              updated_at = now() \
             WHERE id = $1 RETURNING {MENU_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(patch.is_default)
        .fetch_optional(self.pool())
        .await?;

        Ok(menu)
    }

    /// Delete a menu; its categories and items cascade
    pub async fn delete_menu(&self, id: Uuid) -> Result<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "DELETE FROM menus WHERE id = $1 RETURNING {MENU_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(menu)
    }
}
