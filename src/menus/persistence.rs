//! Writing normalised menus as one unit of work.
//!
//! [`MenuWriter`] is the statement-level seam (one open transaction), while
//! [`MenuStore`] owns transaction boundaries. The orchestration functions here
//! only decide what to write and in which order.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::draft::{CategoryRecord, ItemRecord, MenuDraft, MenuPayload, MenuRecord};
use crate::error::{AppError, Result};
use crate::models::{Category, Item, Menu};

/// Rows created (or re-created) by one persistence transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedMenu {
    pub menu: Menu,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
}

/// Statements issued inside a single open transaction
#[async_trait]
pub trait MenuWriter: Send {
    async fn insert_menu(&mut self, restaurant_id: Uuid, menu: &MenuRecord) -> Result<Menu>;

    /// `None` when no menu has this id
    async fn update_menu(&mut self, menu_id: Uuid, menu: &MenuRecord) -> Result<Option<Menu>>;

    /// Remove every category of the menu; items go with them
    async fn clear_categories(&mut self, menu_id: Uuid) -> Result<u64>;

    async fn insert_category(&mut self, menu_id: Uuid, category: &CategoryRecord)
        -> Result<Category>;

    async fn insert_item(&mut self, category_id: Uuid, item: &ItemRecord) -> Result<Item>;
}

/// Insert a new menu with its categories and items.
///
/// Categories are written in payload order before any item so every item can
/// be wired to the generated id of its category.
pub async fn write_menu<W>(
    writer: &mut W,
    restaurant_id: Uuid,
    payload: &MenuPayload,
) -> Result<CreatedMenu>
where
    W: MenuWriter + ?Sized,
{
    let menu = writer.insert_menu(restaurant_id, &payload.menu).await?;
    write_sections(writer, menu, payload).await
}

/// Replace an existing menu's fields and contents with the payload
pub async fn rewrite_menu<W>(
    writer: &mut W,
    menu_id: Uuid,
    payload: &MenuPayload,
) -> Result<CreatedMenu>
where
    W: MenuWriter + ?Sized,
{
    let menu = writer
        .update_menu(menu_id, &payload.menu)
        .await?
        .ok_or(AppError::NotFound("Menu not found"))?;

    let removed = writer.clear_categories(menu_id).await?;
    tracing::debug!("Cleared {} categories of menu {}", removed, menu_id);

    write_sections(writer, menu, payload).await
}

async fn write_sections<W>(writer: &mut W, menu: Menu, payload: &MenuPayload) -> Result<CreatedMenu>
where
    W: MenuWriter + ?Sized,
{
    let mut categories = Vec::with_capacity(payload.categories.len());
    for record in &payload.categories {
        categories.push(writer.insert_category(menu.id, record).await?);
    }

    let mut items = Vec::with_capacity(payload.items.len());
    for record in &payload.items {
        let Some(category) = categories.get(record.category_index.get()) else {
            tracing::warn!(
                "Skipping item {:?}: no category at index {}",
                record.name,
                record.category_index.get()
            );
            continue;
        };
        items.push(writer.insert_item(category.id, record).await?);
    }

    Ok(CreatedMenu {
        menu,
        categories,
        items,
    })
}

/// Transactional menu storage
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Id of the fallback restaurant, created on first use
    async fn demo_restaurant(&self) -> Result<Uuid>;

    /// Run [`write_menu`] inside one transaction
    async fn persist_menu(&self, restaurant_id: Uuid, payload: &MenuPayload)
        -> Result<CreatedMenu>;

    /// Run [`rewrite_menu`] inside one transaction
    async fn replace_menu(&self, menu_id: Uuid, payload: &MenuPayload) -> Result<CreatedMenu>;
}

/// Normalise a draft and store it under its restaurant (or the demo one).
///
/// Normalisation runs before the store is touched, so an invalid draft never
/// opens a transaction.
pub async fn create_menu<S>(store: &S, draft: &MenuDraft) -> Result<CreatedMenu>
where
    S: MenuStore + ?Sized,
{
    let payload = draft.normalize()?;

    let restaurant_id = match payload.menu.restaurant_id {
        Some(id) => id,
        None => store.demo_restaurant().await?,
    };

    let created = store.persist_menu(restaurant_id, &payload).await?;
    tracing::info!(
        "Created menu {} with {} categories and {} items",
        created.menu.id,
        created.categories.len(),
        created.items.len()
    );
    Ok(created)
}

/// Normalise a draft and replace the contents of an existing menu with it
pub async fn replace_menu_from_draft<S>(
    store: &S,
    menu_id: Uuid,
    draft: &MenuDraft,
) -> Result<CreatedMenu>
where
    S: MenuStore + ?Sized,
{
    let payload = draft.normalize()?;
    let replaced = store.replace_menu(menu_id, &payload).await?;
    tracing::info!(
        "Replaced menu {} with {} categories and {} items",
        menu_id,
        replaced.categories.len(),
        replaced.items.len()
    );
    Ok(replaced)
}
