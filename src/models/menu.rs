use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Menu row
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category row; `position` orders categories within a menu
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub description: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item (dish) row; prices are stored in minor currency units
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub currency: String,
    pub image_url: Option<String>,
    pub is_visible: bool,
    pub tags: Vec<String>,
    pub allergens: Vec<String>,
    /// Order within the category
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menu list entry with aggregate counts
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub items_count: i64,
    pub categories_count: i64,
}

/// Restaurant and owner a menu belongs to
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MenuOwner {
    pub restaurant_id: Uuid,
    pub owner_user_id: String,
}

/// Menu with its categories and dishes nested, prices in major units
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDetail {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<CategoryDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub position: i32,
    pub dishes: Vec<DishDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub thumbnail: Option<String>,
    pub is_visible: bool,
    pub labels: Vec<String>,
    pub allergens: Vec<String>,
}

impl From<Item> for DishDetail {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price_cents as f64 / 100.0,
            currency: item.currency,
            thumbnail: item.image_url,
            is_visible: item.is_visible,
            labels: item.tags,
            allergens: item.allergens,
        }
    }
}

/// Nest categories and items under their menus.
///
/// Menu order is kept as given. Categories must arrive sorted by position.
/// Dishes are ordered by position, ties keeping their input order; rows whose
/// parent is not in the input are dropped.
pub fn assemble_menu_details(
    menus: Vec<Menu>,
    categories: Vec<Category>,
    items: Vec<Item>,
) -> Vec<MenuDetail> {
    let mut items_by_category: HashMap<Uuid, Vec<Item>> = HashMap::new();
    for item in items {
        items_by_category.entry(item.category_id).or_default().push(item);
    }

    let mut categories_by_menu: HashMap<Uuid, Vec<CategoryDetail>> = HashMap::new();
    for category in categories {
        let mut rows = items_by_category.remove(&category.id).unwrap_or_default();
        rows.sort_by_key(|item| item.position);
        let dishes = rows.into_iter().map(DishDetail::from).collect();
        categories_by_menu
            .entry(category.menu_id)
            .or_default()
            .push(CategoryDetail {
                id: category.id,
                name: category.name,
                description: category.description,
                position: category.position,
                dishes,
            });
    }

    menus
        .into_iter()
        .map(|menu| MenuDetail {
            categories: categories_by_menu.remove(&menu.id).unwrap_or_default(),
            id: menu.id,
            name: menu.name,
            is_default: menu.is_default,
            created_at: menu.created_at,
        })
        .collect()
}
