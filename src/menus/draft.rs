//! Client-submitted menu drafts and their normalisation into a flat,
//! database-ready payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_DISH_NAME, ERR_MENU_NAME_REQUIRED, EURO_VARIANTS, MAX_NAME_CHARS,
};
use crate::error::{AppError, FieldErrors, Result};

/// Menu as submitted by the editor: categories and dishes in display order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDraft {
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub categories: Vec<CategoryDraft>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    /// Client-side key; never persisted
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dishes: Vec<DishDraft>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishDraft {
    /// Client-side key; never persisted
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in major currency units
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub allergens: Option<Vec<String>>,
}

/// Position of an item's category inside [`MenuPayload::categories`].
///
/// Stands in for the category id until the category row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CategoryIndex(usize);

impl CategoryIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// Flattened, validated form of a [`MenuDraft`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPayload {
    pub menu: MenuRecord,
    pub categories: Vec<CategoryRecord>,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRecord {
    pub name: String,
    pub restaurant_id: Option<Uuid>,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub name: String,
    pub description: String,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub category_index: CategoryIndex,
    /// Submission order within the category
    pub position: i32,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub currency: String,
    pub thumbnail: Option<String>,
    pub is_visible: bool,
    pub labels: Vec<String>,
    pub allergens: Vec<String>,
}

impl MenuDraft {
    /// Request-level checks reported per field.
    ///
    /// Names must be non-empty strings of at most [`MAX_NAME_CHARS`]
    /// characters and prices finite and non-negative.
    /// Whitespace-only category and dish names pass here and are replaced by
    /// placeholders during [`MenuDraft::normalize`].
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();

        check_name(&mut errors, "name".to_string(), &self.name);

        for (c, category) in self.categories.iter().enumerate() {
            check_name(&mut errors, format!("categories.{c}.name"), &category.name);
            for (d, dish) in category.dishes.iter().enumerate() {
                check_name(&mut errors, format!("categories.{c}.dishes.{d}.name"), &dish.name);
                if !dish.price.is_finite() || dish.price < 0.0 {
                    errors.add(
                        format!("categories.{c}.dishes.{d}.price"),
                        "Number must be greater than or equal to 0",
                    );
                }
            }
        }

        errors.into_result()
    }

    /// Convert the draft into a persistence payload.
    ///
    /// Categories get `position` equal to their submission index and every
    /// item records the index of its category and its own position within
    /// it. Any invalid price or over-long name aborts the
    /// whole conversion.
    pub fn normalize(&self) -> Result<MenuPayload> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(ERR_MENU_NAME_REQUIRED.to_string()));
        }
        ensure_fits("Menu name", name)?;

        let mut categories = Vec::with_capacity(self.categories.len());
        let mut items = Vec::new();

        for (index, category) in self.categories.iter().enumerate() {
            ensure_fits("Category name", &category.name)?;
            let position = i32::try_from(index)
                .map_err(|_| AppError::Validation("Too many categories".to_string()))?;

            categories.push(CategoryRecord {
                name: non_blank(&category.name)
                    .unwrap_or_else(|| format!("Category {}", index + 1)),
                description: trimmed_or_empty(category.description.as_deref()),
                position,
            });

            for (dish_index, dish) in category.dishes.iter().enumerate() {
                ensure_fits("Dish name", &dish.name)?;
                let position = i32::try_from(dish_index)
                    .map_err(|_| AppError::Validation("Too many dishes".to_string()))?;
                items.push(normalize_dish(CategoryIndex::new(index), position, dish)?);
            }
        }

        Ok(MenuPayload {
            menu: MenuRecord {
                name: name.to_string(),
                restaurant_id: self.restaurant_id,
                is_default: self.is_default.unwrap_or(false),
            },
            categories,
            items,
        })
    }
}

fn normalize_dish(
    category_index: CategoryIndex,
    position: i32,
    dish: &DishDraft,
) -> Result<ItemRecord> {
    Ok(ItemRecord {
        category_index,
        position,
        name: non_blank(&dish.name).unwrap_or_else(|| DEFAULT_DISH_NAME.to_string()),
        description: trimmed_or_empty(dish.description.as_deref()),
        price_cents: to_price_cents(dish.price)?,
        currency: normalize_currency(dish.currency.as_deref()),
        thumbnail: dish.thumbnail.as_deref().and_then(non_blank),
        is_visible: dish.is_visible.unwrap_or(true),
        labels: clean_tags(dish.labels.as_deref()),
        allergens: clean_tags(dish.allergens.as_deref()),
    })
}

/// Convert a major-unit price into integer minor units (`round(price * 100)`).
///
/// Negative, non-finite and unrepresentably large prices are rejected.
pub fn to_price_cents(price: f64) -> Result<i64> {
    let invalid = || AppError::Validation(format!("Invalid dish price: {}", price));

    if !price.is_finite() || price < 0.0 {
        return Err(invalid());
    }

    let cents = (price * 100.0).round();
    // i64::MAX is not exactly representable; its f64 neighbour is 2^63
    if cents >= i64::MAX as f64 {
        return Err(invalid());
    }

    Ok(cents as i64)
}

/// Uppercase three-letter code; absent or blank means EUR
pub fn normalize_currency(currency: Option<&str>) -> String {
    let Some(raw) = currency else {
        return DEFAULT_CURRENCY.to_string();
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || EURO_VARIANTS.contains(&trimmed) {
        return DEFAULT_CURRENCY.to_string();
    }

    trimmed.to_uppercase().chars().take(3).collect()
}

fn check_name(errors: &mut FieldErrors, field: String, name: &str) {
    if name.is_empty() {
        errors.add(field.clone(), "String must contain at least 1 character(s)");
    }
    errors.check_max_chars(field, name, MAX_NAME_CHARS);
}

fn ensure_fits(what: &str, value: &str) -> Result<()> {
    if value.trim().chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "{what} must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn trimmed_or_empty(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn clean_tags(tags: Option<&[String]>) -> Vec<String> {
    tags.unwrap_or_default()
        .iter()
        .filter_map(|tag| non_blank(tag))
        .collect()
}
