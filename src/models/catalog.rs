use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::constants::MAX_NAME_CHARS;
use crate::error::{FieldErrors, Result};
use crate::menus::normalize_currency;

const NAME_REQUIRED: &str = "String must contain at least 1 character(s)";
const NON_NEGATIVE: &str = "Number must be greater than or equal to 0";

/// `PATCH /api/menus/:id` body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

impl MenuPatch {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_optional_name(&mut errors, self.name.as_deref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub menu_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub position: i32,
}

impl NewCategory {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);
        if self.position < 0 {
            errors.add("position", NON_NEGATIVE);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Appended after the category's last item when absent
    #[serde(default)]
    pub position: Option<i32>,
}

impl NewItem {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);
        if self.price_cents < 0 {
            errors.add("priceCents", NON_NEGATIVE);
        }
        if self.position.is_some_and(|p| p < 0) {
            errors.add("position", NON_NEGATIVE);
        }
        errors.into_result()
    }

    pub fn currency_code(&self) -> String {
        normalize_currency(self.currency.as_deref())
    }
}

/// `PATCH /api/items/:id` body; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    /// `Some(None)` clears the image
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub allergens: Option<Vec<String>>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub position: Option<i32>,
}

impl ItemPatch {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_optional_name(&mut errors, self.name.as_deref());
        if self.price_cents.is_some_and(|p| p < 0) {
            errors.add("priceCents", NON_NEGATIVE);
        }
        if self.position.is_some_and(|p| p < 0) {
            errors.add("position", NON_NEGATIVE);
        }
        errors.into_result()
    }
}

fn check_name(errors: &mut FieldErrors, name: &str) {
    if name.is_empty() {
        errors.add("name", NAME_REQUIRED);
    }
    errors.check_max_chars("name", name, MAX_NAME_CHARS);
}

fn check_optional_name(errors: &mut FieldErrors, name: Option<&str>) {
    if let Some(name) = name {
        check_name(errors, name);
    }
}

/// Tell an explicit `null` apart from a missing field
fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
