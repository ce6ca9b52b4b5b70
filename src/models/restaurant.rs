use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::restaurants::menu_url_from_slug;

/// Restaurant row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    /// Opaque user id issued by the identity provider
    pub owner_user_id: String,
    pub name: String,
    /// Globally unique URL segment
    pub slug: String,
    pub logo_url: Option<String>,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub size: Option<String>,
    pub design_url: Option<String>,
    pub design_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a restaurant insert; optional fields are already trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRestaurant {
    pub owner_user_id: String,
    pub name: String,
    pub slug: String,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub size: Option<RestaurantSize>,
    pub design_url: Option<String>,
    pub design_description: Option<String>,
}

/// Seating capacity bucket chosen during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestaurantSize {
    Small,
    Medium,
    Large,
    Maxi,
}

impl RestaurantSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestaurantSize::Small => "small",
            RestaurantSize::Medium => "medium",
            RestaurantSize::Large => "large",
            RestaurantSize::Maxi => "maxi",
        }
    }
}

/// Restaurant as returned by the API, with its public menu URL
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub size: Option<String>,
    pub design_url: Option<String>,
    pub design_description: Option<String>,
    pub domain: String,
}

impl RestaurantSummary {
    /// Fails only for a row with a blank slug
    pub fn new(restaurant: Restaurant, domain_base: &str) -> Result<Self> {
        let domain = menu_url_from_slug(domain_base, &restaurant.slug)?;
        Ok(Self {
            id: restaurant.id,
            name: restaurant.name,
            slug: restaurant.slug,
            cuisine: restaurant.cuisine,
            address: restaurant.address,
            logo_url: restaurant.logo_url,
            size: restaurant.size,
            design_url: restaurant.design_url,
            design_description: restaurant.design_description,
            domain,
        })
    }
}
