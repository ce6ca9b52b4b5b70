use async_trait::async_trait;
use uuid::Uuid;

use super::{is_unique_violation, Database};
use crate::error::{AppError, Result};
use crate::models::{NewRestaurant, Restaurant};
use crate::restaurants::{DesignUpdate, RestaurantStore};

const RESTAURANT_COLUMNS: &str = "id, owner_user_id, name, slug, logo_url, cuisine, address, size, \
     design_url, design_description, created_at, updated_at";

#[async_trait]
impl RestaurantStore for Database {
    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Option<Restaurant>> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE owner_user_id = $1 \
             ORDER BY created_at LIMIT 1"
        ))
        .bind(owner_user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(restaurant)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Restaurant>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(None);
        }

        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;

        Ok(restaurant)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(restaurant)
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        // left() avoids LIKE wildcard escaping
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM restaurants WHERE left(slug, char_length($1)) = $1",
        )
        .bind(prefix)
        .fetch_all(self.pool())
        .await?;

        Ok(slugs)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM restaurants WHERE slug = $1)",
        )
        .bind(slug)
        .fetch_one(self.pool())
        .await?;

        Ok(exists)
    }

    async fn insert(&self, restaurant: &NewRestaurant) -> Result<Restaurant> {
        let result = sqlx::query_as::<_, Restaurant>(&format!(
            "INSERT INTO restaurants \
             (owner_user_id, name, slug, cuisine, address, size, design_url, design_description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {RESTAURANT_COLUMNS}"
        ))
        .bind(&restaurant.owner_user_id)
        .bind(&restaurant.name)
        .bind(&restaurant.slug)
        .bind(&restaurant.cuisine)
        .bind(&restaurant.address)
        .bind(restaurant.size.map(|s| s.as_str()))
        .bind(&restaurant.design_url)
        .bind(&restaurant.design_description)
        .fetch_one(self.pool())
        .await;

        match result {
            Ok(created) => Ok(created),
            // slug is the only unique column on restaurants
            Err(e) if is_unique_violation(&e) => Err(AppError::SlugTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_design(&self, id: Uuid, design: &DesignUpdate) -> Result<Option<Restaurant>> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "UPDATE restaurants SET design_url = $2, design_description = $3, updated_at = now() \
             WHERE id = $1 RETURNING {RESTAURANT_COLUMNS}"
        ))
        .bind(id)
        .bind(&design.design_url)
        .bind(&design.design_description)
        .fetch_optional(self.pool())
        .await?;

        Ok(restaurant)
    }
}
