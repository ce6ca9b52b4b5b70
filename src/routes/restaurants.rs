use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::validation::json_body;
use super::{data, Data};
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Restaurant, RestaurantSummary};
use crate::restaurants::{
    self, CreateRestaurant, DesignUpdate, RestaurantStore, SlugAvailability,
};
use crate::AppState;

/// Onboard the caller's restaurant
///
/// Returns 409 when the caller already owns one or the requested slug is taken.
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<CreateRestaurant>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<RestaurantSummary>>)> {
    let input = json_body(payload)?;
    input.validate()?;
    let db = state.db()?;

    let summary =
        restaurants::create_restaurant(db, &user.id, &input, &state.config.menu_domain_base)
            .await
            .map_err(|e| e.or_internal("Unable to create restaurant"))?;

    Ok((StatusCode::CREATED, data(summary)))
}

/// The caller's restaurant, or `null` before onboarding
pub async fn get_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Data<Option<RestaurantSummary>>>> {
    let db = state.db()?;

    let summary = db
        .find_by_owner(&user.id)
        .await?
        .map(|r| RestaurantSummary::new(r, &state.config.menu_domain_base))
        .transpose()?;
    Ok(data(summary))
}

#[derive(Debug, Deserialize)]
pub struct CheckSlugRequest {
    pub slug: String,
}

/// Whether a requested URL segment is still free for the caller's restaurant
pub async fn check_slug(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: std::result::Result<Json<CheckSlugRequest>, JsonRejection>,
) -> Result<Json<SlugAvailability>> {
    let request = json_body(payload)?;
    let db = state.db()?;

    let availability = restaurants::check_slug(db, &request.slug).await?;
    Ok(Json(availability))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    pub restaurant_id: Uuid,
    #[serde(flatten)]
    pub design: DesignUpdate,
}

/// Save the look-and-feel chosen during onboarding
pub async fn update_design(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<DesignRequest>, JsonRejection>,
) -> Result<Json<Data<Restaurant>>> {
    let request = json_body(payload)?;
    let db = state.db()?;

    let restaurant =
        restaurants::update_restaurant_design(db, &user.id, request.restaurant_id, &request.design)
            .await?;

    Ok(data(restaurant))
}
