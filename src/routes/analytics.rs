use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::validation::{query_params, view_context};
use super::{data, Data};
use crate::auth::AuthUser;
use crate::constants::{ERR_NOT_RESTAURANT_OWNER, ERR_RESTAURANT_NOT_FOUND, ERR_SLUG_MISSING};
use crate::error::{AppError, Result};
use crate::models::{MenuViewStats, PeriodStarts};
use crate::restaurants::RestaurantStore;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MenuViewRequest {
    #[serde(default)]
    pub slug: Option<String>,
}

/// Record a public menu page view
///
/// Storing the view is best effort; a failed insert is logged only.
pub async fn record_menu_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<MenuViewRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let slug = payload
        .ok()
        .and_then(|Json(body)| body.slug)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation(ERR_SLUG_MISSING.to_string()))?;
    let db = state.db()?;

    let restaurant = db
        .find_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound(ERR_RESTAURANT_NOT_FOUND))?;

    let context = view_context(&headers);
    if let Err(e) = db.record_menu_view(restaurant.id, &context).await {
        tracing::error!("Failed to record menu view for {}: {:?}", restaurant.id, e);
    }

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub restaurant_id: Uuid,
}

/// View totals for a restaurant owned by the caller
pub async fn menu_view_stats(
    State(state): State<AppState>,
    user: AuthUser,
    query: std::result::Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Data<MenuViewStats>>> {
    let query = query_params(query)?;
    let db = state.db()?;

    let restaurant = db
        .find_by_id(query.restaurant_id)
        .await?
        .ok_or(AppError::NotFound(ERR_RESTAURANT_NOT_FOUND))?;
    if restaurant.owner_user_id != user.id {
        return Err(AppError::Forbidden(ERR_NOT_RESTAURANT_OWNER));
    }

    let stats = db
        .menu_view_stats(restaurant.id, PeriodStarts::at(Utc::now()))
        .await?;
    Ok(data(stats))
}
