use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{json_body, path_id, query_params};
use super::{data, Data};
use crate::auth::AuthUser;
use crate::constants::ERR_RESTAURANT_NOT_FOUND;
use crate::error::{AppError, Result};
use crate::menus::{self, CreatedMenu, MenuDraft};
use crate::models::{Menu, MenuDetail, MenuPatch, MenuSummary, RestaurantSummary};
use crate::restaurants::RestaurantStore;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuListQuery {
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,
}

/// List menus, newest first
pub async fn list_menus(
    State(state): State<AppState>,
    query: std::result::Result<Query<MenuListQuery>, QueryRejection>,
) -> Result<Json<Data<Vec<MenuSummary>>>> {
    let query = query_params(query)?;
    let db = state.db()?;

    let menus = db.list_menus(query.restaurant_id).await?;
    Ok(data(menus))
}

/// Create a menu with its categories and dishes
///
/// The draft is validated and normalised before any database work; the
/// menu, categories and items are then written in one transaction.
pub async fn create_menu(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MenuDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<CreatedMenu>>)> {
    let draft = json_body(payload)?;
    draft.validate()?;
    let db = state.db()?;

    let created = menus::create_menu(db, &draft)
        .await
        .map_err(|e| e.or_internal("Unable to create menu"))?;

    Ok((StatusCode::CREATED, data(created)))
}

pub async fn get_menu(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Data<MenuDetail>>> {
    let id = path_id(id)?;
    let db = state.db()?;

    let menu = db
        .menu_detail(id)
        .await?
        .ok_or(AppError::NotFound("Menu not found"))?;
    Ok(data(menu))
}

/// Rename a menu or toggle its default flag
pub async fn patch_menu(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<MenuPatch>, JsonRejection>,
) -> Result<Json<Data<Menu>>> {
    let id = path_id(id)?;
    let patch = json_body(payload)?;
    patch.validate()?;
    let db = state.db()?;

    let menu = db
        .patch_menu(id, &patch)
        .await?
        .ok_or(AppError::NotFound("Menu not found"))?;
    Ok(data(menu))
}

/// Replace a menu's contents; only the restaurant owner may do this
pub async fn replace_menu(
    State(state): State<AppState>,
    user: AuthUser,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<MenuDraft>, JsonRejection>,
) -> Result<Json<Data<CreatedMenu>>> {
    let id = path_id(id)?;
    let mut draft = json_body(payload)?;
    draft.validate()?;
    let db = state.db()?;

    let owner = db
        .menu_owner(id)
        .await
        .map_err(|e| e.or_internal("Unable to update menu"))?
        .ok_or(AppError::NotFound("Menu not found"))?;

    if owner.owner_user_id != user.id {
        tracing::warn!("User {} tried to replace menu {} they do not own", user.id, id);
        return Err(AppError::Forbidden("Unauthorized"));
    }

    draft.restaurant_id = Some(owner.restaurant_id);
    let replaced = menus::replace_menu_from_draft(db, id, &draft)
        .await
        .map_err(|e| e.or_internal("Unable to update menu"))?;

    Ok(data(replaced))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Data<Menu>>> {
    let id = path_id(id)?;
    let db = state.db()?;

    let deleted = db
        .delete_menu(id)
        .await
        .map_err(|e| e.or_internal("Unable to delete menu"))?
        .ok_or(AppError::NotFound("Menu not found"))?;

    tracing::info!("Deleted menu {}", deleted.id);
    Ok(data(deleted))
}

#[derive(Debug, Serialize)]
pub struct PublicRestaurant {
    pub restaurant: RestaurantSummary,
    pub menus: Vec<MenuDetail>,
}

/// Public menu page data for a restaurant slug
pub async fn public_restaurant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Data<PublicRestaurant>>> {
    let db = state.db()?;

    let restaurant = db
        .find_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound(ERR_RESTAURANT_NOT_FOUND))?;
    let menus = db.restaurant_menu_details(restaurant.id).await?;

    Ok(data(PublicRestaurant {
        restaurant: RestaurantSummary::new(restaurant, &state.config.menu_domain_base)?,
        menus,
    }))
}
