use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::validation::{json_body, path_id, query_params};
use super::{data, Data};
use crate::error::{AppError, Result};
use crate::models::{Category, Item, ItemPatch, NewCategory, NewItem};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    #[serde(default)]
    pub menu_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Data<Vec<Category>>>> {
    let query = query_params(query)?;
    let db = state.db()?;

    Ok(data(db.list_categories(query.menu_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Category>>)> {
    let input = json_body(payload)?;
    input.validate()?;
    let db = state.db()?;

    let category = db.create_category(&input).await?;
    Ok((StatusCode::CREATED, data(category)))
}

pub async fn list_items(
    State(state): State<AppState>,
    query: std::result::Result<Query<ItemQuery>, QueryRejection>,
) -> Result<Json<Data<Vec<Item>>>> {
    let query = query_params(query)?;
    let db = state.db()?;

    Ok(data(db.list_items(query.category_id).await?))
}

pub async fn create_item(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewItem>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Item>>)> {
    let input = json_body(payload)?;
    input.validate()?;
    let db = state.db()?;

    let item = db.create_item(&input).await?;
    Ok((StatusCode::CREATED, data(item)))
}

pub async fn patch_item(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<ItemPatch>, JsonRejection>,
) -> Result<Json<Data<Item>>> {
    let id = path_id(id)?;
    let patch = json_body(payload)?;
    patch.validate()?;
    let db = state.db()?;

    let item = db
        .update_item(id, &patch)
        .await?
        .ok_or(AppError::NotFound("Item not found"))?;
    Ok(data(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Data<Item>>> {
    let id = path_id(id)?;
    let db = state.db()?;

    let item = db
        .delete_item(id)
        .await?
        .ok_or(AppError::NotFound("Item not found"))?;
    Ok(data(item))
}
