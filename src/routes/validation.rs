use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query,
    },
    http::HeaderMap,
};
use uuid::Uuid;

use crate::error::{AppError, FieldErrors, Result};
use crate::models::MenuViewContext;

/// Unwrap a JSON body, reporting malformed input as a form-level error
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            Err(AppError::InvalidFields(FieldErrors::form(rejection.body_text())))
        }
    }
}

pub fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!("Rejected query string: {}", rejection.body_text());
            Err(AppError::InvalidFields(FieldErrors::form(rejection.body_text())))
        }
    }
}

pub fn path_id(path: std::result::Result<Path<Uuid>, PathRejection>) -> Result<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("Invalid id".to_string()))
}

/// Client address: first `x-forwarded-for` hop, else `x-real-ip`
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn view_context(headers: &HeaderMap) -> MenuViewContext {
    MenuViewContext {
        ip_address: client_ip(headers),
        user_agent: header_value(headers, "user-agent"),
        referer: header_value(headers, "referer"),
    }
}
