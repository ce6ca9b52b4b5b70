pub mod analytics;
pub mod catalog;
pub mod health;
pub mod menus;
pub mod restaurants;
pub mod validation;
pub mod webhooks;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;

pub use health::health_check;

use crate::AppState;

/// Success envelope: `{ "data": ... }`
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T>(value: T) -> Json<Data<T>> {
    Json(Data { data: value })
}

/// All HTTP routes, without transport layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/restaurants",
            post(restaurants::create_restaurant).get(restaurants::get_restaurant),
        )
        .route("/api/restaurants/check-slug", post(restaurants::check_slug))
        .route("/api/restaurants/design", patch(restaurants::update_design))
        .route("/api/menus", get(menus::list_menus).post(menus::create_menu))
        .route(
            "/api/menus/:id",
            get(menus::get_menu)
                .patch(menus::patch_menu)
                .put(menus::replace_menu)
                .delete(menus::delete_menu),
        )
        .route(
            "/api/public/restaurants/:slug",
            get(menus::public_restaurant),
        )
        .route(
            "/api/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/items",
            get(catalog::list_items).post(catalog::create_item),
        )
        .route(
            "/api/items/:id",
            patch(catalog::patch_item).delete(catalog::delete_item),
        )
        .route("/api/webhooks/stripe", post(webhooks::stripe_webhook))
        .route("/api/analytics/menu-view", post(analytics::record_menu_view))
        .route("/api/analytics/menu-views", get(analytics::menu_view_stats))
        .with_state(state)
}
