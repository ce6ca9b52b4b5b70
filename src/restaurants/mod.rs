pub mod domain;
pub mod service;

pub use domain::{build_menu_domain, build_slug, menu_url_from_slug, MenuDomain, SlugError};
pub use service::{
    allocate_slug, check_slug, create_restaurant, next_free_slug, normalize_optional_field,
    update_restaurant_design, CreateRestaurant, DesignUpdate, RestaurantStore, SlugAvailability,
};
