pub mod catalog;
pub mod menu;
pub mod menu_view;
pub mod restaurant;
pub mod subscription;

pub use catalog::{ItemPatch, MenuPatch, NewCategory, NewItem};
pub use menu::{
    assemble_menu_details, Category, CategoryDetail, DishDetail, Item, Menu, MenuDetail,
    MenuOwner, MenuSummary,
};
pub use menu_view::{MenuViewContext, MenuViewStats, PeriodStarts};
pub use restaurant::{NewRestaurant, Restaurant, RestaurantSize, RestaurantSummary};
pub use subscription::{Subscription, SubscriptionStatus};
