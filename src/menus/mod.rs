pub mod draft;
pub mod persistence;

pub use draft::{
    normalize_currency, to_price_cents, CategoryDraft, CategoryIndex, CategoryRecord, DishDraft,
    ItemRecord, MenuDraft, MenuPayload, MenuRecord,
};
pub use persistence::{
    create_menu, replace_menu_from_draft, rewrite_menu, write_menu, CreatedMenu, MenuStore,
    MenuWriter,
};
