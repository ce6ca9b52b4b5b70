/// Fallback public base URL for menu links
pub const DEFAULT_MENU_DOMAIN_BASE: &str = "https://menoo.app";

/// Currency applied to dishes that do not name one
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Spellings of the euro accepted from clients and stored as `EUR`
pub const EURO_VARIANTS: [&str; 3] = ["€", "EUR", "eur"];

/// Placeholder for dishes submitted with a blank name
pub const DEFAULT_DISH_NAME: &str = "Dish";

/// How many times restaurant creation re-allocates an auto-generated slug
/// after losing an insert race to a concurrent writer
pub const MAX_SLUG_ATTEMPTS: usize = 3;

/// Fallback restaurant that receives menus submitted without a restaurant id
pub const DEMO_RESTAURANT_SLUG: &str = "demo";
pub const DEMO_RESTAURANT_NAME: &str = "Demo Restaurant";
pub const DEMO_RESTAURANT_OWNER: &str = "demo-owner";

/// Slugs never handed to a real restaurant
pub const RESERVED_SLUGS: [&str; 1] = [DEMO_RESTAURANT_SLUG];

/// Generated and requested slugs are cut to this length so that a `-<n>`
/// collision suffix still fits the 120 character column
pub const MAX_SLUG_BASE_CHARS: usize = 100;

/// Column limits for display names and short labels
pub const MAX_NAME_CHARS: usize = 120;
pub const MAX_CUISINE_CHARS: usize = 80;
pub const MAX_PLAN_CHARS: usize = 60;

/// Audience claim carried by identity provider session tokens
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// User id returned by the auth extractor when authentication is disabled
pub const LOCAL_DEV_USER_ID: &str = "local-dev-user";

/// Maximum age of a webhook signature timestamp in seconds (5 minutes)
/// Prevents replay attacks
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Plan recorded when a checkout session carries no plan metadata
pub const DEFAULT_PLAN: &str = "pro";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_MENU_NAME_REQUIRED: &str = "Menu name is required";

pub const ERR_RESTAURANT_NAME_REQUIRED: &str =
    "Restaurant name is required to create a menu domain";

pub const ERR_RESTAURANT_NAME_NOT_ALPHANUMERIC: &str =
    "Restaurant name must include alphanumeric characters";

pub const ERR_SLUG_NOT_ALPHANUMERIC: &str = "Slug must contain alphanumeric characters";

pub const ERR_SLUG_REQUIRED: &str = "Restaurant slug is required to build a menu URL";

pub const ERR_SLUG_MISSING: &str = "Slug is required";

pub const ERR_RESTAURANT_NOT_FOUND: &str = "Restaurant not found";

pub const ERR_NOT_RESTAURANT_OWNER: &str = "You do not have access to this restaurant";

pub const ERR_RESTAURANT_EXISTS: &str = "Restaurant already configured for this account";

pub const ERR_SLUG_TAKEN: &str = "This URL is already taken. Please choose a different one.";

pub const ERR_SLUG_EXHAUSTED: &str =
    "Unable to reserve a unique URL for this restaurant. Please try again.";
