//! Restaurant onboarding: slug allocation and creation.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{build_menu_domain, build_slug, SlugError};
use crate::constants::{
    ERR_NOT_RESTAURANT_OWNER, ERR_RESTAURANT_EXISTS, ERR_RESTAURANT_NOT_FOUND, ERR_SLUG_EXHAUSTED,
    ERR_SLUG_MISSING, ERR_SLUG_NOT_ALPHANUMERIC, ERR_SLUG_TAKEN, MAX_CUISINE_CHARS,
    MAX_NAME_CHARS, MAX_SLUG_ATTEMPTS, RESERVED_SLUGS,
};
use crate::error::{AppError, FieldErrors, Result};
use crate::models::{NewRestaurant, Restaurant, RestaurantSize, RestaurantSummary};

/// Restaurant persistence used by the onboarding flow
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Option<Restaurant>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Restaurant>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>>;

    /// Every stored slug starting with `prefix`
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Insert a restaurant.
    ///
    /// Must fail with [`AppError::SlugTaken`] when the slug is already stored.
    async fn insert(&self, restaurant: &NewRestaurant) -> Result<Restaurant>;

    /// `None` when no restaurant has this id
    async fn update_design(&self, id: Uuid, design: &DesignUpdate) -> Result<Option<Restaurant>>;

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.find_by_slug(slug).await?.is_some())
    }
}

/// Onboarding request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurant {
    pub name: String,
    /// Requested URL segment; generated from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub size: Option<RestaurantSize>,
    #[serde(default)]
    pub design_url: Option<String>,
    #[serde(default)]
    pub design_description: Option<String>,
}

impl CreateRestaurant {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.name.is_empty() {
            errors.add("name", "Restaurant name is required");
        }
        errors.check_max_chars("name", &self.name, MAX_NAME_CHARS);
        if let Some(cuisine) = self.cuisine.as_deref() {
            errors.check_max_chars("cuisine", cuisine, MAX_CUISINE_CHARS);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignUpdate {
    pub design_url: Option<String>,
    pub design_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugAvailability {
    pub available: bool,
    pub slug: String,
}

/// First of `base`, `base-2`, `base-3`, ... not present in `taken`
pub fn next_free_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    (2_usize..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Slugs owned by the system, such as the demo restaurant's
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Pick a slug that is free at the time of the lookup.
///
/// Fetches the prefix matches once and resolves collisions in memory.
/// Reserved slugs count as taken. The answer can go stale before the
/// insert; callers rely on the unique constraint and
/// [`AppError::SlugTaken`] for that window.
pub async fn allocate_slug<S>(store: &S, base: &str) -> Result<String>
where
    S: RestaurantStore + ?Sized,
{
    let mut taken: HashSet<String> = store.slugs_with_prefix(base).await?.into_iter().collect();
    taken.extend(RESERVED_SLUGS.iter().map(|s| s.to_string()));
    Ok(next_free_slug(base, &taken))
}

/// Normalise a user-chosen slug
pub fn normalize_requested_slug(raw: &str) -> Result<String> {
    build_slug(raw).map_err(|err| match err {
        SlugError::Empty => AppError::Validation(ERR_SLUG_MISSING.to_string()),
        SlugError::NoAlphanumeric => AppError::Validation(ERR_SLUG_NOT_ALPHANUMERIC.to_string()),
    })
}

pub async fn check_slug<S>(store: &S, raw: &str) -> Result<SlugAvailability>
where
    S: RestaurantStore + ?Sized,
{
    let slug = normalize_requested_slug(raw)?;
    let available = !is_reserved_slug(&slug) && !store.slug_exists(&slug).await?;
    Ok(SlugAvailability { available, slug })
}

/// Create the caller's restaurant.
///
/// An explicit slug must be free. A generated one is re-allocated when a
/// concurrent insert takes it first, up to [`MAX_SLUG_ATTEMPTS`] times.
pub async fn create_restaurant<S>(
    store: &S,
    owner_user_id: &str,
    input: &CreateRestaurant,
    domain_base: &str,
) -> Result<RestaurantSummary>
where
    S: RestaurantStore + ?Sized,
{
    input.validate()?;
    let name = input.name.trim();
    let generated = build_menu_domain(domain_base, name)?;

    let requested = match input.slug.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(normalize_requested_slug(raw)?),
        _ => None,
    };

    if store.find_by_owner(owner_user_id).await?.is_some() {
        return Err(AppError::Conflict(ERR_RESTAURANT_EXISTS.to_string()));
    }

    let mut new_restaurant = NewRestaurant {
        owner_user_id: owner_user_id.to_string(),
        name: name.to_string(),
        slug: String::new(),
        cuisine: normalize_optional_field(input.cuisine.as_deref()),
        address: normalize_optional_field(input.address.as_deref()),
        size: input.size,
        design_url: normalize_optional_field(input.design_url.as_deref()),
        design_description: normalize_optional_field(input.design_description.as_deref()),
    };

    if let Some(slug) = requested {
        if is_reserved_slug(&slug) || store.slug_exists(&slug).await? {
            return Err(AppError::Conflict(ERR_SLUG_TAKEN.to_string()));
        }
        new_restaurant.slug = slug;
        let created = store.insert(&new_restaurant).await?;
        tracing::info!("Created restaurant {} ({})", created.id, created.slug);
        return RestaurantSummary::new(created, domain_base);
    }

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        new_restaurant.slug = allocate_slug(store, &generated.slug).await?;

        match store.insert(&new_restaurant).await {
            Ok(created) => {
                tracing::info!("Created restaurant {} ({})", created.id, created.slug);
                return RestaurantSummary::new(created, domain_base);
            }
            Err(AppError::SlugTaken) => {
                tracing::warn!(
                    "Slug {} taken concurrently (attempt {}/{})",
                    new_restaurant.slug,
                    attempt,
                    MAX_SLUG_ATTEMPTS
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::Conflict(ERR_SLUG_EXHAUSTED.to_string()))
}

/// Store design preferences on a restaurant owned by the caller
pub async fn update_restaurant_design<S>(
    store: &S,
    owner_user_id: &str,
    restaurant_id: Uuid,
    update: &DesignUpdate,
) -> Result<Restaurant>
where
    S: RestaurantStore + ?Sized,
{
    let restaurant = store
        .find_by_id(restaurant_id)
        .await?
        .ok_or(AppError::NotFound(ERR_RESTAURANT_NOT_FOUND))?;

    if restaurant.owner_user_id != owner_user_id {
        return Err(AppError::Forbidden(ERR_NOT_RESTAURANT_OWNER));
    }

    let normalized = DesignUpdate {
        design_url: normalize_optional_field(update.design_url.as_deref()),
        design_description: normalize_optional_field(update.design_description.as_deref()),
    };

    store
        .update_design(restaurant_id, &normalized)
        .await?
        .ok_or(AppError::NotFound(ERR_RESTAURANT_NOT_FOUND))
}

/// Trimmed value, or `None` when absent or blank
pub fn normalize_optional_field(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::constants::MAX_SLUG_BASE_CHARS;

    const BASE: &str = "https://menus.menoo.app";

    /// In-memory store; `steal_inserts` makes that many inserts lose a race
    /// against a phantom writer that grabs the same slug first
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Restaurant>>,
        steal_inserts: AtomicUsize,
        inserts: AtomicUsize,
    }

    impl MemoryStore {
        fn with_slugs(slugs: &[&str]) -> Self {
            let store = Self::default();
            for (i, slug) in slugs.iter().enumerate() {
                store.rows.lock().unwrap().push(row(&format!("owner-{i}"), slug));
            }
            store
        }
    }

    fn row(owner: &str, slug: &str) -> Restaurant {
        Restaurant {
            id: Uuid::new_v4(),
            owner_user_id: owner.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
            logo_url: None,
            cuisine: None,
            address: None,
            size: None,
            design_url: None,
            design_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl RestaurantStore for MemoryStore {
        async fn find_by_owner(&self, owner_user_id: &str) -> Result<Option<Restaurant>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.owner_user_id == owner_user_id).cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Restaurant>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.slug == slug).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.id == id).cloned())
        }

        async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.slug.starts_with(prefix))
                .map(|r| r.slug.clone())
                .collect())
        }

        async fn insert(&self, restaurant: &NewRestaurant) -> Result<Restaurant> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();

            let steal = self.steal_inserts.load(Ordering::SeqCst);
            if steal > 0 {
                self.steal_inserts.store(steal - 1, Ordering::SeqCst);
                rows.push(row("phantom", &restaurant.slug));
                return Err(AppError::SlugTaken);
            }

            if rows.iter().any(|r| r.slug == restaurant.slug) {
                return Err(AppError::SlugTaken);
            }

            let mut created = row(&restaurant.owner_user_id, &restaurant.slug);
            created.name = restaurant.name.clone();
            created.cuisine = restaurant.cuisine.clone();
            created.address = restaurant.address.clone();
            created.size = restaurant.size.map(|s| s.as_str().to_string());
            created.design_url = restaurant.design_url.clone();
            created.design_description = restaurant.design_description.clone();
            rows.push(created.clone());
            Ok(created)
        }

        async fn update_design(
            &self,
            id: Uuid,
            design: &DesignUpdate,
        ) -> Result<Option<Restaurant>> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
                r.design_url = design.design_url.clone();
                r.design_description = design.design_description.clone();
                r.clone()
            }))
        }
    }

    fn request(name: &str) -> CreateRestaurant {
        CreateRestaurant {
            name: name.to_string(),
            slug: None,
            cuisine: None,
            address: None,
            size: None,
            design_url: None,
            design_description: None,
        }
    }

    #[test]
    fn test_next_free_slug() {
        let taken: HashSet<String> = ["acme", "acme-2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_free_slug("acme", &taken), "acme-3");
        assert_eq!(next_free_slug("other", &taken), "other");

        let gap: HashSet<String> = ["pizza", "pizza-3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_free_slug("pizza", &gap), "pizza-2");
    }

    #[tokio::test]
    async fn test_allocate_slug_appends_suffix() {
        let store = MemoryStore::with_slugs(&["acme", "acme-2"]);
        assert_eq!(allocate_slug(&store, "acme").await.unwrap(), "acme-3");
    }

    #[tokio::test]
    async fn test_allocate_slug_free_base() {
        let store = MemoryStore::with_slugs(&["acme-bistro"]);
        assert_eq!(allocate_slug(&store, "acme").await.unwrap(), "acme");
    }

    #[tokio::test]
    async fn test_create_restaurant_generates_slug_and_domain() {
        let store = MemoryStore::default();
        let mut input = request("  Restaurante El Niño ");
        input.cuisine = Some("  Tapas ".to_string());
        input.address = Some("   ".to_string());
        input.size = Some(RestaurantSize::Medium);

        let summary = create_restaurant(&store, "user-1", &input, BASE).await.unwrap();

        assert_eq!(summary.name, "Restaurante El Niño");
        assert_eq!(summary.slug, "restaurante-el-nino");
        assert_eq!(summary.domain, "https://menus.menoo.app/restaurante-el-nino");
        assert_eq!(summary.cuisine.as_deref(), Some("Tapas"));
        assert_eq!(summary.address, None);
        assert_eq!(summary.size.as_deref(), Some("medium"));
    }

    #[tokio::test]
    async fn test_create_restaurant_resolves_existing_collisions() {
        let store = MemoryStore::with_slugs(&["acme", "acme-2"]);
        let summary = create_restaurant(&store, "user-1", &request("ACME"), BASE)
            .await
            .unwrap();
        assert_eq!(summary.slug, "acme-3");
    }

    #[tokio::test]
    async fn test_create_restaurant_one_per_owner() {
        let store = MemoryStore::default();
        create_restaurant(&store, "user-1", &request("First"), BASE).await.unwrap();

        let err = create_restaurant(&store, "user-1", &request("Second"), BASE)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == ERR_RESTAURANT_EXISTS));
    }

    #[tokio::test]
    async fn test_create_restaurant_explicit_slug_taken() {
        let store = MemoryStore::with_slugs(&["chez-marie"]);
        let mut input = request("Chez Marie");
        input.slug = Some(" Chez Marie ".to_string());

        let err = create_restaurant(&store, "user-1", &input, BASE).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref msg) if msg == ERR_SLUG_TAKEN));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_restaurant_explicit_slug_is_normalised() {
        let store = MemoryStore::default();
        let mut input = request("Chez Marie");
        input.slug = Some("Marie's Place!".to_string());

        let summary = create_restaurant(&store, "user-1", &input, BASE).await.unwrap();
        assert_eq!(summary.slug, "maries-place");
    }

    #[tokio::test]
    async fn test_create_restaurant_rejects_symbol_slug() {
        let store = MemoryStore::default();
        let mut input = request("Chez Marie");
        input.slug = Some("!!!".to_string());

        let err = create_restaurant(&store, "user-1", &input, BASE).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == ERR_SLUG_NOT_ALPHANUMERIC));
    }

    #[tokio::test]
    async fn test_create_restaurant_rejects_blank_name() {
        let store = MemoryStore::default();
        let err = create_restaurant(&store, "user-1", &request("  "), BASE)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_restaurant_retries_after_losing_race() {
        let store = MemoryStore::default();
        store.steal_inserts.store(1, Ordering::SeqCst);

        let summary = create_restaurant(&store, "user-1", &request("Acme"), BASE)
            .await
            .unwrap();

        assert_eq!(summary.slug, "acme-2");
        assert_eq!(store.inserts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_restaurant_gives_up_after_max_attempts() {
        let store = MemoryStore::default();
        store.steal_inserts.store(MAX_SLUG_ATTEMPTS, Ordering::SeqCst);

        let err = create_restaurant(&store, "user-1", &request("Acme"), BASE)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref msg) if msg == ERR_SLUG_EXHAUSTED));
        assert_eq!(store.inserts.load(Ordering::SeqCst), MAX_SLUG_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_check_slug() {
        let store = MemoryStore::with_slugs(&["taken"]);

        let taken = check_slug(&store, "Taken").await.unwrap();
        assert_eq!(taken, SlugAvailability { available: false, slug: "taken".into() });

        let free = check_slug(&store, "Brand New").await.unwrap();
        assert_eq!(free, SlugAvailability { available: true, slug: "brand-new".into() });

        assert!(matches!(check_slug(&store, "  ").await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_allocate_slug_skips_reserved_demo_slug() {
        let store = MemoryStore::default();
        assert_eq!(allocate_slug(&store, "demo").await.unwrap(), "demo-2");
    }

    #[tokio::test]
    async fn test_create_restaurant_named_demo_gets_suffixed_slug() {
        let store = MemoryStore::default();
        let summary = create_restaurant(&store, "user-1", &request("Demo"), BASE)
            .await
            .unwrap();
        assert_eq!(summary.slug, "demo-2");
    }

    #[tokio::test]
    async fn test_create_restaurant_explicit_demo_slug_refused() {
        let store = MemoryStore::default();
        let mut input = request("Chez Marie");
        input.slug = Some("Demo".to_string());

        let err = create_restaurant(&store, "user-1", &input, BASE).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref msg) if msg == ERR_SLUG_TAKEN));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_check_slug_reports_demo_unavailable() {
        let store = MemoryStore::default();
        let demo = check_slug(&store, " demo ").await.unwrap();
        assert_eq!(demo, SlugAvailability { available: false, slug: "demo".into() });
    }

    #[tokio::test]
    async fn test_create_restaurant_name_length_limit() {
        let store = MemoryStore::default();

        let err = create_restaurant(&store, "user-1", &request(&"a".repeat(121)), BASE)
            .await
            .unwrap_err();
        match err {
            AppError::InvalidFields(errors) => assert!(errors.field_errors.contains_key("name")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);

        let summary = create_restaurant(&store, "user-1", &request(&"a".repeat(120)), BASE)
            .await
            .unwrap();
        assert_eq!(summary.name.len(), 120);
        assert!(summary.slug.len() <= MAX_SLUG_BASE_CHARS);
    }

    #[tokio::test]
    async fn test_long_slug_collision_suffix_fits_column() {
        let long_name = "b".repeat(119);
        let store = MemoryStore::default();
        let first = create_restaurant(&store, "user-1", &request(&long_name), BASE)
            .await
            .unwrap();
        let second = create_restaurant(&store, "user-2", &request(&long_name), BASE)
            .await
            .unwrap();

        assert_eq!(second.slug, format!("{}-2", first.slug));
        assert!(second.slug.len() <= MAX_NAME_CHARS);
    }

    #[tokio::test]
    async fn test_update_design_checks_ownership() {
        let store = MemoryStore::default();
        let created = create_restaurant(&store, "owner", &request("Bistro"), BASE)
            .await
            .unwrap();
        let update = DesignUpdate {
            design_url: Some(" https://example.com/look.png ".to_string()),
            design_description: Some("".to_string()),
        };

        let err = update_restaurant_design(&store, "intruder", created.id, &update)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = update_restaurant_design(&store, "owner", Uuid::new_v4(), &update)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let updated = update_restaurant_design(&store, "owner", created.id, &update)
            .await
            .unwrap();
        assert_eq!(updated.design_url.as_deref(), Some("https://example.com/look.png"));
        assert_eq!(updated.design_description, None);
    }

    #[test]
    fn test_normalize_optional_field() {
        assert_eq!(normalize_optional_field(None), None);
        assert_eq!(normalize_optional_field(Some("")), None);
        assert_eq!(normalize_optional_field(Some("  \t")), None);
        assert_eq!(normalize_optional_field(Some(" x ")), Some("x".to_string()));
    }
}
