//! Slugs and public menu URLs derived from restaurant names.

use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::constants::{
    ERR_RESTAURANT_NAME_NOT_ALPHANUMERIC, ERR_RESTAURANT_NAME_REQUIRED, ERR_SLUG_REQUIRED,
    MAX_SLUG_BASE_CHARS,
};
use crate::error::AppError;

/// Why a display name could not be turned into a slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("{}", ERR_RESTAURANT_NAME_REQUIRED)]
    Empty,
    #[error("{}", ERR_RESTAURANT_NAME_NOT_ALPHANUMERIC)]
    NoAlphanumeric,
}

impl From<SlugError> for AppError {
    fn from(err: SlugError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Slug plus the public URL of the menu page it addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuDomain {
    pub slug: String,
    pub url: String,
}

/// Convert a free-text name into a lowercase ASCII slug.
///
/// Accents are removed by NFD decomposition, apostrophes are dropped and
/// every other run of characters outside `[a-z0-9]` becomes a single hyphen.
/// The result never starts or ends with a hyphen and is at most
/// [`MAX_SLUG_BASE_CHARS`] long.
pub fn build_slug(input: &str) -> Result<String, SlugError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SlugError::Empty);
    }

    let mut slug = slugify(trimmed);
    if slug.is_empty() {
        return Err(SlugError::NoAlphanumeric);
    }

    // ASCII only, so byte truncation is safe
    if slug.len() > MAX_SLUG_BASE_CHARS {
        slug.truncate(MAX_SLUG_BASE_CHARS);
        slug.truncate(slug.trim_end_matches('-').len());
    }

    Ok(slug)
}

fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    let chars = input
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| !is_apostrophe(*c));

    for ch in chars {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Combining Diacritical Marks block (U+0300..U+036F)
fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}')
}

/// Build the slug and public URL for a restaurant display name
pub fn build_menu_domain(base: &str, name: &str) -> Result<MenuDomain, SlugError> {
    let slug = build_slug(name)?;
    let url = join_menu_url(base, &slug);
    Ok(MenuDomain { slug, url })
}

/// Public URL for an existing slug; surrounding whitespace and slashes are ignored
pub fn menu_url_from_slug(base: &str, slug: &str) -> Result<String, AppError> {
    let normalized = slug.trim().trim_matches('/');
    if normalized.is_empty() {
        return Err(AppError::Validation(ERR_SLUG_REQUIRED.to_string()));
    }
    Ok(join_menu_url(base, normalized))
}

fn join_menu_url(base: &str, slug: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), slug)
}
