use std::env;

use crate::constants::DEFAULT_MENU_DOMAIN_BASE;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Postgres URL; `None` leaves the database client uninitialised
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Public base URL used to build menu links, without trailing slash
    pub menu_domain_base: String,
    /// HS256 secret used by the identity provider to sign session tokens
    pub auth_jwt_secret: Option<String>,
    /// Treat every request as the local development user
    pub auth_disabled: bool,
    pub stripe_webhook_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url = non_blank_var("DATABASE_URL");
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "Invalid DATABASE_MAX_CONNECTIONS")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let menu_domain_base = ["MENU_DOMAIN_BASE", "SITE_URL", "APP_URL"]
            .into_iter()
            .find_map(non_blank_var)
            .unwrap_or_else(|| DEFAULT_MENU_DOMAIN_BASE.to_string());

        let auth_disabled = env::var("AUTH_DISABLED")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        let auth_jwt_secret = non_blank_var("AUTH_JWT_SECRET");
        if auth_jwt_secret.is_none() && !auth_disabled {
            return Err("AUTH_JWT_SECRET must be set unless AUTH_DISABLED is enabled".to_string());
        }

        let stripe_webhook_secret = non_blank_var("STRIPE_WEBHOOK_SECRET");

        Ok(Config {
            server_host,
            server_port,
            database_url,
            database_max_connections,
            allowed_origins,
            environment,
            menu_domain_base: normalize_base_url(&menu_domain_base),
            auth_jwt_secret,
            auth_disabled,
            stripe_webhook_secret,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim whitespace and trailing slashes from a base URL
pub fn normalize_base_url(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}
