//! Session tokens issued by the identity provider.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::constants::{LOCAL_DEV_USER_ID, TOKEN_AUDIENCE};
use crate::error::AppError;
use crate::AppState;

/// Claims the identity provider puts in its access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Opaque identity provider user id
    pub id: String,
}

/// Verify an HS256 token and return its claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_required_spec_claims(&["sub", "exp", "aud"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("Expired session token"),
                _ => tracing::warn!("Rejected session token: {}", e),
            }
            AppError::Unauthorized
        })
}

/// `Authorization: Bearer <token>` value, if present and well-formed
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.config.auth_disabled {
            return Ok(AuthUser {
                id: LOCAL_DEV_USER_ID.to_string(),
            });
        }

        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let secret = state
            .config
            .auth_jwt_secret
            .as_deref()
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_token(token, secret)?;
        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser { id: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    const SECRET: &str = "test-jwt-secret";

    fn token(sub: &str, aud: &str, exp_offset: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            aud: aud.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            email: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_token_accepts_valid_token() {
        let claims = verify_token(&token("user-42", "authenticated", 3600, SECRET), SECRET).unwrap();
        assert_eq!(claims.sub, "user-42");
    }

    #[test]
    fn test_verify_token_rejects_wrong_secret() {
        let result = verify_token(&token("user-42", "authenticated", 3600, "other"), SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_token_rejects_wrong_audience() {
        let result = verify_token(&token("user-42", "anon", 3600, SECRET), SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_token_rejects_expired() {
        let result = verify_token(&token("user-42", "authenticated", -3600, SECRET), SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let (parts, _) = Request::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));

        let (parts, _) = Request::builder()
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), None);

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
