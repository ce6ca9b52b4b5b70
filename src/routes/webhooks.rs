use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::billing::{subscription_change, StripeEvent};
use crate::constants::WEBHOOK_TOLERANCE_SECS;
use crate::error::{AppError, Result};
use crate::security::verify_webhook_signature;
use crate::AppState;

/// Payment provider webhook
///
/// Must receive the raw body so the signature can be checked before parsing.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let secret = state.config.stripe_webhook_secret.as_deref();

    let (Some(signature), Some(secret)) = (signature, secret) else {
        tracing::warn!("Webhook without signature or with no secret configured");
        return Err(AppError::Validation(
            "Missing Stripe signature or webhook secret".to_string(),
        ));
    };

    let payload = std::str::from_utf8(&body)
        .map_err(|_| AppError::Validation("Invalid payload".to_string()))?;

    let now = chrono::Utc::now().timestamp();
    if let Err(e) = verify_webhook_signature(payload, signature, secret, now, WEBHOOK_TOLERANCE_SECS)
    {
        tracing::warn!("Webhook signature verification failed: {}", e);
        return Err(AppError::Validation("Invalid signature".to_string()));
    }

    let event: StripeEvent = serde_json::from_str(payload).map_err(|e| {
        tracing::warn!("Failed to parse webhook JSON: {}", e);
        AppError::Validation("Invalid payload".to_string())
    })?;
    tracing::info!("Received webhook {} ({})", event.id, event.event_type);

    let change = subscription_change(&event).map_err(|e| {
        tracing::warn!("Unexpected {} payload: {}", event.event_type, e);
        AppError::Validation("Invalid payload".to_string())
    })?;

    if let Some(change) = change {
        let db = state.db()?;
        let rows = db
            .apply_subscription_change(&change)
            .await
            .map_err(|e| e.or_internal("Webhook handler failed"))?;
        tracing::debug!("Webhook {} touched {} subscription rows", event.id, rows);
    }

    Ok(Json(json!({ "received": true })))
}
