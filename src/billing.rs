//! Payment provider events and the subscription changes they imply.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::{DEFAULT_PLAN, MAX_PLAN_CHARS};
use crate::models::SubscriptionStatus;

/// Webhook event envelope
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Reference that is either a bare id or an expanded object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable {
    Id(String),
    Object { id: String },
}

impl Expandable {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CheckoutSession {
    #[serde(default)]
    subscription: Option<Expandable>,
    #[serde(default)]
    customer: Option<Expandable>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderSubscription {
    customer: Expandable,
    #[serde(default)]
    status: String,
    #[serde(default)]
    current_period_end: Option<i64>,
    #[serde(default)]
    items: SubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SubscriptionItems {
    #[serde(default)]
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct SubscriptionItem {
    #[serde(default)]
    price: Option<Price>,
}

#[derive(Debug, Clone, Deserialize)]
struct Price {
    id: String,
    #[serde(default)]
    nickname: Option<String>,
}

/// Write to apply to the `subscriptions` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    /// Upsert keyed by restaurant after a completed checkout
    Activate {
        restaurant_id: Uuid,
        customer_id: String,
        plan: String,
    },
    /// Update every row of the customer
    Sync {
        customer_id: String,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
        plan: String,
    },
    Cancel {
        customer_id: String,
    },
}

/// Decide what an event changes.
///
/// `Ok(None)` means the event is acknowledged without a write: an irrelevant
/// type, or a checkout without subscription, customer or restaurant metadata.
pub fn subscription_change(
    event: &StripeEvent,
) -> Result<Option<SubscriptionChange>, serde_json::Error> {
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSession = serde_json::from_value(event.data.object.clone())?;
            Ok(checkout_change(session))
        }
        "customer.subscription.created" | "customer.subscription.updated" => {
            let subscription: ProviderSubscription =
                serde_json::from_value(event.data.object.clone())?;
            Ok(Some(SubscriptionChange::Sync {
                customer_id: subscription.customer.id().to_string(),
                status: SubscriptionStatus::from_provider(&subscription.status),
                current_period_end: subscription
                    .current_period_end
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
                plan: plan_name(&subscription.items),
            }))
        }
        "customer.subscription.deleted" => {
            let subscription: ProviderSubscription =
                serde_json::from_value(event.data.object.clone())?;
            Ok(Some(SubscriptionChange::Cancel {
                customer_id: subscription.customer.id().to_string(),
            }))
        }
        _ => Ok(None),
    }
}

fn checkout_change(session: CheckoutSession) -> Option<SubscriptionChange> {
    if session.subscription.is_none() {
        return None;
    }
    let customer_id = session.customer?.id().to_string();
    let metadata = session.metadata.unwrap_or_default();

    let raw_restaurant_id = metadata.get("restaurantId")?;
    let restaurant_id = match Uuid::parse_str(raw_restaurant_id) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(
                "Checkout metadata carries invalid restaurantId {:?}",
                raw_restaurant_id
            );
            return None;
        }
    };

    let plan = metadata
        .get("plan")
        .map(|p| fit_plan(p))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PLAN.to_string());

    Some(SubscriptionChange::Activate {
        restaurant_id,
        customer_id,
        plan,
    })
}

/// First item's price nickname, else its price id
fn plan_name(items: &SubscriptionItems) -> String {
    let price = items.data.first().and_then(|item| item.price.as_ref());
    price
        .and_then(|p| p.nickname.as_deref())
        .or_else(|| price.map(|p| p.id.as_str()))
        .map(fit_plan)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Provider labels are free text; keep them within the plan column
fn fit_plan(label: &str) -> String {
    label.trim().chars().take(MAX_PLAN_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        serde_json::from_value(json!({
            "id": "evt_123",
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[test]
    fn test_checkout_completed_activates() {
        let restaurant_id = Uuid::new_v4();
        let change = subscription_change(&event(
            "checkout.session.completed",
            json!({
                "subscription": "sub_1",
                "customer": "cus_1",
                "metadata": { "restaurantId": restaurant_id.to_string() }
            }),
        ))
        .unwrap();

        assert_eq!(
            change,
            Some(SubscriptionChange::Activate {
                restaurant_id,
                customer_id: "cus_1".to_string(),
                plan: "pro".to_string(),
            })
        );
    }

    #[test]
    fn test_checkout_completed_with_plan_and_expanded_customer() {
        let restaurant_id = Uuid::new_v4();
        let change = subscription_change(&event(
            "checkout.session.completed",
            json!({
                "subscription": { "id": "sub_1" },
                "customer": { "id": "cus_9", "email": "owner@example.com" },
                "metadata": { "restaurantId": restaurant_id.to_string(), "plan": "starter" }
            }),
        ))
        .unwrap();

        let Some(SubscriptionChange::Activate { customer_id, plan, .. }) = change else {
            panic!("expected activation");
        };
        assert_eq!(customer_id, "cus_9");
        assert_eq!(plan, "starter");
    }

    #[test]
    fn test_checkout_without_required_fields_is_ignored() {
        let id = Uuid::new_v4().to_string();
        let objects = [
            json!({ "customer": "cus_1", "metadata": { "restaurantId": id } }),
            json!({ "subscription": "sub_1", "metadata": { "restaurantId": id } }),
            json!({ "subscription": "sub_1", "customer": "cus_1" }),
            json!({ "subscription": "sub_1", "customer": "cus_1", "metadata": { "restaurantId": "nope" } }),
        ];
        for object in objects {
            let change = subscription_change(&event("checkout.session.completed", object)).unwrap();
            assert_eq!(change, None);
        }
    }

    #[test]
    fn test_subscription_updated_syncs() {
        let change = subscription_change(&event(
            "customer.subscription.updated",
            json!({
                "customer": "cus_1",
                "status": "past_due",
                "current_period_end": 1_700_000_000,
                "items": { "data": [{ "price": { "id": "price_1", "nickname": "Pro monthly" } }] }
            }),
        ))
        .unwrap();

        assert_eq!(
            change,
            Some(SubscriptionChange::Sync {
                customer_id: "cus_1".to_string(),
                status: SubscriptionStatus::PastDue,
                current_period_end: Utc.timestamp_opt(1_700_000_000, 0).single(),
                plan: "Pro monthly".to_string(),
            })
        );
    }

    #[test]
    fn test_subscription_plan_fallbacks() {
        let by_price_id = subscription_change(&event(
            "customer.subscription.created",
            json!({
                "customer": "cus_1",
                "status": "incomplete",
                "items": { "data": [{ "price": { "id": "price_42", "nickname": null } }] }
            }),
        ))
        .unwrap();
        let Some(SubscriptionChange::Sync { plan, status, current_period_end, .. }) = by_price_id else {
            panic!("expected sync");
        };
        assert_eq!(plan, "price_42");
        assert_eq!(status, SubscriptionStatus::Active);
        assert_eq!(current_period_end, None);

        let without_items = subscription_change(&event(
            "customer.subscription.created",
            json!({ "customer": "cus_1", "status": "trialing" }),
        ))
        .unwrap();
        let Some(SubscriptionChange::Sync { plan, .. }) = without_items else {
            panic!("expected sync");
        };
        assert_eq!(plan, "unknown");
    }

    #[test]
    fn test_long_plan_labels_are_cut_to_column_size() {
        let nickname = "N".repeat(90);
        let change = subscription_change(&event(
            "customer.subscription.updated",
            json!({
                "customer": "cus_1",
                "status": "active",
                "items": { "data": [{ "price": { "id": "price_1", "nickname": nickname } }] }
            }),
        ))
        .unwrap();
        let Some(SubscriptionChange::Sync { plan, .. }) = change else {
            panic!("expected sync");
        };
        assert_eq!(plan.chars().count(), MAX_PLAN_CHARS);

        let checkout = subscription_change(&event(
            "checkout.session.completed",
            json!({
                "subscription": "sub_1",
                "customer": "cus_1",
                "metadata": { "restaurantId": Uuid::new_v4().to_string(), "plan": "P".repeat(61) }
            }),
        ))
        .unwrap();
        let Some(SubscriptionChange::Activate { plan, .. }) = checkout else {
            panic!("expected activation");
        };
        assert_eq!(plan.len(), MAX_PLAN_CHARS);
    }

    #[test]
    fn test_subscription_deleted_cancels() {
        let change = subscription_change(&event(
            "customer.subscription.deleted",
            json!({ "customer": "cus_7", "status": "canceled" }),
        ))
        .unwrap();
        assert_eq!(
            change,
            Some(SubscriptionChange::Cancel {
                customer_id: "cus_7".to_string()
            })
        );
    }

    #[test]
    fn test_other_events_are_acknowledged_only() {
        let change = subscription_change(&event("invoice.paid", json!({ "id": "in_1" }))).unwrap();
        assert_eq!(change, None);
    }

    #[test]
    fn test_malformed_subscription_object() {
        let result = subscription_change(&event(
            "customer.subscription.updated",
            json!({ "status": "active" }),
        ));
        assert!(result.is_err());
    }
}
