use super::{is_foreign_key_violation, Database};
use crate::billing::SubscriptionChange;
use crate::error::Result;
use crate::models::{Subscription, SubscriptionStatus};

impl Database {
    /// Write a webhook-derived change; returns the number of rows touched
    pub async fn apply_subscription_change(&self, change: &SubscriptionChange) -> Result<u64> {
        match change {
            SubscriptionChange::Activate {
                restaurant_id,
                customer_id,
                plan,
            } => {
                let result = sqlx::query_as::<_, Subscription>(
                    "INSERT INTO subscriptions (restaurant_id, stripe_customer_id, plan, status) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (restaurant_id) DO UPDATE SET \
                        stripe_customer_id = EXCLUDED.stripe_customer_id, \
                        plan = EXCLUDED.plan, \
                        status = EXCLUDED.status, \
                        updated_at = now() \
                     RETURNING id, restaurant_id, stripe_customer_id, plan, status, \
                               current_period_end, created_at, updated_at",
                )
                .bind(restaurant_id)
                .bind(customer_id)
                .bind(plan)
                .bind(SubscriptionStatus::Active)
                .fetch_one(self.pool())
                .await;

                match result {
                    Ok(subscription) => {
                        tracing::info!(
                            "Subscription {} active for restaurant {} ({})",
                            subscription.id,
                            subscription.restaurant_id,
                            subscription.plan
                        );
                        Ok(1)
                    }
                    // Retrying cannot fix a checkout for a deleted restaurant
                    Err(e) if is_foreign_key_violation(&e) => {
                        tracing::warn!("Checkout for unknown restaurant {}", restaurant_id);
                        Ok(0)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            SubscriptionChange::Sync {
                customer_id,
                status,
                current_period_end,
                plan,
            } => {
                let result = sqlx::query(
                    "UPDATE subscriptions SET status = $2, current_period_end = $3, plan = $4, \
                     updated_at = now() WHERE stripe_customer_id = $1",
                )
                .bind(customer_id)
                .bind(status)
                .bind(current_period_end)
                .bind(plan)
                .execute(self.pool())
                .await?;

                Ok(result.rows_affected())
            }
            SubscriptionChange::Cancel { customer_id } => {
                let result = sqlx::query(
                    "UPDATE subscriptions SET status = $2, updated_at = now() \
                     WHERE stripe_customer_id = $1",
                )
                .bind(customer_id)
                .bind(SubscriptionStatus::Canceled)
                .execute(self.pool())
                .await?;

                Ok(result.rows_affected())
            }
        }
    }
}
