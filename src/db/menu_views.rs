use uuid::Uuid;

use super::Database;
use crate::error::Result;
use crate::models::{MenuViewContext, MenuViewStats, PeriodStarts};

impl Database {
    pub async fn record_menu_view(&self, restaurant_id: Uuid, context: &MenuViewContext) -> Result<()> {
        sqlx::query(
            "INSERT INTO menu_views (restaurant_id, ip_address, user_agent, referer) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(restaurant_id)
        .bind(&context.ip_address)
        .bind(&context.user_agent)
        .bind(&context.referer)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn menu_view_stats(
        &self,
        restaurant_id: Uuid,
        periods: PeriodStarts,
    ) -> Result<MenuViewStats> {
        let stats = sqlx::query_as::<_, MenuViewStats>(
            "SELECT COUNT(*) AS total_views, \
                    COUNT(*) FILTER (WHERE viewed_at >= $2) AS views_today, \
                    COUNT(*) FILTER (WHERE viewed_at >= $3) AS views_this_week, \
                    COUNT(*) FILTER (WHERE viewed_at >= $4) AS views_this_month \
             FROM menu_views WHERE restaurant_id = $1",
        )
        .bind(restaurant_id)
        .bind(periods.today)
        .bind(periods.week)
        .bind(periods.month)
        .fetch_one(self.pool())
        .await?;

        Ok(stats)
    }
}
