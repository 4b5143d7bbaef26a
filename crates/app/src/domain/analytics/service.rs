//! Analytics service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        analytics::{
            errors::AnalyticsServiceError,
            models::{ExporterAnalytics, TimeRange, WishlistStats},
            repository::{PgAnalyticsRepository, Window},
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgAnalyticsService {
    db: Db,
    repository: PgAnalyticsRepository,
}

impl PgAnalyticsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAnalyticsRepository::new(),
        }
    }
}

#[async_trait]
impl AnalyticsService for PgAnalyticsService {
    async fn exporter_analytics(
        &self,
        exporter: UserUuid,
        time_range: TimeRange,
        now: Timestamp,
    ) -> Result<ExporterAnalytics, AnalyticsServiceError> {
        let window = Window {
            from: time_range.window_start(now),
            until: now,
        };

        let mut tx = self.db.begin().await?;

        let product_stats = self.repository.product_stats(&mut tx, exporter).await?;
        let wishlisted = self
            .repository
            .wishlisted_products(&mut tx, exporter)
            .await?;
        let order_stats = self
            .repository
            .order_stats(&mut tx, exporter, window)
            .await?;
        let top_products = self
            .repository
            .top_products(&mut tx, exporter, window)
            .await?;
        let recent_stock_changes = self
            .repository
            .recent_stock_changes(&mut tx, exporter)
            .await?;
        let daily_revenue = self
            .repository
            .daily_revenue(&mut tx, exporter, window)
            .await?;

        tx.commit().await?;

        Ok(ExporterAnalytics {
            time_range,
            wishlist_stats: WishlistStats::new(wishlisted, product_stats.total_products),
            product_stats,
            order_stats,
            top_products,
            recent_stock_changes,
            daily_revenue,
            last_updated: now,
        })
    }
}

#[automock]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Dashboard figures for `exporter`. Order based figures cover `time_range`
    /// ending at `now`; product figures always cover the whole catalog.
    async fn exporter_analytics(
        &self,
        exporter: UserUuid,
        time_range: TimeRange,
        now: Timestamp,
    ) -> Result<ExporterAnalytics, AnalyticsServiceError>;
}
