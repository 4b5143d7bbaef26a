//! Analytics Repository

use jiff::{Timestamp, civil::Date};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        analytics::models::{
            DailyRevenue, LOW_STOCK_THRESHOLD, OrderStats, ProductStats, StockChange, TopProduct,
        },
        products::models::ProductUuid,
        users::models::UserUuid,
    },
};

const PRODUCT_STATS_SQL: &str = include_str!("sql/product_stats.sql");
const WISHLISTED_PRODUCTS_SQL: &str = include_str!("sql/wishlisted_products.sql");
const ORDER_STATS_SQL: &str = include_str!("sql/order_stats.sql");
const TOP_PRODUCTS_SQL: &str = include_str!("sql/top_products.sql");
const RECENT_STOCK_CHANGES_SQL: &str = include_str!("sql/recent_stock_changes.sql");
const DAILY_REVENUE_SQL: &str = include_str!("sql/daily_revenue.sql");

/// Order window `[from, until]`. A missing `from` is unbounded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub(crate) from: Option<Timestamp>,
    pub(crate) until: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAnalyticsRepository;

impl PgAnalyticsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn product_stats(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
    ) -> Result<ProductStats, sqlx::Error> {
        query_as::<Postgres, ProductStats>(PRODUCT_STATS_SQL)
            .bind(exporter.into_uuid())
            .bind(to_i64(LOW_STOCK_THRESHOLD, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Distinct products of `exporter` that appear in any wishlist.
    pub(crate) async fn wishlisted_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(WISHLISTED_PRODUCTS_SQL)
            .bind(exporter.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub(crate) async fn order_stats(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        window: Window,
    ) -> Result<OrderStats, sqlx::Error> {
        query_as::<Postgres, OrderStats>(ORDER_STATS_SQL)
            .bind(exporter.into_uuid())
            .bind(window.from.map(SqlxTimestamp::from))
            .bind(SqlxTimestamp::from(window.until))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn top_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        window: Window,
    ) -> Result<Vec<TopProduct>, sqlx::Error> {
        query_as::<Postgres, TopProduct>(TOP_PRODUCTS_SQL)
            .bind(exporter.into_uuid())
            .bind(window.from.map(SqlxTimestamp::from))
            .bind(SqlxTimestamp::from(window.until))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn recent_stock_changes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
    ) -> Result<Vec<StockChange>, sqlx::Error> {
        query_as::<Postgres, StockChange>(RECENT_STOCK_CHANGES_SQL)
            .bind(exporter.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn daily_revenue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        window: Window,
    ) -> Result<Vec<DailyRevenue>, sqlx::Error> {
        query_as::<Postgres, DailyRevenue>(DAILY_REVENUE_SQL)
            .bind(exporter.into_uuid())
            .bind(window.from.map(SqlxTimestamp::from))
            .bind(SqlxTimestamp::from(window.until))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductStats {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            total_products: try_get_u64(row, "total_products")?,
            total_stock: try_get_u64(row, "total_stock")?,
            average_price: try_get_u64(row, "average_price")?,
            low_stock_products: try_get_u64(row, "low_stock_products")?,
            out_of_stock_products: try_get_u64(row, "out_of_stock_products")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderStats {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            total_orders: try_get_u64(row, "total_orders")?,
            approved_orders: try_get_u64(row, "approved_orders")?,
            total_revenue: try_get_u64(row, "total_revenue")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TopProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            title: row.try_get("title")?,
            total_orders: try_get_u64(row, "total_orders")?,
            total_quantity: try_get_u64(row, "total_quantity")?,
            total_revenue: try_get_u64(row, "total_revenue")?,
            last_order_date: row.try_get::<SqlxTimestamp, _>("last_order_date")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StockChange {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: ProductUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            stock: try_get_u64(row, "stock")?,
            price: try_get_u64(row, "price")?,
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for DailyRevenue {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let day: String = row.try_get("day")?;

        Ok(Self {
            date: day
                .parse::<Date>()
                .map_err(|source| sqlx::Error::ColumnDecode {
                    index: "day".to_string(),
                    source: Box::new(source),
                })?,
            revenue: try_get_u64(row, "revenue")?,
        })
    }
}
