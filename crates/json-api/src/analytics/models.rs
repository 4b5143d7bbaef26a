//! Analytics response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::analytics::models::{
    DailyRevenue, ExporterAnalytics, OrderStats, ProductStats, StockChange, TopProduct,
    WishlistStats,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductStatsResponse {
    pub total_products: u64,
    pub total_stock: u64,
    pub average_price: u64,

    /// In stock but below the low stock threshold
    pub low_stock_products: u64,

    pub out_of_stock_products: u64,
}

impl From<ProductStats> for ProductStatsResponse {
    fn from(stats: ProductStats) -> Self {
        Self {
            total_products: stats.total_products,
            total_stock: stats.total_stock,
            average_price: stats.average_price,
            low_stock_products: stats.low_stock_products,
            out_of_stock_products: stats.out_of_stock_products,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistStatsResponse {
    pub unique_wishlisted: u64,
    pub wishlist_percentage: u64,

    /// `wishlisted/total`
    pub wishlist_fraction: String,
}

impl From<WishlistStats> for WishlistStatsResponse {
    fn from(stats: WishlistStats) -> Self {
        Self {
            unique_wishlisted: stats.unique_wishlisted,
            wishlist_percentage: stats.wishlist_percentage,
            wishlist_fraction: stats.wishlist_fraction,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderStatsResponse {
    pub total_orders: u64,
    pub approved_orders: u64,
    pub total_revenue: u64,
}

impl From<OrderStats> for OrderStatsResponse {
    fn from(stats: OrderStats) -> Self {
        Self {
            total_orders: stats.total_orders,
            approved_orders: stats.approved_orders,
            total_revenue: stats.total_revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TopProductResponse {
    pub product_id: Uuid,
    pub title: String,
    pub total_orders: u64,
    pub total_quantity: u64,
    pub total_revenue: u64,
    pub last_order_date: String,
}

impl From<TopProduct> for TopProductResponse {
    fn from(top: TopProduct) -> Self {
        Self {
            product_id: top.product.into(),
            title: top.title,
            total_orders: top.total_orders,
            total_quantity: top.total_quantity,
            total_revenue: top.total_revenue,
            last_order_date: top.last_order_date.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StockChangeResponse {
    pub product_id: Uuid,
    pub title: String,
    pub stock: u64,
    pub price: u64,
    pub updated_at: String,
}

impl From<StockChange> for StockChangeResponse {
    fn from(change: StockChange) -> Self {
        Self {
            product_id: change.product.into(),
            title: change.title,
            stock: change.stock,
            price: change.price,
            updated_at: change.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DailyRevenueResponse {
    /// `YYYY-MM-DD`, UTC
    pub date: String,

    pub revenue: u64,
}

impl From<DailyRevenue> for DailyRevenueResponse {
    fn from(day: DailyRevenue) -> Self {
        Self {
            date: day.date.to_string(),
            revenue: day.revenue,
        }
    }
}

/// Exporter dashboard figures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsResponse {
    /// `7days`, `30days` or `all`
    pub time_range: String,

    pub product_stats: ProductStatsResponse,
    pub wishlist_stats: WishlistStatsResponse,
    pub order_stats: OrderStatsResponse,
    pub top_products: Vec<TopProductResponse>,
    pub recent_stock_changes: Vec<StockChangeResponse>,
    pub daily_revenue: Vec<DailyRevenueResponse>,
    pub last_updated: String,
}

impl From<ExporterAnalytics> for AnalyticsResponse {
    fn from(analytics: ExporterAnalytics) -> Self {
        Self {
            time_range: analytics.time_range.as_str().to_string(),
            product_stats: analytics.product_stats.into(),
            wishlist_stats: analytics.wishlist_stats.into(),
            order_stats: analytics.order_stats.into(),
            top_products: analytics.top_products.into_iter().map(Into::into).collect(),
            recent_stock_changes: analytics
                .recent_stock_changes
                .into_iter()
                .map(Into::into)
                .collect(),
            daily_revenue: analytics.daily_revenue.into_iter().map(Into::into).collect(),
            last_updated: analytics.last_updated.to_string(),
        }
    }
}
