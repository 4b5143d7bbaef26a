//! Analytics Models

use jiff::{Timestamp, ToSpan, civil::Date};

use crate::domain::products::models::ProductUuid;

/// Products with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: u64 = 10;

/// Reporting window for order based figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Last7Days,
    Last30Days,
    #[default]
    AllTime,
}

impl TimeRange {
    /// Parse a query value. Anything unrecognized means all time.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("7days") => Self::Last7Days,
            Some("30days") => Self::Last30Days,
            _ => Self::AllTime,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::AllTime => "all",
        }
    }

    /// Lower bound of the window ending at `now`. `None` is unbounded.
    #[must_use]
    pub fn window_start(self, now: Timestamp) -> Option<Timestamp> {
        let days: i64 = match self {
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::AllTime => return None,
        };

        now.checked_sub((days * 24).hours()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductStats {
    pub total_products: u64,
    pub total_stock: u64,
    pub average_price: u64,
    pub low_stock_products: u64,
    pub out_of_stock_products: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistStats {
    pub unique_wishlisted: u64,
    pub wishlist_percentage: u64,
    pub wishlist_fraction: String,
}

impl WishlistStats {
    /// Share of `total_products` that sit in at least one wishlist.
    ///
    /// The percentage is rounded half-up and is zero when there are no products.
    #[must_use]
    pub fn new(unique_wishlisted: u64, total_products: u64) -> Self {
        let wishlist_percentage = if total_products == 0 {
            0
        } else {
            let scaled = (u128::from(unique_wishlisted) * 100 + u128::from(total_products) / 2)
                / u128::from(total_products);

            u64::try_from(scaled).unwrap_or(u64::MAX)
        };

        Self {
            unique_wishlisted,
            wishlist_percentage,
            wishlist_fraction: format!("{unique_wishlisted}/{total_products}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderStats {
    pub total_orders: u64,
    pub approved_orders: u64,
    pub total_revenue: u64,
}

/// Best seller by approved quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub product: ProductUuid,
    pub title: String,
    pub total_orders: u64,
    pub total_quantity: u64,
    pub total_revenue: u64,
    pub last_order_date: Timestamp,
}

/// A recently edited or restocked product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product: ProductUuid,
    pub title: String,
    pub stock: u64,
    pub price: u64,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: Date,
    pub revenue: u64,
}

/// Everything the exporter dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterAnalytics {
    pub time_range: TimeRange,
    pub product_stats: ProductStats,
    pub wishlist_stats: WishlistStats,
    pub order_stats: OrderStats,
    pub top_products: Vec<TopProduct>,
    pub recent_stock_changes: Vec<StockChange>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub last_updated: Timestamp,
}
