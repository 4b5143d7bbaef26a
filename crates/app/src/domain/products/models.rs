//! Product Models

use jiff::Timestamp;

use crate::{domain::users::models::UserUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product category marker.
#[derive(Debug)]
pub struct Category;

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub uuid: ProductUuid,
    pub exporter: UserUuid,
    pub category: CategoryUuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub price: u64,
    pub stock: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub category: CategoryUuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub price: u64,
    pub stock: u64,
}

/// Product Update Model
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub category: CategoryUuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub price: u64,
    pub stock: u64,
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

/// Catalog search filter. Empty filters match every product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub query: Option<String>,
    pub category: Option<CategoryUuid>,
    pub exporter: Option<UserUuid>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub in_stock: bool,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Filter listing one exporter's products, newest first.
    #[must_use]
    pub fn for_exporter(exporter: UserUuid) -> Self {
        Self {
            exporter: Some(exporter),
            ..Self::default()
        }
    }

    /// `ILIKE` pattern for the free-text query, with wildcards in the input escaped.
    pub(crate) fn query_pattern(&self) -> Option<String> {
        let query = self.query.as_deref().map(str::trim)?;

        if query.is_empty() {
            return None;
        }

        let mut pattern = String::with_capacity(query.len() + 2);

        pattern.push('%');

        for ch in query.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }

            pattern.push(ch);
        }

        pattern.push('%');

        Some(pattern)
    }
}

/// The catalog facts needed to price and attribute a cart or order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineProduct {
    pub exporter: UserUuid,
    pub title: String,
}
