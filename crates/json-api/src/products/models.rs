//! Product request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::{
    pagination::Page,
    products::models::{NewProduct, Product, ProductUpdate, ProductUuid},
};

/// A catalog product.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    pub uuid: Uuid,

    /// Selling exporter
    pub exporter: Uuid,

    pub category: Uuid,
    pub title: String,
    pub description: String,

    /// Image filename
    pub image: Option<String>,

    /// Unit price in minor currency units
    pub price: u64,

    pub stock: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            uuid: product.uuid.into(),
            exporter: product.exporter.into(),
            category: product.category.into(),
            title: product.title,
            description: product.description,
            image: product.image,
            price: product.price,
            stock: product.stock,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// One page of products.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductsPageResponse {
    pub products: Vec<ProductResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_products: u64,
}

impl From<Page<Product>> for ProductsPageResponse {
    fn from(page: Page<Product>) -> Self {
        Self {
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_products: page.total_items,
            products: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Editable product fields, used for both create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductRequest {
    pub category: Uuid,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image: Option<String>,

    pub price: u64,
    pub stock: u64,
}

impl ProductRequest {
    pub(crate) fn into_new_product(self, uuid: ProductUuid) -> NewProduct {
        NewProduct {
            uuid,
            category: self.category.into(),
            title: self.title,
            description: self.description,
            image: self.image,
            price: self.price,
            stock: self.stock,
        }
    }
}

impl From<ProductRequest> for ProductUpdate {
    fn from(request: ProductRequest) -> Self {
        Self {
            category: request.category.into(),
            title: request.title,
            description: request.description,
            image: request.image,
            price: request.price,
            stock: request.stock,
        }
    }
}
