//! Product Index Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use emporium_app::domain::{
    pagination::PageRequest,
    products::models::{ProductFilter, ProductSort},
};

use crate::{
    extensions::*,
    products::{errors::into_status_error, models::ProductsPageResponse},
    state::State,
};

/// Catalog search query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductSearchQuery {
    pub query: Option<String>,
    pub category: Option<Uuid>,
    pub exporter: Option<Uuid>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn parse_sort(sort: Option<&str>) -> Result<ProductSort, StatusError> {
    match sort {
        None | Some("" | "newest") => Ok(ProductSort::Newest),
        Some("price_asc") => Ok(ProductSort::PriceAsc),
        Some("price_desc") => Ok(ProductSort::PriceDesc),
        Some(_) => Err(StatusError::bad_request()
            .brief("sort must be one of newest, price_asc, price_desc")),
    }
}

impl ProductSearchQuery {
    fn into_filter(self) -> Result<(ProductFilter, PageRequest), StatusError> {
        let sort = parse_sort(self.sort.as_deref())?;

        let filter = ProductFilter {
            query: self.query,
            category: self.category.map(Into::into),
            exporter: self.exporter.map(Into::into),
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock.unwrap_or(false),
            sort,
        };

        Ok((filter, PageRequest::new(self.page, self.limit)))
    }
}

/// Product Index Handler
///
/// Searches the public catalog.
#[endpoint(
    tags("products"),
    summary = "Search Products",
    responses(
        (status_code = StatusCode::OK, description = "Matching products"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ProductsPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let (filter, page) = req
        .parse_queries::<ProductSearchQuery>()
        .or_400("Invalid search parameters")?
        .into_filter()?;

    let products = state
        .app
        .products
        .search_products(filter, page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(products.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::{
        pagination::Page,
        products::{ProductsServiceError, models::ProductUuid},
    };

    use crate::test_helpers::{Mocks, TEST_EXPORTER_UUID, make_product, public_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        public_service(mocks, Router::with_path("products").get(handler))
    }

    #[tokio::test]
    async fn test_search_with_no_query_lists_first_page() -> TestResult {
        let mut mocks = Mocks::default();
        let uuid = ProductUuid::new();

        mocks
            .products
            .expect_search_products()
            .once()
            .withf(|filter, page| *filter == ProductFilter::default() && *page == PageRequest::default())
            .return_once(move |_, page| Ok(Page::new(vec![make_product(uuid)], page, 1)));

        let mut res = TestClient::get("http://example.com/products")
            .send(&make_service(mocks))
            .await;

        let body: ProductsPageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.total_products, 1);
        assert_eq!(body.total_pages, 1);
        assert_eq!(
            body.products.first().map(|product| product.uuid),
            Some(uuid.into_uuid())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_search_forwards_filters() -> TestResult {
        let mut mocks = Mocks::default();
        let exporter = TEST_EXPORTER_UUID;

        mocks
            .products
            .expect_search_products()
            .once()
            .withf(move |filter, page| {
                filter.query.as_deref() == Some("scarf")
                    && filter.exporter == Some(exporter)
                    && filter.min_price == Some(100)
                    && filter.max_price == Some(5_000)
                    && filter.in_stock
                    && filter.sort == ProductSort::PriceDesc
                    && page.page() == 2
                    && page.limit() == 5
            })
            .return_once(|_, page| Ok(Page::new(Vec::new(), page, 0)));

        let res = TestClient::get(format!(
            "http://example.com/products?query=scarf&exporter={exporter}&minPrice=100&maxPrice=5000&inStock=true&sort=price_desc&page=2&limit=5"
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_sort_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.products.expect_search_products().never();

        let res = TestClient::get("http://example.com/products?sort=random")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_storage_error_returns_500() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_search_products()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/products")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
