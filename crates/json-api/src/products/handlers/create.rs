//! Create Product Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};
use tracing::info;

use emporium_app::domain::products::models::ProductUuid;

use crate::{
    extensions::*,
    products::{
        errors::into_status_error,
        models::{ProductRequest, ProductResponse},
    },
    state::State,
};

/// Create Product Handler
#[endpoint(
    tags("products"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;

    let product = state
        .app
        .products
        .create_product(exporter, json.into_inner().into_new_product(ProductUuid::new()))
        .await
        .map_err(into_status_error)?;

    info!(product_uuid = %product.uuid, exporter_uuid = %exporter, "created product");

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::products::ProductsServiceError;

    use crate::test_helpers::{
        Mocks, TEST_EXPORTER_UUID, buyer_service, exporter_service, make_product,
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("products").post(handler)
    }

    fn body() -> serde_json::Value {
        json!({
            "category": "00000000-0000-0000-0000-000000000007",
            "title": "Cotton Scarf",
            "description": "Hand woven",
            "price": 1500,
            "stock": 12,
        })
    }

    #[tokio::test]
    async fn test_create_product_returns_201_with_location() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_create_product()
            .once()
            .withf(|exporter, new| {
                *exporter == TEST_EXPORTER_UUID
                    && new.title == "Cotton Scarf"
                    && new.price == 1_500
                    && new.stock == 12
                    && new.image.is_none()
            })
            .return_once(|_, new| Ok(make_product(new.uuid)));

        let mut res = TestClient::post("http://example.com/products")
            .json(&body())
            .send(&exporter_service(mocks, route()))
            .await;

        let body: ProductResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/products/{}", body.uuid).as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_price_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_create_product()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::InvalidPrice));

        let res = TestClient::post("http://example.com/products")
            .json(&body())
            .send(&exporter_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_cannot_create_products() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.products.expect_create_product().never();

        let res = TestClient::post("http://example.com/products")
            .json(&body())
            .send(&buyer_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
