//! App Router
//!
//! Siblings are matched in order, so literal segments are pushed before the
//! parameterised routes they would otherwise be captured by.

use salvo::Router;

use crate::{
    analytics, auth, carts, checkout, orders, products, promotions, users, wishlists,
};

/// Guest carts, addressed by the session id the browser holds.
fn guest_router() -> Router {
    Router::with_path("cart/guest")
        .push(Router::with_path("add").post(carts::add::guest_handler))
        .push(
            Router::with_path("{session_id}")
                .get(carts::get::guest_handler)
                .delete(carts::clear::guest_handler)
                .push(Router::with_path("update").put(carts::update::guest_handler))
                .push(Router::with_path("apply-promo").post(carts::apply_promo::guest_handler))
                .push(
                    Router::with_path("create-checkout-session")
                        .post(checkout::session::guest_handler),
                )
                .push(Router::with_path("{product_id}").delete(carts::remove::guest_handler)),
        )
}

fn cart_router() -> Router {
    Router::with_path("cart")
        .push(Router::with_path("add").post(carts::add::user_handler))
        .push(Router::with_path("count").get(carts::count::handler))
        .push(Router::with_path("handle-payment-success").post(checkout::confirm::handler))
        .push(
            Router::with_path("{user_id}")
                .get(carts::get::user_handler)
                .delete(carts::clear::user_handler)
                .push(Router::with_path("updateQuantity").put(carts::update::user_handler))
                .push(Router::with_path("remove").delete(carts::remove::user_handler))
                .push(Router::with_path("apply-promo").post(carts::apply_promo::user_handler))
                .push(
                    Router::with_path("create-checkout-session")
                        .post(checkout::session::user_handler),
                ),
        )
}

fn orders_router() -> Router {
    Router::with_path("orders")
        .push(Router::with_path("my-orders").get(orders::index::handler))
        .push(
            Router::with_path("exporter/orders")
                .get(orders::exporter::handler)
                .push(
                    Router::with_path("{order_id}/products/{item_id}/approve")
                        .put(orders::approve::handler),
                ),
        )
        .push(Router::with_path("{order_id}").get(orders::get::handler))
}

fn promo_router() -> Router {
    Router::with_path("promo")
        .get(promotions::index::handler)
        .post(promotions::create::handler)
        .push(Router::with_path("validate").post(promotions::validate::handler))
        .push(
            Router::with_path("{id}")
                .push(Router::with_path("deactivate").put(promotions::deactivate::handler))
                .push(Router::with_path("delete").put(promotions::delete::handler)),
        )
}

/// Catalog management for exporters.
fn product_admin_router() -> Router {
    Router::with_path("products")
        .post(products::create::handler)
        .push(Router::with_path("exporter-products").get(products::exporter::handler))
        .push(
            Router::with_path("{product}")
                .put(products::update::handler)
                .delete(products::delete::handler),
        )
}

/// The caller's own account.
fn account_router() -> Router {
    Router::with_path("users")
        .push(Router::with_path("me").get(users::me::handler))
        .push(Router::with_path("profile").put(users::profile::handler))
}

fn wishlist_router() -> Router {
    Router::with_path("wishlist")
        .get(wishlists::get::handler)
        .push(Router::with_path("toggle").post(wishlists::toggle::handler))
}

/// The public catalog.
fn catalog_router() -> Router {
    Router::with_path("products")
        .get(products::index::handler)
        .push(Router::with_path("{product}").get(products::get::handler))
}

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(guest_router())
        .push(Router::with_path("users/exporters").get(users::exporters::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(cart_router())
                .push(orders_router())
                .push(promo_router())
                .push(Router::with_path("analytics").get(analytics::exporter::handler))
                .push(product_admin_router())
                .push(wishlist_router())
                .push(account_router()),
        )
        .push(catalog_router())
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::header::AUTHORIZATION,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use emporium_app::{
        auth::{AuthServiceError, Identity},
        domain::{
            carts::models::CartOwner,
            pagination::Page,
            products::models::ProductUuid,
            users::models::Role,
        },
    };

    use crate::{
        carts::models::CartCountResponse,
        test_helpers::{Mocks, TEST_EXPORTER_UUID, TEST_USER_UUID, make_product},
    };

    use super::*;

    fn service(mocks: Mocks) -> Service {
        Service::new(Router::new().hoop(inject(mocks.into_state())).push(app_router()))
    }

    fn authenticates_as(mocks: &mut Mocks, role: Role) {
        let user = match role {
            Role::Buyer => TEST_USER_UUID,
            Role::Exporter | Role::Admin => TEST_EXPORTER_UUID,
        };

        mocks
            .auth
            .expect_authenticate_bearer()
            .returning(move |_| Ok(Identity { user, role }));
    }

    #[tokio::test]
    async fn test_guest_cart_needs_no_token() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.auth.expect_authenticate_bearer().never();
        mocks.carts.expect_get_cart().once().return_once(|_| Ok(None));

        let res = TestClient::get("http://example.com/cart/guest/guest-42")
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_user_cart_needs_a_token() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.carts.expect_get_cart().never();

        let res = TestClient::get(format!("http://example.com/cart/{TEST_USER_UUID}"))
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_count_is_not_read_as_a_user_id() -> TestResult {
        let mut mocks = Mocks::default();

        authenticates_as(&mut mocks, Role::Buyer);

        mocks
            .carts
            .expect_count_items()
            .once()
            .withf(|owner| *owner == CartOwner::User(TEST_USER_UUID))
            .return_once(|_| Ok(2));

        let mut res = TestClient::get("http://example.com/cart/count")
            .add_header(AUTHORIZATION, "Bearer em_v1_token", true)
            .send(&service(mocks))
            .await;

        let body: CartCountResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_public_catalog_skips_auth() -> TestResult {
        let uuid = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks.auth.expect_authenticate_bearer().never();
        mocks
            .products
            .expect_get_product()
            .once()
            .return_once(move |_| Ok(make_product(uuid)));

        let res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_exporter_products_route_wins_over_product_id() -> TestResult {
        let mut mocks = Mocks::default();

        authenticates_as(&mut mocks, Role::Exporter);

        mocks.products.expect_get_product().never();
        mocks
            .products
            .expect_search_products()
            .once()
            .return_once(|_, page| Ok(Page::new(Vec::new(), page, 0)));

        let res = TestClient::get("http://example.com/products/exporter-products")
            .add_header(AUTHORIZATION, "Bearer em_v1_token", true)
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_exporter_listing_is_public() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.auth.expect_authenticate_bearer().never();
        mocks
            .users
            .expect_list_exporters()
            .once()
            .return_once(|| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/users/exporters")
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_own_account_needs_a_token() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.users.expect_get_user().never();

        let res = TestClient::get("http://example.com/users/me")
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_creating_products_needs_a_valid_token() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));
        mocks.products.expect_create_product().never();

        let res = TestClient::post("http://example.com/products")
            .add_header(AUTHORIZATION, "Bearer em_v1_unknown", true)
            .json(&serde_json::json!({}))
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
