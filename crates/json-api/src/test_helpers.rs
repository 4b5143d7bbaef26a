//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use emporium_app::{
    auth::{Identity, MockAuthService},
    context::AppContext,
    domain::{
        analytics::MockAnalyticsService,
        carts::{
            MockCartsService,
            models::{Cart, CartItem, CartOwner, CartUuid},
        },
        checkout::MockCheckoutService,
        orders::{
            MockOrdersService,
            models::{ItemStatus, Order, OrderItem, OrderItemUuid, OrderStatus, OrderUuid},
        },
        products::{
            MockProductsService,
            models::{CategoryUuid, Product, ProductUuid},
        },
        promotions::{
            MockPromotionsService,
            models::{DiscountKind, PromoCode, PromoCodeUuid},
        },
        users::{
            MockUsersService,
            models::{Role, User, UserUuid},
        },
        wishlists::MockWishlistsService,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

pub(crate) const TEST_EXPORTER_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(1));

/// One mock per service. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) auth: MockAuthService,
    pub(crate) users: MockUsersService,
    pub(crate) products: MockProductsService,
    pub(crate) carts: MockCartsService,
    pub(crate) promotions: MockPromotionsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) checkout: MockCheckoutService,
    pub(crate) wishlists: MockWishlistsService,
    pub(crate) analytics: MockAnalyticsService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            promotions: Arc::new(self.promotions),
            orders: Arc::new(self.orders),
            checkout: Arc::new(self.checkout),
            wishlists: Arc::new(self.wishlists),
            analytics: Arc::new(self.analytics),
        })
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Mocks {
        auth,
        ..Mocks::default()
    }
    .into_state()
}

#[salvo::handler]
async fn inject_buyer(req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
    depot.insert_identity(Identity {
        user: TEST_USER_UUID,
        role: Role::Buyer,
    });

    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
async fn inject_exporter(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_identity(Identity {
        user: TEST_EXPORTER_UUID,
        role: Role::Exporter,
    });

    ctrl.call_next(req, depot, res).await;
}

/// Serve `route` as an unauthenticated caller.
pub(crate) fn public_service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(mocks.into_state())).push(route))
}

/// Serve `route` as [`TEST_USER_UUID`], a buyer.
pub(crate) fn buyer_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_buyer)
            .push(route),
    )
}

/// Serve `route` as [`TEST_EXPORTER_UUID`], an exporter.
pub(crate) fn exporter_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_exporter)
            .push(route),
    )
}

pub(crate) fn make_product(uuid: ProductUuid) -> Product {
    Product {
        uuid,
        exporter: TEST_EXPORTER_UUID,
        category: CategoryUuid::from_uuid(Uuid::from_u128(7)),
        title: "Cotton Scarf".to_string(),
        description: "Hand woven".to_string(),
        image: None,
        price: 1_500,
        stock: 12,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_cart(owner: CartOwner, product: ProductUuid, quantity: u64) -> Cart {
    Cart {
        uuid: CartUuid::from_uuid(Uuid::from_u128(3)),
        owner,
        items: vec![CartItem {
            product,
            quantity,
            price: 1_500,
        }],
        total_price: quantity * 1_500,
        discount: 0,
        applied_promo: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_empty_cart(owner: CartOwner) -> Cart {
    Cart {
        items: Vec::new(),
        total_price: 0,
        ..make_cart(owner, ProductUuid::new(), 0)
    }
}

pub(crate) fn make_user(uuid: UserUuid, name: &str, email: &str) -> User {
    User {
        uuid,
        name: name.to_string(),
        email: email.to_string(),
        role: Role::Buyer,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_order(uuid: OrderUuid, item: OrderItemUuid, status: ItemStatus) -> Order {
    Order {
        uuid,
        user: TEST_USER_UUID,
        items: vec![OrderItem {
            uuid: item,
            product: ProductUuid::from_uuid(Uuid::from_u128(5)),
            exporter: TEST_EXPORTER_UUID,
            quantity: 2,
            price: 1_500,
            status,
            approved_at: None,
        }],
        total_amount: 3_000,
        payment_id: "pi_test_1".to_string(),
        promo_code: None,
        status: OrderStatus::Pending,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_promo(uuid: PromoCodeUuid, is_active: bool) -> PromoCode {
    PromoCode {
        uuid,
        code: "SPRING10".to_string(),
        description: "Spring sale".to_string(),
        exporter: TEST_EXPORTER_UUID,
        exporter_name: "Acme Exports".to_string(),
        discount_type: DiscountKind::Percentage,
        discount_value: 10,
        min_order_amount: 0,
        max_uses: Some(100),
        current_uses: 0,
        valid_from: Timestamp::UNIX_EPOCH,
        valid_until: None,
        is_active,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
