//! Test context for service-level integration tests.

use crate::{
    database::Db,
    domain::{
        analytics::PgAnalyticsService,
        carts::PgCartsService,
        orders::PgOrdersService,
        products::PgProductsService,
        promotions::PgPromotionsService,
        users::{
            PgUsersService, UsersService,
            models::{NewUser, Role, UserUuid},
        },
        wishlists::PgWishlistsService,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub users: PgUsersService,
    pub products: PgProductsService,
    pub carts: PgCartsService,
    pub promotions: PgPromotionsService,
    pub orders: PgOrdersService,
    pub wishlists: PgWishlistsService,
    pub analytics: PgAnalyticsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            users: PgUsersService::new(db.clone()),
            products: PgProductsService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            promotions: PgPromotionsService::new(db.clone()),
            orders: PgOrdersService::new(db.clone()),
            wishlists: PgWishlistsService::new(db.clone()),
            analytics: PgAnalyticsService::new(db),
            db: test_db,
        }
    }

    /// A fresh handle onto the test database, for services built inside a test.
    pub fn db(&self) -> Db {
        Db::new(self.db.pool().clone())
    }

    pub async fn create_exporter(&self, name: &str) -> UserUuid {
        self.create_user(name, Role::Exporter).await
    }

    pub async fn create_buyer(&self, name: &str) -> UserUuid {
        self.create_user(name, Role::Buyer).await
    }

    async fn create_user(&self, name: &str, role: Role) -> UserUuid {
        let uuid = UserUuid::new();

        self.users
            .create_user(NewUser {
                uuid,
                name: name.to_string(),
                email: format!("{}@{uuid}.test", name.to_lowercase().replace(' ', ".")),
                role,
            })
            .await
            .expect("failed to create test user");

        uuid
    }
}
