//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthService, OpenBaoClient, OpenBaoConfig, PgAuthService},
    database::{self, Db},
    domain::{
        analytics::{AnalyticsService, PgAnalyticsService},
        carts::{CartsService, PgCartsService},
        checkout::{CheckoutService, PgCheckoutService},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
        promotions::{PgPromotionsService, PromotionsService},
        users::{PgUsersService, UsersService},
        wishlists::{PgWishlistsService, WishlistsService},
    },
    payments::{PaymentsConfig, StripeGateway},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

/// External collaborators the services are wired to.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub openbao: OpenBaoConfig,
    pub payments: PaymentsConfig,

    /// Storefront base URL used for default checkout redirects.
    pub frontend_url: String,

    /// Apply embedded migrations before serving.
    pub run_migrations: bool,
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UsersService>,
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub promotions: Arc<dyn PromotionsService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub wishlists: Arc<dyn WishlistsService>,
    pub analytics: Arc<dyn AnalyticsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating the database fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;

            info!("database migrations applied");
        }

        Ok(Self::from_db(Db::new(pool), settings))
    }

    #[must_use]
    pub fn from_db(db: Db, settings: AppSettings) -> Self {
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(db.clone()));

        let checkout = PgCheckoutService::new(
            db.clone(),
            Arc::new(StripeGateway::new(settings.payments)),
            Arc::clone(&orders),
            settings.frontend_url,
        );

        Self {
            auth: Arc::new(PgAuthService::new(
                &db,
                OpenBaoClient::new(settings.openbao),
            )),
            users: Arc::new(PgUsersService::new(db.clone())),
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            promotions: Arc::new(PgPromotionsService::new(db.clone())),
            checkout: Arc::new(checkout),
            wishlists: Arc::new(PgWishlistsService::new(db.clone())),
            analytics: Arc::new(PgAnalyticsService::new(db)),
            orders,
        }
    }
}
