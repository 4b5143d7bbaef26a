//! Promotions service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        products::{models::ProductUuid, repository::PgProductsRepository},
        promotions::{
            engine,
            errors::PromotionsServiceError,
            models::{
                CartLine, DiscountKind, NewPromoCode, PricedLine, PromoCode, PromoCodeUuid,
                PromoQuote, normalize_code,
            },
            repository::PgPromotionsRepository,
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgPromotionsService {
    db: Db,
    repository: PgPromotionsRepository,
    products: PgProductsRepository,
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromotionsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

/// Look up `code` and price it against `lines` inside an open transaction.
///
/// Each line's exporter comes from the catalog. Lines whose product no longer
/// exists are never eligible.
pub(crate) async fn price_promo(
    tx: &mut Transaction<'_, Postgres>,
    promotions: &PgPromotionsRepository,
    products: &PgProductsRepository,
    code: &str,
    subtotal: u64,
    lines: &[CartLine],
    now: Timestamp,
) -> Result<PromoQuote, PromotionsServiceError> {
    let code = normalize_code(code);

    if code.is_empty() || lines.is_empty() {
        return Err(PromotionsServiceError::MissingRequiredData);
    }

    let promo = promotions
        .find_by_code(tx, &code)
        .await?
        .ok_or(PromotionsServiceError::NotFound)?;

    let uuids: Vec<ProductUuid> = lines.iter().map(|line| line.product).collect();
    let catalog = products.find_line_products(tx, &uuids).await?;

    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|line| PricedLine {
            product: line.product,
            exporter: catalog.get(&line.product).map(|product| product.exporter),
            quantity: line.quantity,
            price: line.price,
        })
        .collect();

    engine::quote(&promo, subtotal, &priced, now)
}

fn validate_new_promo(promo: &NewPromoCode) -> Result<(), PromotionsServiceError> {
    if promo.code.is_empty() {
        return Err(PromotionsServiceError::MissingRequiredData);
    }

    if promo.discount_value == 0 {
        return Err(PromotionsServiceError::InvalidData);
    }

    if promo.discount_type == DiscountKind::Percentage && promo.discount_value > 100 {
        return Err(PromotionsServiceError::InvalidData);
    }

    if let (Some(from), Some(until)) = (promo.valid_from, promo.valid_until)
        && until < from
    {
        return Err(PromotionsServiceError::InvalidData);
    }

    Ok(())
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    async fn create_promo(
        &self,
        exporter: UserUuid,
        promo: NewPromoCode,
    ) -> Result<PromoCode, PromotionsServiceError> {
        let promo = NewPromoCode {
            code: normalize_code(&promo.code),
            ..promo
        };

        validate_new_promo(&promo)?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_promo_code(&mut tx, exporter, &promo)
            .await?;

        tx.commit().await?;

        info!(promo = %created.uuid, code = %created.code, exporter = %exporter, "promo code created");

        Ok(created)
    }

    async fn list_promos(&self, exporter: UserUuid) -> Result<Vec<PromoCode>, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let promos = self.repository.list_promo_codes(&mut tx, exporter).await?;

        tx.commit().await?;

        Ok(promos)
    }

    async fn deactivate_promo(
        &self,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<PromoCode, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let deactivated = self.repository.deactivate(&mut tx, exporter, promo).await?;

        tx.commit().await?;

        info!(promo = %promo, exporter = %exporter, "promo code deactivated");

        Ok(deactivated)
    }

    async fn delete_promo(
        &self,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<(), PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self
            .repository
            .lock_owned(&mut tx, exporter, promo)
            .await?
            .ok_or(PromotionsServiceError::NotFound)?;

        if existing.is_active {
            return Err(PromotionsServiceError::StillActive);
        }

        self.repository.delete(&mut tx, exporter, promo).await?;

        tx.commit().await?;

        info!(promo = %promo, exporter = %exporter, "promo code deleted");

        Ok(())
    }

    async fn validate_promo(
        &self,
        code: String,
        subtotal: u64,
        lines: Vec<CartLine>,
        now: Timestamp,
    ) -> Result<PromoQuote, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let quote = price_promo(
            &mut tx,
            &self.repository,
            &self.products,
            &code,
            subtotal,
            &lines,
            now,
        )
        .await?;

        tx.commit().await?;

        Ok(quote)
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Create a promo code owned by `exporter`. The code is stored uppercased.
    async fn create_promo(
        &self,
        exporter: UserUuid,
        promo: NewPromoCode,
    ) -> Result<PromoCode, PromotionsServiceError>;

    /// Promo codes owned by `exporter`, newest first.
    async fn list_promos(&self, exporter: UserUuid) -> Result<Vec<PromoCode>, PromotionsServiceError>;

    /// Stop a promo code from being redeemed.
    async fn deactivate_promo(
        &self,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<PromoCode, PromotionsServiceError>;

    /// Delete a promo code. Only deactivated codes can be deleted.
    async fn delete_promo(
        &self,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<(), PromotionsServiceError>;

    /// Price `code` against a set of cart lines without applying it anywhere.
    async fn validate_promo(
        &self,
        code: String,
        subtotal: u64,
        lines: Vec<CartLine>,
        now: Timestamp,
    ) -> Result<PromoQuote, PromotionsServiceError>;
}
