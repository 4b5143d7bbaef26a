//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_optional_u64, try_get_u64},
    domain::{
        carts::models::{AppliedPromo, Cart, CartOwner, CartUuid, GuestSessionId},
        users::models::UserUuid,
    },
};

const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const UPDATE_CART_SQL: &str = include_str!("../sql/update_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const COUNT_CART_ITEMS_SQL: &str = include_str!("../sql/count_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

/// Bind values selecting a cart by owner. Exactly one is set.
fn owner_keys(owner: &CartOwner) -> (Option<Uuid>, Option<&str>) {
    (
        owner.user().map(UserUuid::into_uuid),
        owner.guest().map(GuestSessionId::as_str),
    )
}

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Cart header for `owner`, without items.
    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Option<Cart>, sqlx::Error> {
        let (user, guest) = owner_keys(owner);

        query_as::<Postgres, Cart>(FIND_CART_SQL)
            .bind(user)
            .bind(guest)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Cart header for `owner`, locked until the transaction ends.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Option<Cart>, sqlx::Error> {
        let (user, guest) = owner_keys(owner);

        query_as::<Postgres, Cart>(LOCK_CART_SQL)
            .bind(user)
            .bind(guest)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Create an empty cart for `owner` unless one exists, then lock it.
    pub(crate) async fn lock_or_create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Cart, sqlx::Error> {
        let (user, guest) = owner_keys(owner);

        query(CREATE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(user)
            .bind(guest)
            .execute(&mut **tx)
            .await?;

        self.lock_cart(tx, owner)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Persist the header fields derived from the cart's lines.
    pub(crate) async fn update_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &mut Cart,
    ) -> Result<(), sqlx::Error> {
        let promo = cart.applied_promo.as_ref();

        let updated_at: SqlxTimestamp = query_scalar(UPDATE_CART_SQL)
            .bind(cart.uuid.into_uuid())
            .bind(to_i64(cart.total_price, "total_price")?)
            .bind(to_i64(cart.discount, "discount")?)
            .bind(promo.map(|promo| promo.code.as_str()))
            .bind(
                promo
                    .map(|promo| to_i64(promo.discount_amount, "promo_discount"))
                    .transpose()?,
            )
            .bind(promo.map(|promo| promo.exporter.into_uuid()))
            .fetch_one(&mut **tx)
            .await?;

        cart.updated_at = updated_at.to_jiff();

        Ok(())
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<u64, sqlx::Error> {
        let (user, guest) = owner_keys(owner);

        let rows_affected = query(DELETE_CART_SQL)
            .bind(user)
            .bind(guest)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn count_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<u64, sqlx::Error> {
        let (user, guest) = owner_keys(owner);

        let count: i64 = query_scalar(COUNT_CART_ITEMS_SQL)
            .bind(user)
            .bind(guest)
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<'r> FromRow<'r, PgRow> for Cart {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let user: Option<Uuid> = row.try_get("user_uuid")?;
        let guest: Option<String> = row.try_get("guest_session_id")?;

        let owner = match (user, guest) {
            (Some(user), None) => CartOwner::User(UserUuid::from_uuid(user)),
            (None, Some(guest)) => {
                CartOwner::Guest(GuestSessionId::new(guest).map_err(|source| {
                    sqlx::Error::ColumnDecode {
                        index: "guest_session_id".to_string(),
                        source: Box::new(source),
                    }
                })?)
            }
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "user_uuid".to_string(),
                    source: "cart must have exactly one owner".into(),
                });
            }
        };

        let promo_code: Option<String> = row.try_get("promo_code")?;
        let promo_discount = try_get_optional_u64(row, "promo_discount")?;
        let promo_exporter: Option<Uuid> = row.try_get("promo_exporter_uuid")?;

        let applied_promo = match (promo_code, promo_discount, promo_exporter) {
            (Some(code), Some(discount_amount), Some(exporter)) => Some(AppliedPromo {
                code,
                discount_amount,
                exporter: UserUuid::from_uuid(exporter),
            }),
            _ => None,
        };

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            owner,
            items: Vec::new(),
            total_price: try_get_u64(row, "total_price")?,
            discount: try_get_u64(row, "discount")?,
            applied_promo,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
