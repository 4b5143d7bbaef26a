//! Promo Codes Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{to_i64, try_get_optional_u64, try_get_u64},
    domain::{
        promotions::models::{DiscountKind, NewPromoCode, PromoCode, PromoCodeUuid},
        users::models::UserUuid,
    },
};

const CREATE_PROMO_CODE_SQL: &str = include_str!("sql/create_promo_code.sql");
const LIST_PROMO_CODES_SQL: &str = include_str!("sql/list_promo_codes.sql");
const FIND_PROMO_CODE_BY_CODE_SQL: &str = include_str!("sql/find_promo_code_by_code.sql");
const LOCK_OWNED_PROMO_CODE_SQL: &str = include_str!("sql/lock_owned_promo_code.sql");
const DEACTIVATE_PROMO_CODE_SQL: &str = include_str!("sql/deactivate_promo_code.sql");
const DELETE_PROMO_CODE_SQL: &str = include_str!("sql/delete_promo_code.sql");
const INCREMENT_PROMO_CODE_USAGE_SQL: &str = include_str!("sql/increment_promo_code_usage.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromotionsRepository;

impl PgPromotionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a promo code. `promo.code` must already be normalized.
    pub(crate) async fn create_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        promo: &NewPromoCode,
    ) -> Result<PromoCode, sqlx::Error> {
        query_as::<Postgres, PromoCode>(CREATE_PROMO_CODE_SQL)
            .bind(promo.uuid.into_uuid())
            .bind(&promo.code)
            .bind(&promo.description)
            .bind(exporter.into_uuid())
            .bind(promo.discount_type.as_str())
            .bind(to_i64(promo.discount_value, "discount_value")?)
            .bind(to_i64(promo.min_order_amount, "min_order_amount")?)
            .bind(
                promo
                    .max_uses
                    .map(|max| to_i64(max, "max_uses"))
                    .transpose()?,
            )
            .bind(promo.valid_from.map(SqlxTimestamp::from))
            .bind(promo.valid_until.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_promo_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
    ) -> Result<Vec<PromoCode>, sqlx::Error> {
        query_as::<Postgres, PromoCode>(LIST_PROMO_CODES_SQL)
            .bind(exporter.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<PromoCode>, sqlx::Error> {
        query_as::<Postgres, PromoCode>(FIND_PROMO_CODE_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn lock_owned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<Option<PromoCode>, sqlx::Error> {
        query_as::<Postgres, PromoCode>(LOCK_OWNED_PROMO_CODE_SQL)
            .bind(promo.into_uuid())
            .bind(exporter.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn deactivate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<PromoCode, sqlx::Error> {
        query_as::<Postgres, PromoCode>(DEACTIVATE_PROMO_CODE_SQL)
            .bind(promo.into_uuid())
            .bind(exporter.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        promo: PromoCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PROMO_CODE_SQL)
            .bind(promo.into_uuid())
            .bind(exporter.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Count one redemption of `code`. Nothing is counted once `max_uses` is reached.
    pub(crate) async fn increment_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(INCREMENT_PROMO_CODE_USAGE_SQL)
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for PromoCode {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;

        Ok(Self {
            uuid: PromoCodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            description: row.try_get("description")?,
            exporter: UserUuid::from_uuid(row.try_get("exporter_uuid")?),
            exporter_name: row.try_get("exporter_name")?,
            discount_type: discount_type.parse::<DiscountKind>().map_err(|source| {
                sqlx::Error::ColumnDecode {
                    index: "discount_type".to_string(),
                    source: Box::new(source),
                }
            })?,
            discount_value: try_get_u64(row, "discount_value")?,
            min_order_amount: try_get_u64(row, "min_order_amount")?,
            max_uses: try_get_optional_u64(row, "max_uses")?,
            current_uses: try_get_u64(row, "current_uses")?,
            valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
            valid_until: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_until")?
                .map(SqlxTimestamp::to_jiff),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
