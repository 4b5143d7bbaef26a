//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        orders::models::{Order, OrderStatus, OrderUuid},
        pagination::PageRequest,
        users::models::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const LIST_BUYER_ORDERS_SQL: &str = include_str!("../sql/list_buyer_orders.sql");
const COUNT_BUYER_ORDERS_SQL: &str = include_str!("../sql/count_buyer_orders.sql");
const GET_BUYER_ORDER_SQL: &str = include_str!("../sql/get_buyer_order.sql");
const LIST_EXPORTER_ORDERS_SQL: &str = include_str!("../sql/list_exporter_orders.sql");
const COUNT_EXPORTER_ORDERS_SQL: &str = include_str!("../sql/count_exporter_orders.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

/// Header of an order about to be inserted.
#[derive(Debug, Clone)]
pub(crate) struct NewOrder<'a> {
    pub(crate) uuid: OrderUuid,
    pub(crate) user: UserUuid,
    pub(crate) total_amount: u64,
    pub(crate) payment_id: &'a str,
    pub(crate) promo_code: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder<'_>,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user.into_uuid())
            .bind(to_i64(order.total_amount, "total_amount")?)
            .bind(order.payment_id)
            .bind(order.promo_code)
            .fetch_one(&mut **tx)
            .await
    }

    /// One page of `user`'s orders, newest first, and the overall count.
    pub(crate) async fn list_buyer_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), sqlx::Error> {
        let total: i64 = query_scalar(COUNT_BUYER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let orders = query_as::<Postgres, Order>(LIST_BUYER_ORDERS_SQL)
            .bind(user.into_uuid())
            .bind(page.limit_i64())
            .bind(page.offset_i64())
            .fetch_all(&mut **tx)
            .await?;

        Ok((orders, u64::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn find_buyer_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(GET_BUYER_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// One page of orders holding at least one pending line of `exporter`.
    pub(crate) async fn list_exporter_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), sqlx::Error> {
        let total: i64 = query_scalar(COUNT_EXPORTER_ORDERS_SQL)
            .bind(exporter.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let orders = query_as::<Postgres, Order>(LIST_EXPORTER_ORDERS_SQL)
            .bind(exporter.into_uuid())
            .bind(page.limit_i64())
            .bind(page.offset_i64())
            .fetch_all(&mut **tx)
            .await?;

        Ok((orders, u64::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items: Vec::new(),
            total_amount: try_get_u64(row, "total_amount")?,
            payment_id: row.try_get("payment_id")?,
            promo_code: row.try_get("promo_code")?,
            status: status
                .parse::<OrderStatus>()
                .map_err(|source| sqlx::Error::ColumnDecode {
                    index: "status".to_string(),
                    source: Box::new(source),
                })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
