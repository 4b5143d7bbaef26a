//! Order Items Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        orders::models::{ItemStatus, Order, OrderItem, OrderItemUuid, OrderUuid},
        products::models::ProductUuid,
        users::models::UserUuid,
    },
};

const CREATE_ORDER_ITEMS_SQL: &str = include_str!("../sql/create_order_items.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");
const GET_EXPORTER_PENDING_ITEMS_SQL: &str = include_str!("../sql/get_exporter_pending_items.sql");
const LOCK_PENDING_ITEM_SQL: &str = include_str!("../sql/lock_pending_item.sql");
const APPROVE_ITEM_SQL: &str = include_str!("../sql/approve_item.sql");

/// Row read back from `order_items`, tagged with its order.
struct OrderItemRow {
    order: OrderUuid,
    item: OrderItem,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert `items` as pending lines of `order`, in the given order.
    pub(crate) async fn create_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        items: &[OrderItem],
    ) -> Result<(), sqlx::Error> {
        let mut uuids: Vec<Uuid> = Vec::with_capacity(items.len());
        let mut products: Vec<Uuid> = Vec::with_capacity(items.len());
        let mut exporters: Vec<Uuid> = Vec::with_capacity(items.len());
        let mut positions: Vec<i32> = Vec::with_capacity(items.len());
        let mut quantities: Vec<i64> = Vec::with_capacity(items.len());
        let mut prices: Vec<i64> = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            uuids.push(item.uuid.into_uuid());
            products.push(item.product.into_uuid());
            exporters.push(item.exporter.into_uuid());
            positions.push(i32::try_from(position).unwrap_or(i32::MAX));
            quantities.push(to_i64(item.quantity, "quantity")?);
            prices.push(to_i64(item.price, "price")?);
        }

        query(CREATE_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .bind(uuids)
            .bind(products)
            .bind(exporters)
            .bind(positions)
            .bind(quantities)
            .bind(prices)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Fill in every line of each order in `orders`.
    pub(crate) async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [Order],
    ) -> Result<(), sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        distribute(orders, rows);

        Ok(())
    }

    /// Fill in only the pending lines that belong to `exporter`.
    pub(crate) async fn attach_pending_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        orders: &mut [Order],
    ) -> Result<(), sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_EXPORTER_PENDING_ITEMS_SQL)
            .bind(uuids)
            .bind(exporter.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        distribute(orders, rows);

        Ok(())
    }

    pub(crate) async fn lock_pending_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        order: OrderUuid,
        item: OrderItemUuid,
    ) -> Result<Option<OrderItem>, sqlx::Error> {
        let row = query_as::<Postgres, OrderItemRow>(LOCK_PENDING_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(order.into_uuid())
            .bind(exporter.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|row| row.item))
    }

    pub(crate) async fn approve_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: OrderItemUuid,
        approved_at: Timestamp,
    ) -> Result<OrderItem, sqlx::Error> {
        let row = query_as::<Postgres, OrderItemRow>(APPROVE_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(SqlxTimestamp::from(approved_at))
            .fetch_one(&mut **tx)
            .await?;

        Ok(row.item)
    }
}

fn distribute(orders: &mut [Order], rows: Vec<OrderItemRow>) {
    let mut by_order: FxHashMap<OrderUuid, Vec<OrderItem>> = FxHashMap::default();

    for row in rows {
        by_order.entry(row.order).or_default().push(row.item);
    }

    for order in orders {
        order.items = by_order.remove(&order.uuid).unwrap_or_default();
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: OrderItem {
                uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
                product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
                exporter: UserUuid::from_uuid(row.try_get("exporter_uuid")?),
                quantity: try_get_u64(row, "quantity")?,
                price: try_get_u64(row, "price")?,
                status: status
                    .parse::<ItemStatus>()
                    .map_err(|source| sqlx::Error::ColumnDecode {
                        index: "status".to_string(),
                        source: Box::new(source),
                    })?,
                approved_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("approved_at")?
                    .map(SqlxTimestamp::to_jiff),
            },
        })
    }
}
