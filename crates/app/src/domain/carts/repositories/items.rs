//! Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        carts::models::{CartItem, CartUuid},
        products::models::ProductUuid,
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("../sql/delete_cart_items.sql");
const INSERT_CART_ITEMS_SQL: &str = include_str!("../sql/insert_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lines of `cart` in the order they were added.
    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        query_as::<Postgres, CartItem>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Replace every line of `cart` with `items`, keeping their order.
    pub(crate) async fn replace_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        items: &[CartItem],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?;

        if items.is_empty() {
            return Ok(());
        }

        let mut products: Vec<Uuid> = Vec::with_capacity(items.len());
        let mut positions: Vec<i32> = Vec::with_capacity(items.len());
        let mut quantities: Vec<i64> = Vec::with_capacity(items.len());
        let mut prices: Vec<i64> = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            products.push(item.product.into_uuid());
            positions.push(i32::try_from(position).unwrap_or(i32::MAX));
            quantities.push(to_i64(item.quantity, "quantity")?);
            prices.push(to_i64(item.price, "price")?);
        }

        query(INSERT_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .bind(products)
            .bind(positions)
            .bind(quantities)
            .bind(prices)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_u64(row, "quantity")?,
            price: try_get_u64(row, "price")?,
        })
    }
}
