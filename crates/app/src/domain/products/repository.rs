//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        pagination::PageRequest,
        products::models::{
            CategoryUuid, LineProduct, NewProduct, Product, ProductFilter, ProductUpdate,
            ProductUuid,
        },
        users::models::UserUuid,
    },
};

const SEARCH_PRODUCTS_SQL: &str = include_str!("sql/search_products.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("sql/count_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const FIND_LINE_PRODUCTS_SQL: &str = include_str!("sql/find_line_products.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn search_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), sqlx::Error> {
        let pattern = filter.query_pattern();
        let category = filter.category.map(CategoryUuid::into_uuid);
        let exporter = filter.exporter.map(UserUuid::into_uuid);
        let min_price = filter
            .min_price
            .map(|price| to_i64(price, "price"))
            .transpose()?;
        let max_price = filter
            .max_price
            .map(|price| to_i64(price, "price"))
            .transpose()?;

        let total: i64 = query_scalar(COUNT_PRODUCTS_SQL)
            .bind(pattern.as_deref())
            .bind(category)
            .bind(exporter)
            .bind(min_price)
            .bind(max_price)
            .bind(filter.in_stock)
            .fetch_one(&mut **tx)
            .await?;

        let products = query_as::<Postgres, Product>(SEARCH_PRODUCTS_SQL)
            .bind(pattern.as_deref())
            .bind(category)
            .bind(exporter)
            .bind(min_price)
            .bind(max_price)
            .bind(filter.in_stock)
            .bind(filter.sort.as_str())
            .bind(page.limit_i64())
            .bind(page.offset_i64())
            .fetch_all(&mut **tx)
            .await?;

        Ok((products, u64::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn find_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        product: &NewProduct,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(exporter.into_uuid())
            .bind(product.category.into_uuid())
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.image.as_deref())
            .bind(to_i64(product.price, "price")?)
            .bind(to_i64(product.stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        product: ProductUuid,
        update: &ProductUpdate,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(exporter.into_uuid())
            .bind(update.category.into_uuid())
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.image.as_deref())
            .bind(to_i64(update.price, "price")?)
            .bind(to_i64(update.stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exporter: UserUuid,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(exporter.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Exporter and title for each of `products` that still exists.
    pub(crate) async fn find_line_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, LineProduct>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().copied().map(ProductUuid::into_uuid).collect();

        let rows = query(FIND_LINE_PRODUCTS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok((
                    ProductUuid::from_uuid(row.try_get("uuid")?),
                    LineProduct {
                        exporter: UserUuid::from_uuid(row.try_get("exporter_uuid")?),
                        title: row.try_get("title")?,
                    },
                ))
            })
            .collect()
    }

    /// Take `quantity` units out of stock. `None` when the product is missing or
    /// holds fewer than `quantity` units; stock is left untouched in that case.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let stock: Option<i64> = query_scalar(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(to_i64(quantity, "stock")?)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(stock.map(|stock| u64::try_from(stock).unwrap_or_default()))
    }

    pub(crate) async fn find_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        let stock: Option<i64> = query_scalar(GET_STOCK_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(stock.map(|stock| u64::try_from(stock).unwrap_or_default()))
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            exporter: UserUuid::from_uuid(row.try_get("exporter_uuid")?),
            category: CategoryUuid::from_uuid(row.try_get("category_uuid")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            image: row.try_get("image")?,
            price: try_get_u64(row, "price")?,
            stock: try_get_u64(row, "stock")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
