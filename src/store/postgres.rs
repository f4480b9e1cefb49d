use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::aggregates::{Cart, CartDetail, CartHeader, CartLine, MergedLine, Product, ProductDraft, RemovedLine};

use super::{CartStore, ProductStore, Store, StoreError};

const PRODUCT_COLUMNS: &str = "id, name, price, description, category_name, image_url";

#[derive(sqlx::FromRow)]
struct CartDetailRow {
    id: i32,
    cart_header_id: i32,
    product_id: i32,
    count: i32,
    name: String,
    price: Decimal,
    description: Option<String>,
    category_name: Option<String>,
    image_url: Option<String>,
}

impl From<CartDetailRow> for CartDetail {
    fn from(r: CartDetailRow) -> Self {
        let product = Product {
            id: r.product_id,
            name: r.name,
            price: r.price,
            description: r.description,
            category_name: r.category_name,
            image_url: r.image_url,
        };
        CartDetail { id: r.id, cart_header_id: r.cart_header_id, product_id: r.product_id, count: r.count, product }
    }
}

/// PostgreSQL-backed store. Each call borrows a pooled connection for its
/// duration; multi-statement writes run in a transaction that rolls back
/// if dropped before commit.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        Ok(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, d: ProductDraft) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO products (name, price, description, category_name, image_url) VALUES ($1, $2, $3, $4, $5) RETURNING {PRODUCT_COLUMNS}"
        );
        let p = sqlx::query_as::<_, Product>(&sql)
            .bind(&d.name)
            .bind(d.price)
            .bind(&d.description)
            .bind(&d.category_name)
            .bind(&d.image_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(p)
    }

    async fn update_product(&self, p: Product) -> Result<Option<Product>, StoreError> {
        let sql = format!(
            "UPDATE products SET name = $2, price = $3, description = $4, category_name = $5, image_url = $6 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(p.id)
            .bind(&p.name)
            .bind(p.price)
            .bind(&p.description)
            .bind(&p.category_name)
            .bind(&p.image_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn insert_product_if_absent(&self, p: Product) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO products (id, name, price, description, category_name, image_url) VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(p.id)
        .bind(&p.name)
        .bind(p.price)
        .bind(&p.description)
        .bind(&p.category_name)
        .bind(&p.image_url)
        .execute(&mut *tx)
        .await?;

        // Explicit ids bypass the serial; keep it ahead of them.
        if inserted.rows_affected() > 0 {
            sqlx::query("SELECT setval(pg_get_serial_sequence('products', 'id'), GREATEST((SELECT MAX(id) FROM products), 1))")
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let stored = sqlx::query_as::<_, Product>(&sql).bind(p.id).fetch_one(&mut *tx).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn delete_product(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_cart(&self, user_id: &str) -> Result<Option<Cart>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let header = sqlx::query_as::<_, CartHeader>("SELECT id, user_id, coupon_code FROM cart_headers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(header) = header else { return Ok(None) };

        let rows = sqlx::query_as::<_, CartDetailRow>(
            "SELECT d.id, d.cart_header_id, d.product_id, d.count, p.name, p.price, p.description, p.category_name, p.image_url \
             FROM cart_details d JOIN products p ON p.id = d.product_id \
             WHERE d.cart_header_id = $1 ORDER BY d.id",
        )
        .bind(header.id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(Cart::new(header, rows.into_iter().map(CartDetail::from).collect())))
    }

    async fn merge_line_for_user(&self, user_id: &str, product_id: i32, count: i32) -> Result<MergedLine, StoreError> {
        let mut tx = self.pool.begin().await?;
        // The conflict update row-locks the header; a concurrent clear waits for commit.
        let header = sqlx::query_as::<_, CartHeader>(
            "INSERT INTO cart_headers (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id, user_id, coupon_code",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let line = sqlx::query_as::<_, CartLine>(
            "INSERT INTO cart_details (cart_header_id, product_id, count) VALUES ($1, $2, $3) \
             ON CONFLICT (cart_header_id, product_id) DO UPDATE SET count = cart_details.count + EXCLUDED.count \
             RETURNING id, cart_header_id, product_id, count",
        )
        .bind(header.id)
        .bind(product_id)
        .bind(count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(MergedLine { header, line })
    }

    async fn remove_line(&self, line_id: i32) -> Result<Option<RemovedLine>, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Lock order matches merges: header, then line. The header lock also
        // holds off line inserts under it until commit.
        let owner = sqlx::query_as::<_, (i32, String)>(
            "SELECT h.id, h.user_id FROM cart_headers h JOIN cart_details d ON d.cart_header_id = h.id \
             WHERE d.id = $1 FOR UPDATE OF h",
        )
        .bind(line_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((header_id, user_id)) = owner else { return Ok(None) };

        let line = sqlx::query_as::<_, CartLine>(
            "DELETE FROM cart_details WHERE id = $1 RETURNING id, cart_header_id, product_id, count",
        )
        .bind(line_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(line) = line else { return Ok(None) };

        let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cart_details WHERE cart_header_id = $1")
            .bind(header_id)
            .fetch_one(&mut *tx)
            .await?;

        let header_removed = remaining == 0;
        if header_removed {
            sqlx::query("DELETE FROM cart_headers WHERE id = $1")
                .bind(header_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(Some(RemovedLine { line, user_id, header_removed }))
    }

    async fn set_coupon(&self, user_id: &str, code: Option<&str>) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE cart_headers SET coupon_code = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, user_id: &str) -> Result<bool, StoreError> {
        // cart_details rows go with the header via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM cart_headers WHERE user_id = $1").bind(user_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
