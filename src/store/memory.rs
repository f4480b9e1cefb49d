use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::aggregates::{Cart, CartDetail, CartHeader, CartLine, MergedLine, Product, ProductDraft, RemovedLine};
use crate::domain::value_objects::Quantity;

use super::{CartStore, ProductStore, Store, StoreError};

#[derive(Default)]
struct Tables {
    products: BTreeMap<i32, Product>,
    headers: BTreeMap<i32, CartHeader>,
    lines: BTreeMap<i32, CartLine>,
    next_header_id: i32,
    next_line_id: i32,
}

impl Tables {
    fn header_for_user(&self, user_id: &str) -> Option<&CartHeader> {
        self.headers.values().find(|h| h.user_id == user_id)
    }

    fn next_product_id(&self) -> Result<i32, StoreError> {
        let last = self.products.keys().next_back().copied().unwrap_or(0);
        last.checked_add(1).ok_or(StoreError::IdExhausted("product"))
    }

    fn allocate(counter: &mut i32, kind: &'static str) -> Result<i32, StoreError> {
        *counter = counter.checked_add(1).ok_or(StoreError::IdExhausted(kind))?;
        Ok(*counter)
    }

    fn drop_header(&mut self, header_id: i32) {
        self.headers.remove(&header_id);
        self.lines.retain(|_, l| l.cart_header_id != header_id);
    }
}

/// Process-local store. Each operation runs under a single lock, which
/// gives it the same atomicity the SQL store gets from its conflict clauses.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn insert_product(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        let product = draft.into_product(tables.next_product_id()?);
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: Product) -> Result<Option<Product>, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    async fn insert_product_if_absent(&self, product: Product) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.products.entry(product.id).or_insert(product).clone())
    }

    async fn delete_product(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.lines.values().any(|l| l.product_id == id) {
            return Err(StoreError::Constraint(format!("product {id} is referenced by cart lines")));
        }
        Ok(tables.products.remove(&id).is_some())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_cart(&self, user_id: &str) -> Result<Option<Cart>, StoreError> {
        let tables = self.tables.read().await;
        let Some(header) = tables.header_for_user(user_id) else { return Ok(None) };
        let mut details = Vec::new();
        for line in tables.lines.values().filter(|l| l.cart_header_id == header.id) {
            let product = tables
                .products
                .get(&line.product_id)
                .cloned()
                .ok_or_else(|| StoreError::MissingRow(format!("product {}", line.product_id)))?;
            details.push(CartDetail::from_line(line.clone(), product));
        }
        Ok(Some(Cart::new(header.clone(), details)))
    }

    async fn merge_line_for_user(&self, user_id: &str, product_id: i32, count: i32) -> Result<MergedLine, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::MissingRow(format!("product {product_id}")));
        }
        let added = Quantity::new(count).ok_or_else(|| StoreError::Constraint(format!("count {count} must be positive")))?;

        let header = match tables.header_for_user(user_id) {
            Some(header) => header.clone(),
            None => {
                let id = Tables::allocate(&mut tables.next_header_id, "cart header")?;
                let header = CartHeader { id, user_id: user_id.to_string(), coupon_code: None };
                tables.headers.insert(id, header.clone());
                header
            }
        };

        if let Some(line) = tables
            .lines
            .values_mut()
            .find(|l| l.cart_header_id == header.id && l.product_id == product_id)
        {
            let current = Quantity::new(line.count).ok_or(StoreError::Overflow { line_id: line.id })?;
            line.count = current.checked_add(added).ok_or(StoreError::Overflow { line_id: line.id })?.value();
            return Ok(MergedLine { header, line: line.clone() });
        }

        let id = Tables::allocate(&mut tables.next_line_id, "cart line")?;
        let line = CartLine { id, cart_header_id: header.id, product_id, count: added.value() };
        tables.lines.insert(id, line.clone());
        Ok(MergedLine { header, line })
    }

    async fn remove_line(&self, line_id: i32) -> Result<Option<RemovedLine>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(line) = tables.lines.remove(&line_id) else { return Ok(None) };
        let user_id = tables
            .headers
            .get(&line.cart_header_id)
            .map(|h| h.user_id.clone())
            .ok_or_else(|| StoreError::MissingRow(format!("cart header {}", line.cart_header_id)))?;
        let header_removed = !tables.lines.values().any(|l| l.cart_header_id == line.cart_header_id);
        if header_removed {
            tables.drop_header(line.cart_header_id);
        }
        Ok(Some(RemovedLine { line, user_id, header_removed }))
    }

    async fn set_coupon(&self, user_id: &str, code: Option<&str>) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.headers.values_mut().find(|h| h.user_id == user_id) {
            Some(header) => {
                header.coupon_code = code.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_cart(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(header_id) = tables.header_for_user(user_id).map(|h| h.id) else { return Ok(false) };
        tables.drop_header(header_id);
        Ok(true)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> { Ok(()) }
}
