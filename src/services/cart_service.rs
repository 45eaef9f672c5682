use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::storage::ProductStorage;
use crate::views::{CartView, render_cart};

pub const SELECT_PROMPT: &str = "请选择商品";

#[derive(Debug, Default)]
pub struct CartState {
    items: Vec<CartItem>,
    /// 勾选状态只保存在内存中
    selected: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartActionOutcome {
    /// 没有勾选任何商品时为 false
    pub performed: bool,
    pub message: String,
    pub total: Option<String>,
    pub cart: CartView,
}

#[derive(Clone)]
pub struct CartService {
    storage: ProductStorage,
    state: Arc<Mutex<CartState>>,
}

impl CartService {
    pub fn new(storage: ProductStorage) -> Self {
        let items = storage.load_cart();
        Self {
            storage,
            state: Arc::new(Mutex::new(CartState {
                items,
                selected: BTreeSet::new(),
            })),
        }
    }

    /// Re-reads the persisted cart; the selection is dropped.
    pub async fn load(&self) -> CartView {
        let mut state = self.state.lock().await;
        state.items = self.storage.load_cart();
        state.selected.clear();
        self.render(&state)
    }

    pub async fn view(&self) -> CartView {
        let state = self.state.lock().await;
        self.render(&state)
    }

    /// Adds a line or accumulates onto an existing one, clamped to [1, 99].
    pub async fn add(&self, product_id: &str, qty: i64) -> AppResult<CartView> {
        if !self.storage.load().iter().any(|p| p.id == product_id) {
            return Err(AppError::NotFound(format!("商品不存在：{product_id}")));
        }
        let mut state = self.state.lock().await;
        match state.items.iter_mut().find(|item| item.id == product_id) {
            Some(item) => item.adjust(clamp_quantity(qty) as i64),
            None => state.items.push(CartItem::new(product_id, qty)),
        }
        self.persist(&state);
        Ok(self.render(&state))
    }

    pub async fn remove(&self, product_id: &str) -> CartView {
        let mut state = self.state.lock().await;
        state.items.retain(|item| item.id != product_id);
        state.selected.remove(product_id);
        self.persist(&state);
        self.render(&state)
    }

    pub async fn increment(&self, product_id: &str) -> AppResult<CartView> {
        self.adjust_line(product_id, |item| item.adjust(1)).await
    }

    pub async fn decrement(&self, product_id: &str) -> AppResult<CartView> {
        self.adjust_line(product_id, |item| item.adjust(-1)).await
    }

    pub async fn set_quantity(&self, product_id: &str, qty: i64) -> AppResult<CartView> {
        self.adjust_line(product_id, |item| item.qty = clamp_quantity(qty))
            .await
    }

    pub async fn select(&self, product_id: &str, selected: bool) -> AppResult<CartView> {
        let mut state = self.state.lock().await;
        if !state.items.iter().any(|item| item.id == product_id) {
            return Err(AppError::NotFound(format!("购物车中没有该商品：{product_id}")));
        }
        if selected {
            state.selected.insert(product_id.to_string());
        } else {
            state.selected.remove(product_id);
        }
        Ok(self.render(&state))
    }

    pub async fn select_all(&self, selected: bool) -> CartView {
        let mut state = self.state.lock().await;
        state.selected = if selected {
            state.items.iter().map(|item| item.id.clone()).collect()
        } else {
            BTreeSet::new()
        };
        self.render(&state)
    }

    /// Buys every selected line: sales go up by each line's quantity and the
    /// lines leave the cart.
    pub async fn purchase_selected(&self) -> AppResult<CartActionOutcome> {
        let mut state = self.state.lock().await;
        if state.selected.is_empty() {
            return Ok(self.prompt(&state));
        }

        let lines: Vec<CartItem> = state
            .items
            .iter()
            .filter(|item| state.selected.contains(&item.id))
            .cloned()
            .collect();
        let (total, _) = self
            .storage
            .update(|products| {
                let mut total = Decimal::ZERO;
                for line in &lines {
                    if let Some(product) = products.iter_mut().find(|p| p.id == line.id) {
                        product.sales += u64::from(line.qty);
                        total += product.price * Decimal::from(line.qty);
                    }
                }
                Ok(total)
            })
            .await?;

        let kinds = state.selected.len();
        let total = format_money(total);
        Self::drop_selected(&mut state);
        self.persist(&state);
        log::info!("Cart purchase: {kinds} kinds, total {total}");

        Ok(CartActionOutcome {
            performed: true,
            message: format!("购买成功！共{kinds}种商品，总价：￥{total}"),
            total: Some(total),
            cart: self.render(&state),
        })
    }

    pub async fn delete_selected(&self) -> CartActionOutcome {
        let mut state = self.state.lock().await;
        if state.selected.is_empty() {
            return self.prompt(&state);
        }

        let kinds = state.selected.len();
        Self::drop_selected(&mut state);
        self.persist(&state);
        CartActionOutcome {
            performed: true,
            message: format!("已删除{kinds}种商品"),
            total: None,
            cart: self.render(&state),
        }
    }

    async fn adjust_line<F>(&self, product_id: &str, apply: F) -> AppResult<CartView>
    where
        F: FnOnce(&mut CartItem),
    {
        let mut state = self.state.lock().await;
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("购物车中没有该商品：{product_id}")))?;
        apply(item);
        self.persist(&state);
        Ok(self.render(&state))
    }

    fn drop_selected(state: &mut CartState) {
        let selected = std::mem::take(&mut state.selected);
        state.items.retain(|item| !selected.contains(&item.id));
    }

    fn prompt(&self, state: &CartState) -> CartActionOutcome {
        CartActionOutcome {
            performed: false,
            message: SELECT_PROMPT.to_string(),
            total: None,
            cart: self.render(state),
        }
    }

    fn persist(&self, state: &CartState) {
        if !self.storage.save_cart(&state.items) {
            log::warn!("Cart changes were not saved");
        }
    }

    fn render(&self, state: &CartState) -> CartView {
        render_cart(&state.items, &self.storage.load(), &state.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::{memory_storage, product};

    fn service() -> CartService {
        let storage = memory_storage();
        storage.save(&[
            product("P001", "智能保温杯", "19.99", true),
            product("P002", "蓝牙音箱", "100", true),
        ]);
        CartService::new(storage)
    }

    #[actix_web::test]
    async fn test_add_accumulates_and_clamps() {
        let cart = service();
        cart.add("P001", 2).await.unwrap();
        let view = cart.add("P001", 3).await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].qty, 5);

        let view = cart.add("P001", 500).await.unwrap();
        assert_eq!(view.lines[0].qty, 99);
        assert_eq!(cart.storage.load_cart()[0].qty, 99);

        assert!(matches!(cart.add("NOPE", 1).await, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_quantity_controls() {
        let cart = service();
        cart.add("P001", 1).await.unwrap();
        assert_eq!(cart.decrement("P001").await.unwrap().lines[0].qty, 1);
        assert_eq!(cart.increment("P001").await.unwrap().lines[0].qty, 2);
        assert_eq!(cart.set_quantity("P001", 0).await.unwrap().lines[0].qty, 1);
        assert!(cart.increment("P002").await.is_err());
    }

    #[actix_web::test]
    async fn test_purchase_without_selection_prompts() {
        let cart = service();
        cart.add("P001", 1).await.unwrap();
        let outcome = cart.purchase_selected().await.unwrap();
        assert!(!outcome.performed);
        assert_eq!(outcome.message, SELECT_PROMPT);
        assert_eq!(outcome.cart.lines.len(), 1);
        assert_eq!(cart.storage.load()[0].sales, 0);
    }

    #[actix_web::test]
    async fn test_purchase_selected_updates_sales_and_cart() {
        let cart = service();
        cart.add("P001", 3).await.unwrap();
        cart.add("P002", 1).await.unwrap();
        cart.select("P001", true).await.unwrap();

        let outcome = cart.purchase_selected().await.unwrap();
        assert!(outcome.performed);
        assert_eq!(outcome.total.as_deref(), Some("59.97"));
        assert_eq!(outcome.cart.lines.len(), 1);
        assert_eq!(outcome.cart.lines[0].id, "P002");
        assert_eq!(outcome.cart.selected_count, 0);

        let products = cart.storage.load();
        assert_eq!(products[0].sales, 3);
        assert_eq!(products[1].sales, 0);
        assert_eq!(cart.storage.load_cart().len(), 1);
    }

    #[actix_web::test]
    async fn test_select_all_and_delete_selected() {
        let cart = service();
        cart.add("P001", 1).await.unwrap();
        cart.add("P002", 1).await.unwrap();

        let view = cart.select_all(true).await;
        assert_eq!(view.selected_count, 2);

        let outcome = cart.delete_selected().await;
        assert!(outcome.performed);
        assert!(outcome.cart.lines.is_empty());
        assert!(outcome.cart.empty_message.is_some());
        assert!(!cart.delete_selected().await.performed);
    }

    #[actix_web::test]
    async fn test_remove_clears_selection() {
        let cart = service();
        cart.add("P001", 1).await.unwrap();
        cart.select("P001", true).await.unwrap();
        let view = cart.remove("P001").await;
        assert!(view.lines.is_empty());
        assert!(cart.select("P001", true).await.is_err());
    }

    #[actix_web::test]
    async fn test_cart_survives_reload() {
        let cart = service();
        cart.add("P002", 4).await.unwrap();
        cart.select("P002", true).await.unwrap();

        let reloaded = CartService::new(cart.storage.clone());
        let view = reloaded.load().await;
        assert_eq!(view.lines[0].qty, 4);
        assert_eq!(view.selected_count, 0);
    }
}
