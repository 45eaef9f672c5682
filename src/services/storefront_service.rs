use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::notify::RefreshGate;
use crate::services::DataInitializer;
use crate::storage::ProductStorage;
use crate::views::{ProductModalView, StorefrontView, render_modal, render_storefront};

/// 当前打开的商品弹窗
#[derive(Debug, Clone)]
struct ModalSession {
    product_id: String,
    quantity: u32,
    /// 未确认的定制草稿，关闭弹窗即丢弃
    draft: CustomizationPlan,
}

#[derive(Debug, Default)]
pub struct StorefrontState {
    listed: Vec<Product>,
    modal: Option<ModalSession>,
    /// 已确认的定制方案，按商品编号覆盖展示的工作计划
    work_plan_overrides: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PurchaseKind {
    AddToCart,
    BuyNow,
}

fn listed_only(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.status).cloned().collect()
}

fn no_open_modal() -> AppError {
    AppError::NotFound("没有打开的商品".to_string())
}

#[derive(Clone)]
pub struct StorefrontService {
    storage: ProductStorage,
    initializer: DataInitializer,
    state: Arc<Mutex<StorefrontState>>,
    gate: RefreshGate,
}

impl StorefrontService {
    pub fn new(storage: ProductStorage, initializer: DataInitializer) -> Self {
        Self {
            storage,
            initializer,
            state: Arc::new(Mutex::new(StorefrontState::default())),
            gate: RefreshGate::default(),
        }
    }

    pub async fn load(&self) -> StorefrontView {
        let outcome = self.initializer.initialize().await;
        let listed = listed_only(&outcome.products);
        log::info!("Storefront loaded {} listed products", listed.len());

        let mut state = self.state.lock().await;
        state.listed = listed;
        render_storefront(&state.listed, &state.work_plan_overrides)
    }

    /// Listed products in collection order, read fresh from storage.
    pub fn list_online(&self) -> Vec<Product> {
        listed_only(&self.storage.load())
    }

    pub async fn view(&self) -> StorefrontView {
        let state = self.state.lock().await;
        render_storefront(&state.listed, &state.work_plan_overrides)
    }

    /// Re-reads the listed products and replaces the displayed set when it
    /// differs. Returns `false` when nothing changed or another refresh is running.
    pub async fn refresh_if_changed(&self) -> bool {
        let Some(_ticket) = self.gate.try_begin() else {
            log::debug!("Storefront refresh already in progress, skipping");
            return false;
        };

        let listed = self.list_online();
        let mut state = self.state.lock().await;
        if state.listed == listed {
            return false;
        }
        log::info!(
            "Storefront data changed: {} -> {} listed products",
            state.listed.len(),
            listed.len()
        );
        state.listed = listed;
        true
    }

    pub async fn open_product_modal(&self, product_id: &str) -> AppResult<ProductModalView> {
        let mut state = self.state.lock().await;
        if !state.listed.iter().any(|p| p.id == product_id) {
            return Err(AppError::NotFound(format!("商品不存在或已下架：{product_id}")));
        }
        state.modal = Some(ModalSession {
            product_id: product_id.to_string(),
            quantity: MIN_QUANTITY,
            draft: CustomizationPlan::default(),
        });
        Self::render_open_modal(&state)
    }

    pub async fn close_modal(&self) {
        let mut state = self.state.lock().await;
        state.modal = None;
    }

    pub async fn modal(&self) -> AppResult<ProductModalView> {
        let state = self.state.lock().await;
        Self::render_open_modal(&state)
    }

    pub async fn change_quantity(&self, delta: i64) -> AppResult<ProductModalView> {
        self.with_session(|session| {
            session.quantity = clamp_quantity(session.quantity as i64 + delta);
            Ok(())
        })
        .await
    }

    pub async fn set_quantity(&self, value: i64) -> AppResult<ProductModalView> {
        self.with_session(|session| {
            session.quantity = clamp_quantity(value);
            Ok(())
        })
        .await
    }

    /// Replaces the draft plan; coding is switched off when assembly is.
    pub async fn update_customization(&self, mut plan: CustomizationPlan) -> AppResult<ProductModalView> {
        plan.normalize();
        self.with_session(|session| {
            session.draft = plan;
            Ok(())
        })
        .await
    }

    /// 开关与优先级一起生效：任一项校验失败时草稿保持不变
    pub async fn update_process(
        &self,
        kind: ProcessKind,
        enabled: Option<bool>,
        priority: Option<u8>,
    ) -> AppResult<ProductModalView> {
        self.with_session(|session| {
            let mut draft = session.draft.clone();
            if let Some(enabled) = enabled {
                draft.set_enabled(kind, enabled)?;
            }
            if let Some(priority) = priority {
                draft.set_priority(kind, priority)?;
            }
            session.draft = draft;
            Ok(())
        })
        .await
    }

    /// 校验草稿并生成工作计划文本，作为该商品的展示覆盖
    pub async fn confirm_customization(&self) -> AppResult<ProductModalView> {
        let mut state = self.state.lock().await;
        let session = state.modal.as_ref().ok_or_else(no_open_modal)?;
        let text = session.draft.confirm()?;
        let product_id = session.product_id.clone();
        log::info!("Customization confirmed for {product_id}");
        state.work_plan_overrides.insert(product_id, text);
        Self::render_open_modal(&state)
    }

    pub async fn add_to_cart(&self) -> AppResult<PurchaseConfirmation> {
        self.purchase(PurchaseKind::AddToCart).await
    }

    pub async fn buy_now(&self) -> AppResult<PurchaseConfirmation> {
        self.purchase(PurchaseKind::BuyNow).await
    }

    /// Both purchase actions add the quantity to the product's sales and close the modal.
    async fn purchase(&self, kind: PurchaseKind) -> AppResult<PurchaseConfirmation> {
        let mut state = self.state.lock().await;
        let session = state.modal.clone().ok_or_else(no_open_modal)?;
        let quantity = session.quantity;

        let (product, products) = self
            .storage
            .update(|products| {
                let product = products
                    .iter_mut()
                    .find(|p| p.id == session.product_id)
                    .ok_or_else(|| AppError::NotFound(format!("商品不存在：{}", session.product_id)))?;
                product.sales += u64::from(quantity);
                Ok(product.clone())
            })
            .await?;

        let total = format_money(product.price * Decimal::from(quantity));
        let customization = state.work_plan_overrides.get(&product.id).cloned();
        let mut message = match kind {
            PurchaseKind::AddToCart => format!(
                "已加入购物车！\n商品：{}\n数量：{}件\n小计：￥{}",
                product.product_name, quantity, total
            ),
            PurchaseKind::BuyNow => format!(
                "购买成功！\n商品：{}\n数量：{}件\n总价：￥{}",
                product.product_name, quantity, total
            ),
        };
        if let Some(text) = &customization {
            message.push_str("\n定制方案：\n");
            message.push_str(text);
        }
        log::info!(
            "{kind:?}: {} x{quantity}, total {total}, sales now {}",
            product.id,
            product.sales
        );

        state.listed = listed_only(&products);
        state.modal = None;
        Ok(PurchaseConfirmation {
            product_id: product.id,
            product_name: product.product_name,
            quantity,
            total,
            sales: product.sales,
            customization,
            message,
        })
    }

    async fn with_session<F>(&self, apply: F) -> AppResult<ProductModalView>
    where
        F: FnOnce(&mut ModalSession) -> AppResult<()>,
    {
        let mut state = self.state.lock().await;
        let session = state.modal.as_mut().ok_or_else(no_open_modal)?;
        apply(session)?;
        Self::render_open_modal(&state)
    }

    fn render_open_modal(state: &StorefrontState) -> AppResult<ProductModalView> {
        let session = state.modal.as_ref().ok_or_else(no_open_modal)?;
        let product = state
            .listed
            .iter()
            .find(|p| p.id == session.product_id)
            .ok_or_else(|| AppError::NotFound(format!("商品不存在或已下架：{}", session.product_id)))?;
        Ok(render_modal(
            product,
            session.quantity,
            &session.draft,
            &state.work_plan_overrides,
        ))
    }
}
