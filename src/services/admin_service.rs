use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::DataInitializer;
use crate::storage::ProductStorage;
use crate::utils::total_pages;
use crate::views::{AdminTableView, render_admin_table};

const REQUIRED_FIELDS_MESSAGE: &str = "请填写所有必填字段！";
const DUPLICATE_ID_MESSAGE: &str = "产品编号已存在！";

/// 管理端会话状态：搜索词与当前页
#[derive(Debug, Clone)]
pub struct AdminState {
    pub search: String,
    pub current_page: usize,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            search: String::new(),
            current_page: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    /// 未确认时为 false，产品列表保持不变
    pub deleted: bool,
    pub product: Option<Product>,
    pub table: AdminTableView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleOutcome {
    pub status: bool,
    pub table: AdminTableView,
}

/// Form fields after validation.
struct ValidForm {
    id: String,
    product_name: String,
    price: Decimal,
    work_plan: String,
    work_plan_id: String,
    description: String,
    image: String,
}

fn validate_form(form: &ProductForm, products: &[Product], editing: Option<usize>) -> AppResult<ValidForm> {
    let id = form.id.trim();
    let product_name = form.product_name.trim();
    let work_plan = form.work_plan.trim();
    let price_value = form.price.as_ref().filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    });

    let Some(price_value) = price_value else {
        return Err(AppError::ValidationError(REQUIRED_FIELDS_MESSAGE.to_string()));
    };
    if id.is_empty() || product_name.is_empty() || work_plan.is_empty() {
        return Err(AppError::ValidationError(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    let price = parse_decimal(price_value)
        .ok_or_else(|| AppError::ValidationError("价格必须是有效数字！".to_string()))?;
    if price.is_sign_negative() {
        return Err(AppError::ValidationError("价格不能为负数！".to_string()));
    }

    let duplicate = products
        .iter()
        .enumerate()
        .any(|(i, p)| p.id == id && Some(i) != editing);
    if duplicate {
        return Err(AppError::ValidationError(DUPLICATE_ID_MESSAGE.to_string()));
    }

    Ok(ValidForm {
        id: id.to_string(),
        product_name: product_name.to_string(),
        price: price.round_dp(2),
        work_plan: work_plan.to_string(),
        work_plan_id: form.work_plan_id.trim().to_string(),
        description: form.description.trim().to_string(),
        image: form.image.trim().to_string(),
    })
}

fn check_index(products: &[Product], index: usize) -> AppResult<()> {
    if index < products.len() {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("产品不存在：第 {index} 项")))
    }
}

#[derive(Clone)]
pub struct AdminService {
    storage: ProductStorage,
    initializer: DataInitializer,
    state: Arc<Mutex<AdminState>>,
    page_size: usize,
}

impl AdminService {
    pub fn new(storage: ProductStorage, initializer: DataInitializer, page_size: usize) -> Self {
        Self {
            storage,
            initializer,
            state: Arc::new(Mutex::new(AdminState::default())),
            page_size: page_size.max(1),
        }
    }

    /// 重新走一遍数据初始化流程后渲染第一页
    pub async fn load(&self) -> AdminTableView {
        let outcome = self.initializer.initialize().await;
        log::info!(
            "Admin loaded {} products from {:?}",
            outcome.products.len(),
            outcome.source
        );
        let mut state = self.state.lock().await;
        state.current_page = 1;
        self.render(&mut state, &outcome.products)
    }

    pub async fn view(&self) -> AdminTableView {
        let products = self.storage.load();
        let mut state = self.state.lock().await;
        self.render(&mut state, &products)
    }

    pub async fn search(&self, text: &str) -> AdminTableView {
        let products = self.storage.load();
        let mut state = self.state.lock().await;
        state.search = text.trim().to_string();
        state.current_page = 1;
        self.render(&mut state, &products)
    }

    /// Out-of-range pages are clamped to the last page.
    pub async fn paginate(&self, page: usize) -> AdminTableView {
        let products = self.storage.load();
        let mut state = self.state.lock().await;
        state.current_page = page.max(1);
        self.render(&mut state, &products)
    }

    pub async fn create(&self, form: ProductForm) -> AppResult<AdminTableView> {
        let (created, products) = self
            .storage
            .update(|products| {
                let valid = validate_form(&form, products, None)?;
                let product = Product {
                    id: valid.id,
                    product_name: valid.product_name,
                    price: valid.price,
                    work_plan: valid.work_plan,
                    work_plan_id: valid.work_plan_id,
                    description: valid.description,
                    status: false,
                    image: valid.image,
                    sales: 0,
                    category: DEFAULT_CATEGORY.to_string(),
                    tags: Vec::new(),
                    custom_fields: Map::new(),
                };
                products.push(product.clone());
                Ok(product)
            })
            .await?;
        log::info!("Created product {}", created.id);

        let mut state = self.state.lock().await;
        Ok(self.render(&mut state, &products))
    }

    /// 编辑表单字段；上架状态、销量、分类、标签与自定义字段保持不变
    pub async fn update(&self, index: usize, form: ProductForm) -> AppResult<AdminTableView> {
        let (id, products) = self
            .storage
            .update(|products| {
                check_index(products, index)?;
                let valid = validate_form(&form, products, Some(index))?;
                let product = &mut products[index];
                product.id = valid.id;
                product.product_name = valid.product_name;
                product.price = valid.price;
                product.work_plan = valid.work_plan;
                product.work_plan_id = valid.work_plan_id;
                product.description = valid.description;
                product.image = valid.image;
                Ok(product.id.clone())
            })
            .await?;
        log::info!("Updated product {id} at index {index}");

        let mut state = self.state.lock().await;
        Ok(self.render(&mut state, &products))
    }

    /// Deletes only when `confirmed`; otherwise nothing changes.
    pub async fn delete(&self, index: usize, confirmed: bool) -> AppResult<DeleteOutcome> {
        if !confirmed {
            let products = self.storage.load();
            check_index(&products, index)?;
            let product = products[index].clone();
            let mut state = self.state.lock().await;
            return Ok(DeleteOutcome {
                deleted: false,
                product: Some(product),
                table: self.render(&mut state, &products),
            });
        }

        let (removed, products) = self
            .storage
            .update(|products| {
                check_index(products, index)?;
                Ok(products.remove(index))
            })
            .await?;
        log::info!("Deleted product {} at index {index}", removed.id);

        let mut state = self.state.lock().await;
        let pages = total_pages(products.len(), self.page_size);
        if state.current_page > pages {
            state.current_page = pages;
        }
        Ok(DeleteOutcome {
            deleted: true,
            product: Some(removed),
            table: self.render(&mut state, &products),
        })
    }

    pub async fn toggle_status(&self, index: usize) -> AppResult<ToggleOutcome> {
        let (status, products) = self
            .storage
            .update(|products| {
                check_index(products, index)?;
                let product = &mut products[index];
                product.status = !product.status;
                Ok(product.status)
            })
            .await?;
        log::info!(
            "Product {} is now {}",
            products[index].id,
            if status { "online" } else { "offline" }
        );

        let mut state = self.state.lock().await;
        Ok(ToggleOutcome {
            status,
            table: self.render(&mut state, &products),
        })
    }

    fn render(&self, state: &mut AdminState, products: &[Product]) -> AdminTableView {
        let view = render_admin_table(products, &state.search, state.current_page, self.page_size);
        state.current_page = view.pagination.current_page;
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::initializer::test_support::initializer_for;
    use crate::storage::test_support::{memory_storage, product};
    use serde_json::json;

    fn service_with(products: &[Product]) -> AdminService {
        let storage = memory_storage();
        storage.save(products);
        let missing = std::env::temp_dir().join("product-showcase-missing-seed.json");
        let initializer = initializer_for(storage.clone(), &missing);
        AdminService::new(storage, initializer, 10)
    }

    fn catalog(count: usize) -> Vec<Product> {
        (1..=count)
            .map(|i| product(&format!("P{i:03}"), &format!("产品{i}"), "10", true))
            .collect()
    }

    fn form(id: &str, name: &str, price: Value, work_plan: &str) -> ProductForm {
        ProductForm {
            id: id.to_string(),
            product_name: name.to_string(),
            price: Some(price),
            work_plan: work_plan.to_string(),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_create_appends_offline_product() {
        let service = service_with(&catalog(2));
        let view = service
            .create(form("P100", "无线充电器", json!("129.999"), "装配"))
            .await
            .unwrap();
        assert_eq!(view.pagination.total, 3);

        let stored = service.storage.load();
        let created = &stored[2];
        assert_eq!(created.id, "P100");
        assert!(!created.status);
        assert_eq!(created.sales, 0);
        assert_eq!(created.category, DEFAULT_CATEGORY);
        assert_eq!(created.price_text(), "130.00");
    }

    #[actix_web::test]
    async fn test_create_duplicate_id_rejected_without_mutation() {
        let products = catalog(2);
        let service = service_with(&products);
        let err = service
            .create(form("P001", "重复", json!(1), "装配"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == DUPLICATE_ID_MESSAGE));
        assert_eq!(service.storage.load(), products);
    }

    #[actix_web::test]
    async fn test_create_requires_fields_and_numeric_price() {
        let service = service_with(&[]);
        let err = service.create(form("P1", "", json!(1), "装配")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == REQUIRED_FIELDS_MESSAGE));

        let err = service.create(form("P1", "名称", json!(""), "装配")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == REQUIRED_FIELDS_MESSAGE));

        let err = service.create(form("P1", "名称", json!("abc"), "装配")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(service.storage.load().is_empty());
    }

    #[actix_web::test]
    async fn test_update_preserves_status_and_sales() {
        let mut products = catalog(2);
        products[1].sales = 42;
        products[1].tags = vec!["智能".to_string()];
        let service = service_with(&products);

        service
            .update(1, form("P002", "新名称", json!(88), "钻孔"))
            .await
            .unwrap();
        let stored = service.storage.load();
        assert_eq!(stored[1].product_name, "新名称");
        assert_eq!(stored[1].price_text(), "88.00");
        assert!(stored[1].status);
        assert_eq!(stored[1].sales, 42);
        assert_eq!(stored[1].tags, vec!["智能"]);
    }

    #[actix_web::test]
    async fn test_update_to_existing_id_rejected() {
        let service = service_with(&catalog(2));
        let err = service
            .update(1, form("P001", "名称", json!(1), "装配"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(matches!(
            service.update(9, form("P009", "名称", json!(1), "装配")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn test_delete_requires_confirmation() {
        let service = service_with(&catalog(3));
        let outcome = service.delete(0, false).await.unwrap();
        assert!(!outcome.deleted);
        assert_eq!(service.storage.load().len(), 3);

        let outcome = service.delete(0, true).await.unwrap();
        assert!(outcome.deleted);
        assert_eq!(outcome.product.unwrap().id, "P001");
        assert_eq!(service.storage.load().len(), 2);
    }

    #[actix_web::test]
    async fn test_delete_last_item_on_page_two_moves_to_page_one() {
        let service = service_with(&catalog(11));
        let view = service.paginate(2).await;
        assert_eq!(view.pagination.current_page, 2);
        assert_eq!(view.rows.len(), 1);

        let outcome = service.delete(10, true).await.unwrap();
        assert_eq!(outcome.table.pagination.current_page, 1);
        assert_eq!(outcome.table.pagination.total_pages, 1);
        assert_eq!(outcome.table.rows.len(), 10);
    }

    #[actix_web::test]
    async fn test_toggle_status_flips_and_persists() {
        let service = service_with(&catalog(1));
        let outcome = service.toggle_status(0).await.unwrap();
        assert!(!outcome.status);
        assert!(!service.storage.load()[0].status);
        assert_eq!(outcome.table.rows[0].action_label, "上架");
    }

    #[actix_web::test]
    async fn test_search_resets_page_and_paginate_clamps() {
        let service = service_with(&catalog(25));
        assert_eq!(service.paginate(3).await.pagination.current_page, 3);
        assert_eq!(service.paginate(9).await.pagination.current_page, 3);

        let view = service.search("p02").await;
        assert_eq!(view.pagination.current_page, 1);
        assert_eq!(view.rows.len(), 6);
    }
}
