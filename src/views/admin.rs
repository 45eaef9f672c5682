use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;
use crate::utils::{PaginationInfo, PaginationParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminRow {
    /// 在完整列表中的下标，编辑/删除/上下架均以此定位
    pub index: usize,
    pub id: String,
    pub product_name: String,
    pub price: String,
    pub work_plan_id: String,
    pub status: bool,
    pub status_text: String,
    pub status_class: String,
    pub action_label: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminTableView {
    pub search: String,
    pub rows: Vec<AdminRow>,
    pub pagination: PaginationInfo,
}

/// Case-insensitive substring match over id and name, keeping global indices.
pub fn filter_products<'a>(products: &'a [Product], search: &str) -> Vec<(usize, &'a Product)> {
    let query = search.trim().to_lowercase();
    products
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            query.is_empty()
                || p.id.to_lowercase().contains(&query)
                || p.product_name.to_lowercase().contains(&query)
        })
        .collect()
}

fn render_row(index: usize, product: &Product) -> AdminRow {
    let (status_text, status_class, action_label) = if product.status {
        ("已上架", "status-online", "下架")
    } else {
        ("已下架", "status-offline", "上架")
    };
    AdminRow {
        index,
        id: product.id.clone(),
        product_name: product.product_name.clone(),
        price: format!("¥{}", product.price_text()),
        work_plan_id: product.work_plan_id.clone(),
        status: product.status,
        status_text: status_text.to_string(),
        status_class: status_class.to_string(),
        action_label: action_label.to_string(),
        description: if product.description.is_empty() {
            "-".to_string()
        } else {
            product.description.clone()
        },
        image: (!product.image.is_empty()).then(|| product.image.clone()),
    }
}

/// Renders one page of the filtered table. A page past the end shows the last page.
pub fn render_admin_table(
    products: &[Product],
    search: &str,
    page: usize,
    page_size: usize,
) -> AdminTableView {
    let filtered = filter_products(products, search);
    let params = PaginationParams::new(page, page_size).clamp_to(filtered.len());

    AdminTableView {
        search: search.to_string(),
        rows: params
            .slice(&filtered)
            .iter()
            .map(|(index, product)| render_row(*index, product))
            .collect(),
        pagination: PaginationInfo::new(params.page, params.per_page, filtered.len()),
    }
}
