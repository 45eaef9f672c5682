use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::models::{CustomizationPlan, DEFAULT_WORK_PLAN, Product};

pub const NO_DESCRIPTION: &str = "暂无描述";
pub const NO_PRODUCTS_MESSAGE: &str = "暂无上架商品";

const ICONS: [(&str, &str); 11] = [
    ("保温杯", "☕"),
    ("蓝牙耳机", "🎧"),
    ("耳机", "🎧"),
    ("充电宝", "🔋"),
    ("手环", "⌚"),
    ("手表", "⌚"),
    ("充电器", "📱"),
    ("音箱", "🔊"),
    ("鼠标", "🖱️"),
    ("键盘", "⌨️"),
    ("硬盘", "💾"),
];

/// 根据商品名称选择图标
pub fn product_icon(product_name: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(key, _)| product_name.contains(key))
        .map(|(_, icon)| *icon)
        .unwrap_or("📦")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageContent {
    Url { src: String },
    Icon { symbol: String },
}

impl ImageContent {
    pub fn for_product(product: &Product) -> Self {
        if product.has_remote_image() {
            ImageContent::Url {
                src: product.image.clone(),
            }
        } else {
            ImageContent::Icon {
                symbol: product_icon(&product.product_name).to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductCard {
    pub id: String,
    pub product_name: String,
    pub description: String,
    pub price: String,
    pub sales_text: String,
    pub work_plan: String,
    pub image: ImageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StorefrontView {
    pub cards: Vec<ProductCard>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductModalView {
    pub id: String,
    pub product_name: String,
    pub description: String,
    pub work_plan: String,
    pub price: String,
    pub image: ImageContent,
    pub quantity: u32,
    pub customization: CustomizationPlan,
    /// 已确认的定制方案描述
    pub customization_text: Option<String>,
}

fn displayed_work_plan(product: &Product, overrides: &HashMap<String, String>) -> String {
    overrides
        .get(&product.id)
        .cloned()
        .or_else(|| (!product.work_plan.is_empty()).then(|| product.work_plan.clone()))
        .unwrap_or_else(|| DEFAULT_WORK_PLAN.to_string())
}

fn description_or_default(product: &Product) -> String {
    if product.description.is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        product.description.clone()
    }
}

pub fn render_card(product: &Product, overrides: &HashMap<String, String>) -> ProductCard {
    ProductCard {
        id: product.id.clone(),
        product_name: product.product_name.clone(),
        description: description_or_default(product),
        price: format!("￥{}", product.price_text()),
        sales_text: if product.sales > 0 {
            format!("已售{}件", product.sales)
        } else {
            "新品上市".to_string()
        },
        work_plan: displayed_work_plan(product, overrides),
        image: ImageContent::for_product(product),
    }
}

/// Card grid for the listed products, in the order given.
pub fn render_storefront(listed: &[Product], overrides: &HashMap<String, String>) -> StorefrontView {
    StorefrontView {
        cards: listed.iter().map(|p| render_card(p, overrides)).collect(),
        empty_message: listed.is_empty().then(|| NO_PRODUCTS_MESSAGE.to_string()),
    }
}

pub fn render_modal(
    product: &Product,
    quantity: u32,
    customization: &CustomizationPlan,
    overrides: &HashMap<String, String>,
) -> ProductModalView {
    ProductModalView {
        id: product.id.clone(),
        product_name: product.product_name.clone(),
        description: description_or_default(product),
        work_plan: displayed_work_plan(product, overrides),
        price: format!("￥{}", product.price_text()),
        image: ImageContent::for_product(product),
        quantity,
        customization: customization.clone(),
        customization_text: overrides.get(&product.id).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::product;

    #[test]
    fn test_product_icon() {
        assert_eq!(product_icon("无线蓝牙耳机"), "🎧");
        assert_eq!(product_icon("机械键盘"), "⌨️");
        assert_eq!(product_icon("工业控制器"), "📦");
    }

    #[test]
    fn test_render_card() {
        let mut p = product("P001", "智能保温杯", "19.9", true);
        let card = render_card(&p, &HashMap::new());
        assert_eq!(card.price, "￥19.90");
        assert_eq!(card.sales_text, "新品上市");
        assert_eq!(card.description, NO_DESCRIPTION);
        assert_eq!(card.work_plan, DEFAULT_WORK_PLAN);
        assert_eq!(card.image, ImageContent::Icon { symbol: "☕".to_string() });

        p.sales = 12;
        p.image = "https://picsum.photos/200/200?random=1".to_string();
        let card = render_card(&p, &HashMap::new());
        assert_eq!(card.sales_text, "已售12件");
        assert!(matches!(card.image, ImageContent::Url { .. }));
    }

    #[test]
    fn test_work_plan_override() {
        let p = product("P001", "智能保温杯", "19.9", true);
        let overrides = HashMap::from([("P001".to_string(), "钻孔\n左 + 右".to_string())]);
        assert_eq!(render_card(&p, &overrides).work_plan, "钻孔\n左 + 右");
        let modal = render_modal(&p, 2, &CustomizationPlan::default(), &overrides);
        assert_eq!(modal.customization_text.as_deref(), Some("钻孔\n左 + 右"));
        assert_eq!(modal.quantity, 2);
    }

    #[test]
    fn test_empty_storefront_message() {
        let view = render_storefront(&[], &HashMap::new());
        assert!(view.cards.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(NO_PRODUCTS_MESSAGE));
    }
}
