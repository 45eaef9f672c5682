use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

use super::storefront::ImageContent;
use crate::models::{CartItem, Product, format_money};

pub const EMPTY_CART_MESSAGE: &str = "购物车为空";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLineView {
    pub id: String,
    pub product_name: String,
    pub description: String,
    pub price: String,
    pub qty: u32,
    pub subtotal: String,
    pub selected: bool,
    pub image: ImageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub selected_count: usize,
    pub empty_message: Option<String>,
}

/// Lines whose product no longer exists are skipped.
pub fn render_cart(items: &[CartItem], products: &[Product], selected: &BTreeSet<String>) -> CartView {
    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let Some(product) = products.iter().find(|p| p.id == item.id) else {
            continue;
        };
        let subtotal = product.price * Decimal::from(item.qty);
        total += subtotal;
        lines.push(CartLineView {
            id: item.id.clone(),
            product_name: product.product_name.clone(),
            description: product.description.clone(),
            price: format!("￥{}", product.price_text()),
            qty: item.qty,
            subtotal: format!("￥{}", format_money(subtotal)),
            selected: selected.contains(&item.id),
            image: ImageContent::for_product(product),
        });
    }

    CartView {
        selected_count: lines.iter().filter(|l| l.selected).count(),
        empty_message: items.is_empty().then(|| EMPTY_CART_MESSAGE.to_string()),
        total: format!("￥{}", format_money(total)),
        lines,
    }
}
