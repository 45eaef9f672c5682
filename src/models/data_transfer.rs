//! 数据导入导出文档

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::product::{Product, RawProduct, validate_product};
use crate::error::{AppError, AppResult};

pub const EXPORT_DATA_SOURCE: &str = "localStorage";
pub const EXPORT_NOTE: &str = "此数据包含用户的本地修改（上架状态、销量等）";

/// Parses a `{ "products": [...] }` document and validates every entry.
///
/// A missing or non-array `products` field is an error; individual entries
/// are never rejected.
pub fn parse_products_document(text: &str) -> AppResult<Vec<Product>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| AppError::ImportError(format!("文件解析失败：{e}")))?;
    products_from_document(document)
}

pub fn products_from_document(document: Value) -> AppResult<Vec<Product>> {
    let Some(Value::Array(items)) = document.get("products").cloned() else {
        return Err(AppError::ImportError(
            "文件格式错误：缺少products数组".to_string(),
        ));
    };

    Ok(items
        .into_iter()
        .map(|item| {
            let raw = serde_json::from_value::<RawProduct>(item).unwrap_or_else(|e| {
                log::warn!("Product entry is not an object, using defaults: {e}");
                RawProduct::default()
            });
            validate_product(raw)
        })
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
    pub export_date: DateTime<Utc>,
    pub total_products: usize,
    pub online_products: usize,
    pub data_source: String,
    pub note: String,
}

impl ExportDocument {
    pub fn new(products: Vec<Product>, export_date: DateTime<Utc>) -> Self {
        let categories = distinct_categories(&products);
        let total_products = products.len();
        let online_products = products.iter().filter(|p| p.status).count();
        Self {
            products,
            categories,
            export_date,
            total_products,
            online_products,
            data_source: EXPORT_DATA_SOURCE.to_string(),
            note: EXPORT_NOTE.to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("products_modified_{}.json", self.export_date.format("%Y-%m-%d"))
    }
}

/// Distinct categories in first-seen order.
pub fn distinct_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub name: String,
    pub count: usize,
    pub online_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatistics {
    pub total_products: usize,
    pub online_products: usize,
    pub offline_products: usize,
    pub categories: usize,
    pub total_sales: u64,
    #[schema(value_type = f64)]
    #[serde(with = "super::product::decimal_number")]
    pub avg_price: Decimal,
    pub categories_stats: Vec<CategoryStats>,
}

impl ProductStatistics {
    pub fn from_products(products: &[Product]) -> Self {
        let categories = distinct_categories(products);
        let online_products = products.iter().filter(|p| p.status).count();
        let avg_price = if products.is_empty() {
            Decimal::ZERO
        } else {
            let sum: Decimal = products.iter().map(|p| p.price).sum();
            (sum / Decimal::from(products.len())).round_dp(2)
        };

        Self {
            total_products: products.len(),
            online_products,
            offline_products: products.len() - online_products,
            categories: categories.len(),
            total_sales: products.iter().map(|p| p.sales).sum(),
            avg_price,
            categories_stats: categories
                .into_iter()
                .map(|name| CategoryStats {
                    count: products.iter().filter(|p| p.category == name).count(),
                    online_count: products
                        .iter()
                        .filter(|p| p.category == name && p.status)
                        .count(),
                    name,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DOC: &str = r#"{
        "products": [
            { "id": "P001", "productName": "智能保温杯", "price": 99.5, "status": true, "category": "生活用品", "sales": 10 },
            { "id": "P002", "productName": "无线鼠标", "price": "50.5", "status": false, "category": "办公用品" },
            { "id": "P003", "productName": "机械键盘", "price": 300, "status": true, "category": "生活用品", "sales": 5 }
        ]
    }"#;

    #[test]
    fn test_parse_document_keeps_file_order() {
        let products = parse_products_document(DOC).unwrap();
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P001", "P002", "P003"]);
    }

    #[test]
    fn test_parse_document_rejects_bad_shape() {
        assert!(matches!(
            parse_products_document(r#"{ "items": [] }"#),
            Err(AppError::ImportError(_))
        ));
        assert!(matches!(
            parse_products_document(r#"{ "products": {} }"#),
            Err(AppError::ImportError(_))
        ));
        assert!(matches!(
            parse_products_document("not json"),
            Err(AppError::ImportError(_))
        ));
    }

    #[test]
    fn test_export_document() {
        let products = parse_products_document(DOC).unwrap();
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let export = ExportDocument::new(products, date);
        assert_eq!(export.total_products, 3);
        assert_eq!(export.online_products, 2);
        assert_eq!(export.categories, vec!["生活用品", "办公用品"]);
        assert_eq!(export.file_name(), "products_modified_2026-03-01.json");

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["dataSource"], "localStorage");
        assert!(value.get("exportDate").is_some());
    }

    #[test]
    fn test_statistics() {
        let products = parse_products_document(DOC).unwrap();
        let stats = ProductStatistics::from_products(&products);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.offline_products, 1);
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.total_sales, 15);
        assert_eq!(stats.avg_price, Decimal::new(15000, 2));
        assert_eq!(stats.categories_stats[0].count, 2);
        assert_eq!(stats.categories_stats[0].online_count, 2);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = ProductStatistics::from_products(&[]);
        assert_eq!(stats.avg_price, Decimal::ZERO);
        assert_eq!(stats.total_products, 0);
    }
}
