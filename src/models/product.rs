use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use utoipa::ToSchema;

pub const DEFAULT_CATEGORY: &str = "未分类";
pub const DEFAULT_WORK_PLAN: &str = "暂无工作计划";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = "P001")]
    pub id: String,
    #[schema(example = "智能保温杯")]
    pub product_name: String,
    #[serde(with = "decimal_number")]
    #[schema(value_type = f64, example = 199.99)]
    pub price: Decimal,
    #[serde(default)]
    pub work_plan: String,
    #[serde(rename = "workPlanID", default)]
    pub work_plan_id: String,
    #[serde(default)]
    pub description: String,
    /// 上架状态
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub sales: u64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    #[schema(value_type = Object)]
    pub custom_fields: Map<String, Value>,
}

impl Product {
    pub fn price_text(&self) -> String {
        format_money(self.price)
    }

    pub fn has_remote_image(&self) -> bool {
        self.image.starts_with("http")
    }
}

/// Loosely-typed product as found in seed and import documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: Option<Value>,
    pub product_name: Option<Value>,
    pub price: Option<Value>,
    pub work_plan: Option<Value>,
    #[serde(rename = "workPlanID")]
    pub work_plan_id: Option<Value>,
    pub description: Option<Value>,
    pub status: Option<Value>,
    pub image: Option<Value>,
    pub sales: Option<Value>,
    pub category: Option<Value>,
    pub tags: Option<Value>,
    pub custom_fields: Option<Value>,
}

/// Normalizes a seed/import entry. Never fails: missing required fields are
/// logged and defaulted.
pub fn validate_product(raw: RawProduct) -> Product {
    let required = [
        ("id", raw.id.as_ref()),
        ("productName", raw.product_name.as_ref()),
        ("price", raw.price.as_ref()),
    ];
    for (field, value) in required {
        if !value.is_some_and(is_truthy) {
            log::warn!(
                "Product is missing required field {field}: id={:?}",
                raw.id.as_ref().and_then(value_to_string)
            );
        }
    }

    let price = raw.price.as_ref().and_then(parse_decimal).unwrap_or_else(|| {
        if raw.price.is_some() {
            log::warn!("Product price is not a number, defaulting to 0");
        }
        Decimal::ZERO
    });

    Product {
        id: raw.id.as_ref().and_then(value_to_string).unwrap_or_default(),
        product_name: raw
            .product_name
            .as_ref()
            .and_then(value_to_string)
            .unwrap_or_default(),
        price,
        work_plan: non_empty_string(raw.work_plan.as_ref())
            .unwrap_or_else(|| DEFAULT_WORK_PLAN.to_string()),
        work_plan_id: non_empty_string(raw.work_plan_id.as_ref()).unwrap_or_default(),
        status: raw.status.as_ref().is_some_and(is_truthy),
        image: non_empty_string(raw.image.as_ref()).unwrap_or_default(),
        description: non_empty_string(raw.description.as_ref()).unwrap_or_default(),
        sales: raw.sales.as_ref().and_then(parse_count).unwrap_or(0),
        category: non_empty_string(raw.category.as_ref()).unwrap_or_else(default_category),
        tags: match raw.tags {
            Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
            _ => Vec::new(),
        },
        custom_fields: match raw.custom_fields {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        },
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value.and_then(value_to_string).filter(|s| !s.is_empty())
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses a number or numeric string into a decimal.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Two-decimal money rendering, e.g. `59.97`.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Prices travel as JSON numbers and are read back from numbers or strings.
pub mod decimal_number {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Value::deserialize(deserializer)?;
        super::parse_decimal(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid decimal value: {value}")))
    }
}
