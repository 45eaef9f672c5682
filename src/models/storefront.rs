use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Either a relative `delta` or an absolute `value`; both are clamped to [1, 99].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuantityRequest {
    pub delta: Option<i64>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseConfirmation {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    /// 两位小数的总价，如 "59.97"
    pub total: String,
    pub sales: u64,
    /// 已确认的定制方案描述
    pub customization: Option<String>,
    pub message: String,
}

/// 单个工序的开关/优先级调整，未给出的字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProcessUpdateRequest {
    pub enabled: Option<bool>,
    #[schema(minimum = 1, maximum = 4)]
    pub priority: Option<u8>,
}
