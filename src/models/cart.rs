use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

/// Clamps any requested quantity into `[1, 99]`.
pub fn clamp_quantity(value: i64) -> u32 {
    value.clamp(MIN_QUANTITY as i64, MAX_QUANTITY as i64) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    #[schema(example = "P001")]
    pub id: String,
    #[schema(example = 1, minimum = 1, maximum = 99)]
    pub qty: u32,
}

impl CartItem {
    pub fn new(id: impl Into<String>, qty: i64) -> Self {
        Self {
            id: id.into(),
            qty: clamp_quantity(qty),
        }
    }

    pub fn adjust(&mut self, delta: i64) {
        self.qty = clamp_quantity(self.qty as i64 + delta);
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    #[schema(example = "P001")]
    pub id: String,
    #[serde(default = "default_qty")]
    pub qty: i64,
}

fn default_qty() -> i64 {
    1
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub qty: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SelectRequest {
    pub selected: bool,
}
