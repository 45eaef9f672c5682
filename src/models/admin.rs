use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// 新增/编辑产品表单
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    #[serde(default)]
    #[schema(example = "P011")]
    pub id: String,
    #[serde(default)]
    #[schema(example = "无线充电器")]
    pub product_name: String,
    /// 数字或数字字符串
    #[serde(default)]
    #[schema(value_type = Object, example = "129.90")]
    pub price: Option<Value>,
    #[serde(default)]
    pub work_plan: String,
    #[serde(rename = "workPlanID", default)]
    pub work_plan_id: String,
    #[serde(default)]
    pub description: String,
    /// 图片 URL 或 data URL
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminQuery {
    /// 按编号或名称搜索（不区分大小写）
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}
