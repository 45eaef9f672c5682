use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::models::*;
use crate::services::StorefrontService;
use crate::views::{ProductModalView, StorefrontView};

#[utoipa::path(
    get,
    path = "/storefront",
    tag = "storefront",
    responses(
        (status = 200, description = "商品卡片列表", body = StorefrontView)
    )
)]
pub async fn get_storefront(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    let view = storefront_service.view().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

#[utoipa::path(
    post,
    path = "/storefront/load",
    tag = "storefront",
    responses(
        (status = 200, description = "重新初始化数据后的商品卡片", body = StorefrontView)
    )
)]
pub async fn load_storefront(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    let view = storefront_service.load().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

#[utoipa::path(
    post,
    path = "/storefront/refresh",
    tag = "storefront",
    responses(
        (status = 200, description = "检查数据变化并刷新")
    )
)]
pub async fn refresh_storefront(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    let changed = storefront_service.refresh_if_changed().await;
    let view = storefront_service.view().await;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "changed": changed,
            "view": view
        }
    })))
}

#[utoipa::path(
    get,
    path = "/storefront/products",
    tag = "storefront",
    responses(
        (status = 200, description = "已上架商品", body = [Product])
    )
)]
pub async fn list_online_products(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(storefront_service.list_online())))
}

#[utoipa::path(
    post,
    path = "/storefront/modal/{product_id}",
    tag = "storefront",
    params(("product_id" = String, Path, description = "商品编号")),
    responses(
        (status = 200, description = "打开商品详情", body = ProductModalView),
        (status = 404, description = "商品不存在或已下架")
    )
)]
pub async fn open_modal(
    storefront_service: web::Data<StorefrontService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match storefront_service.open_product_modal(&path.into_inner()).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/storefront/modal",
    tag = "storefront",
    responses(
        (status = 200, description = "当前商品详情", body = ProductModalView),
        (status = 404, description = "没有打开的商品")
    )
)]
pub async fn get_modal(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    match storefront_service.modal().await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/storefront/modal",
    tag = "storefront",
    responses(
        (status = 200, description = "关闭商品详情，未确认的定制草稿被丢弃")
    )
)]
pub async fn close_modal(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    storefront_service.close_modal().await;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[utoipa::path(
    put,
    path = "/storefront/modal/quantity",
    tag = "storefront",
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "数量已更新（限制在 1 到 99）", body = ProductModalView),
        (status = 400, description = "缺少 delta 或 value"),
        (status = 404, description = "没有打开的商品")
    )
)]
pub async fn update_quantity(
    storefront_service: web::Data<StorefrontService>,
    request: web::Json<QuantityRequest>,
) -> Result<HttpResponse> {
    let result = match (request.value, request.delta) {
        (Some(value), _) => storefront_service.set_quantity(value).await,
        (None, Some(delta)) => storefront_service.change_quantity(delta).await,
        (None, None) => Err(AppError::ValidationError("需要提供 delta 或 value".to_string())),
    };
    match result {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/storefront/modal/customization",
    tag = "storefront",
    request_body = CustomizationPlan,
    responses(
        (status = 200, description = "定制草稿已更新", body = ProductModalView),
        (status = 404, description = "没有打开的商品")
    )
)]
pub async fn update_customization(
    storefront_service: web::Data<StorefrontService>,
    plan: web::Json<CustomizationPlan>,
) -> Result<HttpResponse> {
    match storefront_service.update_customization(plan.into_inner()).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/storefront/modal/customization/{process}",
    tag = "storefront",
    params(("process" = ProcessKind, Path, description = "drilling / assembly / weighing / coding")),
    request_body = ProcessUpdateRequest,
    responses(
        (status = 200, description = "工序已更新", body = ProductModalView),
        (status = 400, description = "打码需要装配，或优先级超出范围"),
        (status = 404, description = "没有打开的商品")
    )
)]
pub async fn update_process(
    storefront_service: web::Data<StorefrontService>,
    path: web::Path<String>,
    request: web::Json<ProcessUpdateRequest>,
) -> Result<HttpResponse> {
    let kind = match path.parse::<ProcessKind>() {
        Ok(kind) => kind,
        Err(e) => return Ok(AppError::ValidationError(e).error_response()),
    };
    let request = request.into_inner();

    match storefront_service
        .update_process(kind, request.enabled, request.priority)
        .await
    {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/storefront/modal/customization/confirm",
    tag = "storefront",
    responses(
        (status = 200, description = "定制方案已确认", body = ProductModalView),
        (status = 400, description = "定制方案校验失败")
    )
)]
pub async fn confirm_customization(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    match storefront_service.confirm_customization().await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(view, "定制方案已确认"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/storefront/modal/add-to-cart",
    tag = "storefront",
    responses(
        (status = 200, description = "已加入购物车", body = PurchaseConfirmation),
        (status = 404, description = "没有打开的商品")
    )
)]
pub async fn add_to_cart(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    match storefront_service.add_to_cart().await {
        Ok(confirmation) => Ok(HttpResponse::Ok().json(ApiResponse::success(confirmation))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/storefront/modal/buy-now",
    tag = "storefront",
    responses(
        (status = 200, description = "购买成功", body = PurchaseConfirmation),
        (status = 404, description = "没有打开的商品")
    )
)]
pub async fn buy_now(storefront_service: web::Data<StorefrontService>) -> Result<HttpResponse> {
    match storefront_service.buy_now().await {
        Ok(confirmation) => Ok(HttpResponse::Ok().json(ApiResponse::success(confirmation))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn storefront_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/storefront")
            .route("", web::get().to(get_storefront))
            .route("/load", web::post().to(load_storefront))
            .route("/refresh", web::post().to(refresh_storefront))
            .route("/products", web::get().to(list_online_products))
            .route("/modal", web::get().to(get_modal))
            .route("/modal", web::delete().to(close_modal))
            .route("/modal/quantity", web::put().to(update_quantity))
            .route("/modal/customization", web::put().to(update_customization))
            .route("/modal/customization/confirm", web::post().to(confirm_customization))
            .route("/modal/customization/{process}", web::patch().to(update_process))
            .route("/modal/add-to-cart", web::post().to(add_to_cart))
            .route("/modal/buy-now", web::post().to(buy_now))
            .route("/modal/{product_id}", web::post().to(open_modal)),
    );
}
