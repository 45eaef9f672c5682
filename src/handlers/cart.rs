use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::models::*;
use crate::services::{CartActionOutcome, CartService};
use crate::views::CartView;

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    responses(
        (status = 200, description = "购物车", body = CartView)
    )
)]
pub async fn get_cart(cart_service: web::Data<CartService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(cart_service.view().await)))
}

#[utoipa::path(
    post,
    path = "/cart/load",
    tag = "cart",
    responses(
        (status = 200, description = "重新读取已保存的购物车，清空勾选", body = CartView)
    )
)]
pub async fn load_cart(cart_service: web::Data<CartService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(cart_service.load().await)))
}

#[utoipa::path(
    post,
    path = "/cart/items",
    tag = "cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "已加入购物车", body = CartView),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn add_item(
    cart_service: web::Data<CartService>,
    request: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse> {
    match cart_service.add(&request.id, request.qty).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    tag = "cart",
    params(("product_id" = String, Path, description = "商品编号")),
    responses(
        (status = 200, description = "已移除", body = CartView)
    )
)]
pub async fn remove_item(
    cart_service: web::Data<CartService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(cart_service.remove(&path).await)))
}

#[utoipa::path(
    post,
    path = "/cart/items/{product_id}/increment",
    tag = "cart",
    params(("product_id" = String, Path, description = "商品编号")),
    responses(
        (status = 200, description = "数量加一（上限 99）", body = CartView),
        (status = 404, description = "购物车中没有该商品")
    )
)]
pub async fn increment_item(
    cart_service: web::Data<CartService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match cart_service.increment(&path).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cart/items/{product_id}/decrement",
    tag = "cart",
    params(("product_id" = String, Path, description = "商品编号")),
    responses(
        (status = 200, description = "数量减一（下限 1）", body = CartView),
        (status = 404, description = "购物车中没有该商品")
    )
)]
pub async fn decrement_item(
    cart_service: web::Data<CartService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match cart_service.decrement(&path).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/items/{product_id}/quantity",
    tag = "cart",
    params(("product_id" = String, Path, description = "商品编号")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "数量已更新", body = CartView),
        (status = 404, description = "购物车中没有该商品")
    )
)]
pub async fn set_item_quantity(
    cart_service: web::Data<CartService>,
    path: web::Path<String>,
    request: web::Json<SetQuantityRequest>,
) -> Result<HttpResponse> {
    match cart_service.set_quantity(&path, request.qty).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/items/{product_id}/selection",
    tag = "cart",
    params(("product_id" = String, Path, description = "商品编号")),
    request_body = SelectRequest,
    responses(
        (status = 200, description = "勾选状态已更新", body = CartView),
        (status = 404, description = "购物车中没有该商品")
    )
)]
pub async fn select_item(
    cart_service: web::Data<CartService>,
    path: web::Path<String>,
    request: web::Json<SelectRequest>,
) -> Result<HttpResponse> {
    match cart_service.select(&path, request.selected).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/selection",
    tag = "cart",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "全选/取消全选", body = CartView)
    )
)]
pub async fn select_all(
    cart_service: web::Data<CartService>,
    request: web::Json<SelectRequest>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(cart_service.select_all(request.selected).await)))
}

#[utoipa::path(
    post,
    path = "/cart/purchase",
    tag = "cart",
    responses(
        (status = 200, description = "购买勾选的商品；未勾选时仅返回提示", body = CartActionOutcome)
    )
)]
pub async fn purchase_selected(cart_service: web::Data<CartService>) -> Result<HttpResponse> {
    match cart_service.purchase_selected().await {
        Ok(outcome) => {
            let message = outcome.message.clone();
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(outcome, message)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cart/delete-selected",
    tag = "cart",
    responses(
        (status = 200, description = "删除勾选的商品；未勾选时仅返回提示", body = CartActionOutcome)
    )
)]
pub async fn delete_selected(cart_service: web::Data<CartService>) -> Result<HttpResponse> {
    let outcome = cart_service.delete_selected().await;
    let message = outcome.message.clone();
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(outcome, message)))
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(get_cart))
            .route("/load", web::post().to(load_cart))
            .route("/items", web::post().to(add_item))
            .route("/items/{product_id}", web::delete().to(remove_item))
            .route("/items/{product_id}/increment", web::post().to(increment_item))
            .route("/items/{product_id}/decrement", web::post().to(decrement_item))
            .route("/items/{product_id}/quantity", web::put().to(set_item_quantity))
            .route("/items/{product_id}/selection", web::put().to(select_item))
            .route("/selection", web::put().to(select_all))
            .route("/purchase", web::post().to(purchase_selected))
            .route("/delete-selected", web::post().to(delete_selected)),
    );
}
