use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::{AdminService, DataInitializer, DeleteOutcome, ToggleOutcome};
use crate::views::AdminTableView;

#[utoipa::path(
    get,
    path = "/admin/products",
    tag = "admin",
    params(AdminQuery),
    responses(
        (status = 200, description = "产品管理表格", body = AdminTableView)
    )
)]
pub async fn list_products(
    admin_service: web::Data<AdminService>,
    query: web::Query<AdminQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let mut view = None;
    if let Some(search) = &query.search {
        view = Some(admin_service.search(search).await);
    }
    if let Some(page) = query.page {
        view = Some(admin_service.paginate(page).await);
    }
    let view = match view {
        Some(view) => view,
        None => admin_service.view().await,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

#[utoipa::path(
    post,
    path = "/admin/load",
    tag = "admin",
    responses(
        (status = 200, description = "重新初始化数据并返回第一页", body = AdminTableView)
    )
)]
pub async fn load_products(admin_service: web::Data<AdminService>) -> Result<HttpResponse> {
    let view = admin_service.load().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

#[utoipa::path(
    post,
    path = "/admin/products",
    tag = "admin",
    request_body = ProductForm,
    responses(
        (status = 200, description = "产品添加成功", body = AdminTableView),
        (status = 400, description = "表单校验失败")
    )
)]
pub async fn create_product(
    admin_service: web::Data<AdminService>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse> {
    match admin_service.create(form.into_inner()).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(view, "产品添加成功！"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/products/{index}",
    tag = "admin",
    params(("index" = usize, Path, description = "产品在完整列表中的下标")),
    request_body = ProductForm,
    responses(
        (status = 200, description = "产品修改成功", body = AdminTableView),
        (status = 400, description = "表单校验失败"),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn update_product(
    admin_service: web::Data<AdminService>,
    path: web::Path<usize>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse> {
    match admin_service.update(path.into_inner(), form.into_inner()).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(view, "产品修改成功！"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/products/{index}",
    tag = "admin",
    params(
        ("index" = usize, Path, description = "产品在完整列表中的下标"),
        DeleteQuery
    ),
    responses(
        (status = 200, description = "删除结果；未确认时不做修改", body = DeleteOutcome),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn delete_product(
    admin_service: web::Data<AdminService>,
    path: web::Path<usize>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse> {
    match admin_service.delete(path.into_inner(), query.confirm).await {
        Ok(outcome) => {
            let message = if outcome.deleted {
                "产品删除成功！"
            } else {
                "确定要删除这个产品吗？请携带 confirm=true 再次提交"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(outcome, message)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/products/{index}/toggle",
    tag = "admin",
    params(("index" = usize, Path, description = "产品在完整列表中的下标")),
    responses(
        (status = 200, description = "上下架切换成功", body = ToggleOutcome),
        (status = 404, description = "产品不存在")
    )
)]
pub async fn toggle_product_status(
    admin_service: web::Data<AdminService>,
    path: web::Path<usize>,
) -> Result<HttpResponse> {
    match admin_service.toggle_status(path.into_inner()).await {
        Ok(outcome) => {
            let message = if outcome.status { "产品已上架！" } else { "产品已下架！" };
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(outcome, message)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses(
        (status = 200, description = "已恢复原始数据"),
        (status = 404, description = "没有可恢复的原始数据")
    )
)]
pub async fn reset_products(initializer: web::Data<DataInitializer>) -> Result<HttpResponse> {
    match initializer.reset_to_original().await {
        Ok(products) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "total_products": products.len()
            },
            "message": "已恢复原始数据"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/import",
    tag = "admin",
    request_body(content = String, description = "{ \"products\": [...] } 格式的 JSON 文档", content_type = "application/json"),
    responses(
        (status = 200, description = "导入成功"),
        (status = 400, description = "文档格式错误，数据未修改")
    )
)]
pub async fn import_products(
    initializer: web::Data<DataInitializer>,
    body: String,
) -> Result<HttpResponse> {
    match initializer.import_document(&body).await {
        Ok(products) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "total_products": products.len()
            },
            "message": format!("成功导入{}个产品", products.len())
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/export",
    tag = "admin",
    responses(
        (status = 200, description = "导出的产品文档", body = ExportDocument)
    )
)]
pub async fn export_products(initializer: web::Data<DataInitializer>) -> Result<HttpResponse> {
    let document = initializer.export();
    Ok(HttpResponse::Ok()
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", document.file_name()),
        ))
        .json(document))
}

#[utoipa::path(
    get,
    path = "/admin/statistics",
    tag = "admin",
    responses(
        (status = 200, description = "产品统计", body = ProductStatistics)
    )
)]
pub async fn product_statistics(initializer: web::Data<DataInitializer>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(initializer.statistics())))
}

/// 导入文档和图片 data URL 可能很大，请求体上限由配置决定
pub fn admin_config(body_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(admin_scope(body_limit));
    }
}

fn admin_scope(body_limit: usize) -> actix_web::Scope {
    web::scope("/admin")
        .app_data(web::PayloadConfig::new(body_limit))
        .app_data(web::JsonConfig::default().limit(body_limit))
        .route("/products", web::get().to(list_products))
        .route("/products", web::post().to(create_product))
        .route("/products/{index}", web::put().to(update_product))
        .route("/products/{index}", web::delete().to(delete_product))
        .route("/products/{index}/toggle", web::post().to(toggle_product_status))
        .route("/load", web::post().to(load_products))
        .route("/reset", web::post().to(reset_products))
        .route("/import", web::post().to(import_products))
        .route("/export", web::get().to(export_products))
        .route("/statistics", web::get().to(product_statistics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::initializer::test_support::initializer_for;
    use crate::storage::test_support::{memory_storage, product};
    use actix_web::{App, http::StatusCode, test};

    const TEST_BODY_LIMIT: usize = 1024 * 1024;

    fn services() -> (web::Data<AdminService>, web::Data<DataInitializer>) {
        let storage = memory_storage();
        storage.save(&[
            product("P001", "智能保温杯", "19.99", true),
            product("P002", "蓝牙音箱", "299", false),
        ]);
        let missing = std::env::temp_dir().join("product-showcase-missing-seed.json");
        let initializer = initializer_for(storage.clone(), &missing);
        (
            web::Data::new(AdminService::new(storage, initializer.clone(), 10)),
            web::Data::new(initializer),
        )
    }

    #[actix_web::test]
    async fn test_list_and_create() {
        let (admin, initializer) = services();
        let app = test::init_service(
            App::new()
                .app_data(admin)
                .app_data(initializer)
                .configure(admin_config(TEST_BODY_LIMIT)),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/products?search=p00").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["pagination"]["total"], 2);

        let req = test::TestRequest::post()
            .uri("/admin/products")
            .set_json(json!({ "id": "P001", "productName": "重复", "price": 1, "workPlan": "装配" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/admin/products")
            .set_json(json!({ "id": "P003", "productName": "无线鼠标", "price": "59.5", "workPlan": "装配" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "产品添加成功！");
        assert_eq!(body["data"]["pagination"]["total"], 3);
    }

    #[actix_web::test]
    async fn test_delete_needs_confirm_and_import_rejects_bad_document() {
        let (admin, initializer) = services();
        let app = test::init_service(
            App::new()
                .app_data(admin)
                .app_data(initializer)
                .configure(admin_config(TEST_BODY_LIMIT)),
        )
        .await;

        let req = test::TestRequest::delete().uri("/admin/products/0").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["deleted"], false);

        let req = test::TestRequest::delete().uri("/admin/products/0?confirm=true").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["deleted"], true);
        assert_eq!(body["data"]["table"]["pagination"]["total"], 1);

        let req = test::TestRequest::post()
            .uri("/admin/import")
            .set_payload(r#"{ "items": [] }"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_large_image_bodies_accepted_up_to_limit() {
        let (admin, initializer) = services();
        let app = test::init_service(
            App::new()
                .app_data(admin)
                .app_data(initializer)
                .configure(admin_config(TEST_BODY_LIMIT)),
        )
        .await;

        // 超过 actix 默认 256KB 的 data URL 图片
        let image = format!("data:image/png;base64,{}", "A".repeat(300 * 1024));
        let document = json!({
            "products": [{
                "id": "P010",
                "productName": "大图商品",
                "price": 9.9,
                "status": true,
                "image": image
            }]
        })
        .to_string();
        assert!(document.len() > 300_000);

        let req = test::TestRequest::post()
            .uri("/admin/import")
            .set_payload(document)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/admin/products?search=P010").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);

        let req = test::TestRequest::post()
            .uri("/admin/products")
            .set_json(json!({
                "id": "P011",
                "productName": "大图表单",
                "price": "1",
                "workPlan": "装配",
                "image": image
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let oversized = "A".repeat(TEST_BODY_LIMIT + 1);
        let req = test::TestRequest::post()
            .uri("/admin/import")
            .set_payload(oversized)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
