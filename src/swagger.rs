use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;
use crate::services::{CartActionOutcome, DataSource, DeleteOutcome, ToggleOutcome};
use crate::utils::PaginationInfo;
use crate::views::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::admin::list_products,
        handlers::admin::load_products,
        handlers::admin::create_product,
        handlers::admin::update_product,
        handlers::admin::delete_product,
        handlers::admin::toggle_product_status,
        handlers::admin::reset_products,
        handlers::admin::import_products,
        handlers::admin::export_products,
        handlers::admin::product_statistics,
        handlers::storefront::get_storefront,
        handlers::storefront::load_storefront,
        handlers::storefront::refresh_storefront,
        handlers::storefront::list_online_products,
        handlers::storefront::open_modal,
        handlers::storefront::get_modal,
        handlers::storefront::close_modal,
        handlers::storefront::update_quantity,
        handlers::storefront::update_customization,
        handlers::storefront::update_process,
        handlers::storefront::confirm_customization,
        handlers::storefront::add_to_cart,
        handlers::storefront::buy_now,
        handlers::cart::get_cart,
        handlers::cart::load_cart,
        handlers::cart::add_item,
        handlers::cart::remove_item,
        handlers::cart::increment_item,
        handlers::cart::decrement_item,
        handlers::cart::set_item_quantity,
        handlers::cart::select_item,
        handlers::cart::select_all,
        handlers::cart::purchase_selected,
        handlers::cart::delete_selected,
    ),
    components(
        schemas(
            Product,
            ProductForm,
            AdminQuery,
            DeleteQuery,
            AdminRow,
            AdminTableView,
            PaginationInfo,
            DeleteOutcome,
            ToggleOutcome,
            ExportDocument,
            ProductStatistics,
            CategoryStats,
            DataSource,
            ImageContent,
            ProductCard,
            StorefrontView,
            ProductModalView,
            QuantityRequest,
            ProcessKind,
            ProcessUpdateRequest,
            CustomizationPlan,
            TimedParams,
            WeightParams,
            PurchaseConfirmation,
            CartItem,
            AddCartItemRequest,
            SetQuantityRequest,
            SelectRequest,
            CartLineView,
            CartView,
            CartActionOutcome,
            ApiError,
        )
    ),
    tags(
        (name = "admin", description = "Product administration API"),
        (name = "storefront", description = "Storefront browsing and purchase API"),
        (name = "cart", description = "Shopping cart API"),
    ),
    info(
        title = "Product Showcase API",
        version = "0.1.0",
        description = "Product catalog, storefront and cart REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_scope() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.starts_with("/admin/")));
        assert!(paths.iter().any(|p| p.starts_with("/storefront")));
        assert!(paths.iter().any(|p| p.starts_with("/cart")));
    }
}
