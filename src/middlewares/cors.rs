use actix_cors::Cors;

/// 前台与管理页面可能来自任意本地来源（file://、dev server），不限制 Origin
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["Content-Disposition"])
        .max_age(3600)
}
