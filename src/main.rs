use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::time::Duration;

use product_showcase::{
    config::Config,
    handlers,
    middlewares::create_cors,
    notify::ChangeNotifier,
    services::*,
    storage::{ProductStorage, StorageKeys, create_store},
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().map_err(std::io::Error::other)?;

    // 创建存储
    let store = create_store(&config.storage).map_err(std::io::Error::other)?;
    let notifier = ChangeNotifier::new();
    let storage = ProductStorage::new(store, StorageKeys::from(&config.storage), notifier.clone());
    log::info!(
        "Using {:?} storage at {}",
        config.storage.backend,
        config.storage.data_dir
    );

    // 创建服务
    let initializer = DataInitializer::new(storage.clone(), &config.seed);
    let admin_service = AdminService::new(storage.clone(), initializer.clone(), config.admin.page_size);
    let storefront_service = StorefrontService::new(storage.clone(), initializer.clone());
    let cart_service = CartService::new(storage.clone());

    // 首次加载数据（种子 → 已保存数据 → 示例数据）
    let initial = storefront_service.load().await;
    log::info!("Storefront ready with {} listed products", initial.cards.len());

    tasks::spawn_all(
        notifier,
        storefront_service.clone(),
        Duration::from_secs(config.storefront.refresh_interval_secs),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(initializer.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(storefront_service.clone()))
            .app_data(web::Data::new(cart_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::admin_config(config.admin.max_body_bytes))
                    .configure(handlers::storefront_config)
                    .configure(handlers::cart_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
