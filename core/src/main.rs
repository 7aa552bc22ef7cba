mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();
    let body_limit = config.json_body_limit;

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config).expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config)
        .await
        .expect("Failed to set up database");
    let pool_data = pool.clone();

    if config.is_production() {
        log::info!("Running in production mode");
    }
    log::info!("Listening on {}:{}", config.server_host, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool_data.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::PayloadConfig::new(body_limit))
            .wrap(logger::middleware(body_limit)) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(checker::mount_checker())
            .service(api_stats::mount_stats())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await?;

    db::shutdown(&pool).await;
    Ok(())
}
