// src/main.rs
// DOCUMENTATION: Function instance entry point
// PURPOSE: Cold-start initialization of the shared pool, then serve invocations

mod config;
mod errors;
mod handlers;
mod pool;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::AppConfig;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load runtime configuration
    let config = AppConfig::from_env();

    // 2. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting cloudfn-dbpool instance...");
    log::info!("Environment: {}", config.environment);

    // 3. Only an explicit ENVIRONMENT=development reads .env (or ENV_FILE);
    // deployed instances take their variables from the platform
    if config.is_development() {
        if let Err(e) = config::load_local_environment(config.env_file.as_deref()) {
            log::error!("Error loading .env file: {}", e);
            std::process::exit(1);
        }
    }

    // 4. Cold start: build the instance pool once. A failure is only logged;
    // invocations then get 503 until the platform recycles the instance.
    match pool::initialize().await {
        Ok(db) => log::info!(
            "Instance pool ready (max_open={}, max_idle={})",
            db.shape().max_open,
            db.shape().max_idle
        ),
        Err(e) => log::error!(
            "Instance pool unavailable (state={:?}): {}",
            pool::instance_state(),
            e
        ),
    }

    // 5. Serve invocations on this instance
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    log::info!("Server Address: {}", server_addr);

    let cell = pool::instance_pool();
    HttpServer::new(move || {
        App::new()
            // Every worker shares the one instance pool
            .app_data(web::Data::new(cell))
            .wrap(Logger::default())
            .configure(handlers::health_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
