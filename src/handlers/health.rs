// src/handlers/health.rs
// DOCUMENTATION: Health check handlers
// PURPOSE: Report function status and the state of the shared database pool

use crate::errors::FunctionError;
use crate::pool::PoolCell;
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::time::{Duration, Instant};

/// Whole milliseconds, saturating at u64::MAX
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// GET /health
/// 503 with the initialization failure while the pool is unusable
pub async fn health_check(
    cell: web::Data<&'static PoolCell>,
) -> Result<HttpResponse, FunctionError> {
    let db = cell.get()?;
    let shape = db.shape();

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "cloudfn-dbpool",
        "version": env!("CARGO_PKG_VERSION"),
        "pool": {
            "state": cell.state(),
            "max_open": shape.max_open,
            "max_idle": shape.max_idle,
            "max_idle_time_secs": shape.max_idle_time.as_secs(),
            "size": db.pool().size(),
            "idle": db.pool().num_idle()
        }
    })))
}

/// GET /health/db
/// Fresh liveness probe through the shared pool
pub async fn db_health(cell: web::Data<&'static PoolCell>) -> Result<HttpResponse, FunctionError> {
    let db = cell.get()?;

    let started = Instant::now();
    db.ping().await.map_err(|e| {
        log::warn!("Database liveness probe failed: {}", e);
        FunctionError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "latency_ms": millis(started.elapsed())
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/health/db", web::get().to(db_health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::connect_options;
    use crate::config::db::PoolShape;
    use crate::config::{DbConfig, DbPool};
    use crate::errors::InitError;
    use actix_web::{http::StatusCode, test, App};

    #[::core::prelude::v1::test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_micros(2_500)), 2);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    fn leaked_cell() -> &'static PoolCell {
        Box::leak(Box::new(PoolCell::new()))
    }

    #[actix_web::test]
    async fn test_health_uninitialized_is_503() {
        let cell = leaked_cell();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cell))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "POOL_UNAVAILABLE");
    }

    #[actix_web::test]
    async fn test_health_failed_reports_cause() {
        let cell = leaked_cell();
        let _ = cell
            .get_or_initialize(|| async {
                Err::<DbPool, _>(InitError::MissingConfig {
                    missing: vec!["DB_PASSWORD_DEV"],
                })
            })
            .await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cell))
                .configure(config),
        )
        .await;

        for uri in ["/health", "/health/db"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

            let body: serde_json::Value = test::read_body_json(resp).await;
            let message = body["error"]["message"].as_str().unwrap_or_default();
            assert!(message.contains("DB_PASSWORD_DEV"));
        }
    }

    #[actix_web::test]
    async fn test_health_ready_reports_shape() {
        let cell = leaked_cell();
        let db_config = DbConfig {
            host: "db.local".to_string(),
            port: "5432".to_string(),
            dbname: "app".to_string(),
            user: "svc".to_string(),
            password: "x".to_string(),
        };
        let options = connect_options(&db_config).unwrap();
        cell.get_or_initialize(|| async move {
            Ok::<_, InitError>(DbPool::lazy(options, PoolShape::default()))
        })
        .await
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cell))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["pool"]["state"], "ready");
        assert_eq!(body["pool"]["max_open"], 5);
        assert_eq!(body["pool"]["max_idle"], 3);
        assert_eq!(body["pool"]["max_idle_time_secs"], 300);
        assert_eq!(body["pool"]["size"], 0);
    }
}
