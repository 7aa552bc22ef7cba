use std::{sync::Arc, time::Duration};

use actix_web::{Responder, dev::HttpServiceFactory, get, http::StatusCode, web};
use chrono::Utc;
use common::{env_config::Config, error::Res, http::Success};
use serde::Serialize;
use sqlx::PgPool;
use tokio::time::timeout;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum HealthResponse {
    Ok {
        status: &'static str,
        message: &'static str,
        timestamp: String,
        environment: String,
    },
    Error {
        status: &'static str,
        message: &'static str,
        error: String,
    },
}

/// Reports whether the server can reach the database.
///
/// Answers 200 when a pooled connection can run `SELECT 1` within five
/// seconds, 503 otherwise.
#[get("/health")]
async fn health(
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let outcome = match timeout(PING_TIMEOUT, db::ping(&pool)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err(format!("no response after {}s", PING_TIMEOUT.as_secs())),
    };

    match outcome {
        Ok(()) => Success::with_status(
            StatusCode::OK,
            HealthResponse::Ok {
                status: "ok",
                message: "Servidor funcionando correctamente",
                timestamp: Utc::now().to_rfc3339(),
                environment: config.environment.clone(),
            },
        ),
        Err(error) => {
            log::error!("Health Check Failed: {}", error);
            Success::with_status(
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse::Error {
                    status: "error",
                    message: "Error de conexión a BD",
                    error,
                },
            )
        }
    }
}

pub fn mount_checker() -> impl HttpServiceFactory {
    health
}
