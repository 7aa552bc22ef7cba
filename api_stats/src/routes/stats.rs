use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{error::Res, http::Success};
use sqlx::PgPool;

use crate::{dtos::stats::StatsRequest, service};

/// Sales totals grouped by payment method, highest first.
///
/// # Input
/// - `body`: optional JSON filter
///   `{ fechaDesde?, fechaHasta?, formaDePago?, categoria?, idEmpleado? }`.
///   Without dates the last month is used.
///
/// # Output
/// - Success: `[{ "formaPago": "Efectivo", "total": 1520.5 }, ...]`
/// - Error: 400 for a body that is not JSON, 409 with
///   `{ "error": "Error al obtener ventas por forma de pago." }` when the query fails
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/ventas/obtener-ventas-por-forma-pago', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ fechaDesde: '2024-05-01', fechaHasta: '2024-05-31' })
/// });
/// const rows = await response.json();
/// ```
#[post("/obtener-ventas-por-forma-pago")]
pub async fn post_sales_by_payment_method(
    pool: web::Data<Arc<PgPool>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    let req = StatsRequest::from_body(&body)?;
    let rows = service::stats::sales_by_payment_method(&pool, req).await?;
    Success::ok(rows)
}

/// Sale-line subtotals grouped by product type (`categoria`), highest first.
#[post("/obtener-ventas-por-categoria")]
pub async fn post_sales_by_category(
    pool: web::Data<Arc<PgPool>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    let req = StatsRequest::from_body(&body)?;
    let rows = service::stats::sales_by_category(&pool, req).await?;
    Success::ok(rows)
}

/// Sales totals per hour of day. Always 24 entries, `00:00` to `23:00`.
#[post("/obtener-ventas-por-hora")]
pub async fn post_sales_by_hour(
    pool: web::Data<Arc<PgPool>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    let req = StatsRequest::from_body(&body)?;
    let rows = service::stats::sales_by_hour(&pool, req).await?;
    Success::ok(rows)
}

#[post("/obtener-ventas-por-empleado")]
pub async fn post_sales_by_employee(
    pool: web::Data<Arc<PgPool>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    let req = StatsRequest::from_body(&body)?;
    let rows = service::stats::sales_by_employee(&pool, req).await?;
    Success::ok(rows)
}

/// Sales totals per customer. Anonymous sales are grouped under id 0.
#[post("/obtener-ventas-por-cliente")]
pub async fn post_sales_by_customer(
    pool: web::Data<Arc<PgPool>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    let req = StatsRequest::from_body(&body)?;
    let rows = service::stats::sales_by_customer(&pool, req).await?;
    Success::ok(rows)
}
