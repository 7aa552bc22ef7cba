use actix_web::dev::Payload;
use actix_web::error::PayloadError;
use actix_web::web::{self, Bytes};
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use colored::Colorize;
use futures::StreamExt;
use futures::future::{LocalBoxFuture, Ready, ready};
use log::{debug, info, warn};
use serde_json::Value;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Instant;

type BodyStream = Pin<Box<dyn futures::Stream<Item = Result<Bytes, PayloadError>>>>;

/// Logs one line per request: status, method, path and elapsed time.
/// With `debug` enabled the JSON request body is logged as well, as long as
/// it fits in `body_limit` bytes.
pub struct LoggerMiddleware {
    body_limit: usize,
}

impl LoggerMiddleware {
    pub fn new(body_limit: usize) -> Self {
        Self { body_limit }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
            body_limit: self.body_limit,
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
    body_limit: usize,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let srv = Rc::clone(&self.service);
        let body_limit = self.body_limit;

        Box::pin(async move {
            if log::log_enabled!(log::Level::Debug) {
                match capture_body(&mut req, body_limit).await? {
                    Some(head) if !head.is_empty() => {
                        let body = serde_json::from_slice::<Value>(&head)
                            .map(|v| v.to_string())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&head).into_owned());
                        debug!("  Request: {}", body.bright_green());
                    }
                    Some(_) => {}
                    None => debug!("  Request: <body over {} bytes>", body_limit),
                }
            }

            let res = srv.call(req).await?;

            let status_code = res.status().as_u16();
            let elapsed_ms = started.elapsed().as_millis();

            let colored_status = match status_code {
                200..=299 => status_code.to_string().green(),
                300..=399 => status_code.to_string().yellow(),
                400..=499 => status_code.to_string().bright_red(),
                _ => status_code.to_string().red(),
            };

            let colored_method = match method.as_str() {
                "GET" => method.blue(),
                "POST" => method.yellow(),
                _ => method.normal(),
            };

            let line = format!(
                "[{}] {} {} {}",
                colored_status,
                colored_method,
                path.bright_white(),
                format!("({}ms)", elapsed_ms).bright_black(),
            );
            if status_code >= 500 {
                warn!("{}", line);
            } else {
                info!("{}", line);
            }

            Ok(res)
        })
    }
}

/// Copies the request body out of the payload and puts it back for the
/// handler. `None` when the body is larger than `limit`.
async fn capture_body(req: &mut ServiceRequest, limit: usize) -> Result<Option<Bytes>, Error> {
    let mut payload = req.take_payload();
    let (head, complete) = read_capped(&mut payload, limit).await?;
    let captured = complete.then(|| head.clone());
    req.set_payload(replay(head, payload));
    Ok(captured)
}

/// Buffers the payload until it ends or grows past `limit` bytes.
/// Returns the buffered bytes and whether the whole body was read.
async fn read_capped(payload: &mut Payload, limit: usize) -> Result<(Bytes, bool), Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        body.extend_from_slice(&chunk?);
        if body.len() > limit {
            return Ok((body.freeze(), false));
        }
    }
    Ok((body.freeze(), true))
}

/// Buffered bytes followed by whatever is left unread in `rest`.
fn replay(head: Bytes, rest: Payload) -> Payload {
    let stream: BodyStream = futures::stream::once(async move { Ok::<Bytes, PayloadError>(head) })
        .chain(rest)
        .boxed_local();
    Payload::from(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test};

    #[actix_web::test]
    async fn passes_requests_and_bodies_through() {
        let app = test::init_service(App::new().wrap(LoggerMiddleware::new(1024)).route(
            "/echo",
            web::post().to(|body: Bytes| async move { HttpResponse::Ok().body(body) }),
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/echo")
            .set_payload(r#"{"formaDePago":"Efectivo"}"#)
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, Bytes::from_static(br#"{"formaDePago":"Efectivo"}"#));
    }

    #[actix_web::test]
    async fn keeps_error_statuses() {
        let app = test::init_service(App::new().wrap(LoggerMiddleware::new(1024)).route(
            "/boom",
            web::get().to(|| async { HttpResponse::ServiceUnavailable().finish() }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/boom").to_request()).await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    fn chunked(parts: &'static [&'static [u8]]) -> Payload {
        let stream: BodyStream =
            futures::stream::iter(parts.iter().map(|p| Ok::<_, PayloadError>(Bytes::from_static(*p))))
                .boxed_local();
        Payload::from(stream)
    }

    #[actix_web::test]
    async fn reads_small_bodies_completely() {
        let mut payload = chunked(&[b"{\"categoria\":", b"\"Bebidas\"}"]);

        let (head, complete) = read_capped(&mut payload, 64).await.unwrap();

        assert!(complete);
        assert_eq!(head, Bytes::from_static(b"{\"categoria\":\"Bebidas\"}"));
    }

    #[actix_web::test]
    async fn stops_buffering_past_the_limit_and_replays_everything() {
        let mut payload = chunked(&[b"0123", b"4567", b"89ab", b"cdef"]);

        let (head, complete) = read_capped(&mut payload, 6).await.unwrap();
        assert!(!complete);
        assert_eq!(head, Bytes::from_static(b"01234567"));

        let mut replayed = replay(head, payload);
        let (all, complete) = read_capped(&mut replayed, usize::MAX).await.unwrap();
        assert!(complete);
        assert_eq!(all, Bytes::from_static(b"0123456789abcdef"));
    }

    #[actix_web::test]
    async fn captured_bodies_still_reach_the_handler() {
        let mut req = test::TestRequest::post()
            .set_payload(r#"{"idEmpleado":7}"#)
            .to_srv_request();

        let captured = capture_body(&mut req, 1024).await.unwrap();
        assert_eq!(captured, Some(Bytes::from_static(br#"{"idEmpleado":7}"#)));

        let mut payload = req.take_payload();
        let (body, _) = read_capped(&mut payload, usize::MAX).await.unwrap();
        assert_eq!(body, Bytes::from_static(br#"{"idEmpleado":7}"#));
    }

    #[actix_web::test]
    async fn oversized_bodies_are_not_captured_but_still_forwarded() {
        let mut req = test::TestRequest::post()
            .set_payload(vec![b'x'; 64])
            .to_srv_request();

        assert_eq!(capture_body(&mut req, 16).await.unwrap(), None);

        let mut payload = req.take_payload();
        let (body, _) = read_capped(&mut payload, usize::MAX).await.unwrap();
        assert_eq!(body.len(), 64);
    }
}
