use actix_cors::Cors;
use actix_web::http::header;

/// `*` lets any origin through, anything else is matched exactly.
pub fn middleware(origin: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .max_age(3600);

    if origin.trim() == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(origin)
    }
}
