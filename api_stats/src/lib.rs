use actix_web::web;

pub mod routes {
    pub mod stats;
}

mod service {
    pub(crate) mod filter;
    pub(crate) mod stats;
}
mod dtos {
    pub(crate) mod stats;
}

pub fn mount_stats() -> actix_web::Scope {
    web::scope("/ventas")
        .service(routes::stats::post_sales_by_payment_method)
        .service(routes::stats::post_sales_by_category)
        .service(routes::stats::post_sales_by_hour)
        .service(routes::stats::post_sales_by_employee)
        .service(routes::stats::post_sales_by_customer)
}
