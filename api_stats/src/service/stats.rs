use common::error::Res;
use db::models::stats::{
    CategorySales, CustomerSales, EmployeeSales, HourlySales, PaymentMethodSales,
};
use sqlx::PgPool;

use crate::{dtos::stats::StatsRequest, service::filter};

// Each call normalizes the posted filter and runs exactly one aggregation.

pub async fn sales_by_payment_method(
    pool: &PgPool,
    req: StatsRequest,
) -> Res<Vec<PaymentMethodSales>> {
    db::stats::sales_by_payment_method(pool, &filter::normalize(req)).await
}

pub async fn sales_by_category(pool: &PgPool, req: StatsRequest) -> Res<Vec<CategorySales>> {
    db::stats::sales_by_category(pool, &filter::normalize(req)).await
}

pub async fn sales_by_hour(pool: &PgPool, req: StatsRequest) -> Res<Vec<HourlySales>> {
    db::stats::sales_by_hour(pool, &filter::normalize(req)).await
}

pub async fn sales_by_employee(pool: &PgPool, req: StatsRequest) -> Res<Vec<EmployeeSales>> {
    db::stats::sales_by_employee(pool, &filter::normalize(req)).await
}

pub async fn sales_by_customer(pool: &PgPool, req: StatsRequest) -> Res<Vec<CustomerSales>> {
    db::stats::sales_by_customer(pool, &filter::normalize(req)).await
}
