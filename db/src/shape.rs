//! Post-processing of grouped statistics rows.
//!
//! Totals are coerced to `f64` (missing or unreadable values become 0),
//! display names get their fallbacks and the hourly series is completed
//! to all 24 hours. Rows are never dropped.

use std::collections::HashMap;

use crate::models::stats::{
    CategoryRow, CategorySales, CustomerRow, CustomerSales, EmployeeRow, EmployeeSales, HourRow,
    HourlySales, PaymentMethodRow, PaymentMethodSales,
};

pub const NO_EMPLOYEE_NAME: &str = "Sin nombre";
pub const NO_CUSTOMER_NAME: &str = "Cliente sin nombre";

/// Parses a driver-provided total. Null, unparseable and non-finite values are 0.
pub fn coerce_total(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// `HH:00` label for an hour of the day.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

pub fn payment_methods(rows: Vec<PaymentMethodRow>) -> Vec<PaymentMethodSales> {
    rows.into_iter()
        .map(|row| PaymentMethodSales {
            total: coerce_total(row.total.as_deref()),
            payment_method: row.payment_method,
        })
        .collect()
}

pub fn categories(rows: Vec<CategoryRow>) -> Vec<CategorySales> {
    rows.into_iter()
        .map(|row| CategorySales {
            total: coerce_total(row.total.as_deref()),
            category: row.category,
        })
        .collect()
}

/// One entry per hour, `00:00` to `23:00`, 0 where nothing was sold.
pub fn hours(rows: Vec<HourRow>) -> Vec<HourlySales> {
    let totals: HashMap<String, f64> = rows
        .into_iter()
        .filter_map(|row| {
            let total = coerce_total(row.total.as_deref());
            row.hour.map(|hour| (hour, total))
        })
        .collect();

    (0..24)
        .map(|h| {
            let hour = hour_label(h);
            let total = totals.get(&hour).copied().unwrap_or(0.0);
            HourlySales { hour, total }
        })
        .collect()
}

pub fn employees(rows: Vec<EmployeeRow>) -> Vec<EmployeeSales> {
    rows.into_iter()
        .map(|row| EmployeeSales {
            employee_id: row.employee_id.unwrap_or_default(),
            full_name: non_blank(row.full_name).unwrap_or_else(|| NO_EMPLOYEE_NAME.to_string()),
            total: coerce_total(row.total.as_deref()),
        })
        .collect()
}

pub fn customers(rows: Vec<CustomerRow>) -> Vec<CustomerSales> {
    rows.into_iter()
        .map(|row| {
            let full_name = non_blank(row.full_name).unwrap_or_else(|| match row.customer_id {
                Some(id) => format!("Cliente {}", id),
                None => NO_CUSTOMER_NAME.to_string(),
            });
            CustomerSales {
                customer_id: row.customer_id.unwrap_or_default(),
                full_name,
                total: coerce_total(row.total.as_deref()),
            }
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour_row(hour: &str, total: &str) -> HourRow {
        HourRow {
            hour: Some(hour.to_string()),
            total: Some(total.to_string()),
        }
    }

    #[test]
    fn totals_are_coerced_from_text() {
        assert_eq!(coerce_total(Some("1520.75")), 1520.75);
        assert_eq!(coerce_total(Some(" 3 ")), 3.0);
        assert_eq!(coerce_total(None), 0.0);
        assert_eq!(coerce_total(Some("")), 0.0);
        assert_eq!(coerce_total(Some("abc")), 0.0);
        assert_eq!(coerce_total(Some("NaN")), 0.0);
        assert_eq!(coerce_total(Some("inf")), 0.0);
    }

    #[test]
    fn empty_hourly_result_is_completed_with_zeroes() {
        let shaped = hours(Vec::new());

        assert_eq!(shaped.len(), 24);
        for (h, row) in shaped.iter().enumerate() {
            assert_eq!(row.hour, format!("{:02}:00", h));
            assert_eq!(row.total, 0.0);
        }
        assert_eq!(shaped.first().unwrap().hour, "00:00");
        assert_eq!(shaped.last().unwrap().hour, "23:00");
    }

    #[test]
    fn hourly_totals_land_on_their_hour() {
        let shaped = hours(vec![
            hour_row("09:00", "1200.50"),
            hour_row("13:00", "300"),
            HourRow {
                hour: Some("21:00".into()),
                total: None,
            },
        ]);

        assert_eq!(shaped.len(), 24);
        assert_eq!(shaped[9].total, 1200.5);
        assert_eq!(shaped[13].total, 300.0);
        assert_eq!(shaped[21].total, 0.0);
        assert_eq!(shaped.iter().filter(|r| r.total > 0.0).count(), 2);
    }

    #[test]
    fn payment_method_rows_keep_order_and_names() {
        let shaped = payment_methods(vec![
            PaymentMethodRow {
                payment_method: Some("Efectivo".into()),
                total: Some("900".into()),
            },
            PaymentMethodRow {
                payment_method: Some("Tarjeta".into()),
                total: Some("150.25".into()),
            },
        ]);

        assert_eq!(
            shaped,
            vec![
                PaymentMethodSales {
                    payment_method: Some("Efectivo".into()),
                    total: 900.0
                },
                PaymentMethodSales {
                    payment_method: Some("Tarjeta".into()),
                    total: 150.25
                },
            ]
        );
    }

    #[test]
    fn category_rows_without_total_become_zero() {
        let shaped = categories(vec![CategoryRow {
            category: Some("Bebidas".into()),
            total: None,
        }]);

        assert_eq!(shaped[0].category.as_deref(), Some("Bebidas"));
        assert_eq!(shaped[0].total, 0.0);
    }

    #[test]
    fn employee_name_resolved_in_sql_is_kept() {
        let shaped = employees(vec![EmployeeRow {
            employee_id: Some(42),
            full_name: Some("jperez".into()),
            total: Some("10".into()),
        }]);

        assert_eq!(shaped[0].employee_id, 42);
        assert_eq!(shaped[0].full_name, "jperez");
    }

    #[test]
    fn employee_without_any_name_falls_back() {
        let shaped = employees(vec![EmployeeRow {
            employee_id: Some(7),
            full_name: None,
            total: Some("10".into()),
        }]);

        assert_eq!(shaped[0].full_name, NO_EMPLOYEE_NAME);
    }

    #[test]
    fn anonymous_customers_do_not_fail() {
        let shaped = customers(vec![
            CustomerRow {
                customer_id: None,
                full_name: None,
                total: Some("55.5".into()),
            },
            CustomerRow {
                customer_id: Some(17),
                full_name: None,
                total: Some("20".into()),
            },
        ]);

        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].customer_id, 0);
        assert_eq!(shaped[0].full_name, NO_CUSTOMER_NAME);
        assert_eq!(shaped[0].total, 55.5);
        assert_eq!(shaped[1].full_name, "Cliente 17");
    }

    #[test]
    fn shaped_rows_serialize_with_frontend_field_names() {
        let json = serde_json::to_value(customers(vec![CustomerRow {
            customer_id: Some(3),
            full_name: Some("Ana Gómez".into()),
            total: Some("99.9".into()),
        }]))
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!([{ "idCliente": 3, "nombreCompleto": "Ana Gómez", "total": 99.9 }])
        );

        let json = serde_json::to_value(&hours(Vec::new())[0]).unwrap();
        assert_eq!(json, serde_json::json!({ "hora": "00:00", "total": 0.0 }));
    }
}
