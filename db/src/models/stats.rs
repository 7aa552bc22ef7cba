use serde::Serialize;

// Raw grouped rows. Totals arrive as text and are coerced by `crate::shape`.

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentMethodRow {
    pub payment_method: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub category: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HourRow {
    pub hour: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeRow {
    pub employee_id: Option<i32>,
    pub full_name: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub customer_id: Option<i32>,
    pub full_name: Option<String>,
    pub total: Option<String>,
}

// Shaped rows, serialized with the field names the POS frontend reads.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodSales {
    #[serde(rename = "formaPago")]
    pub payment_method: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySales {
    /// `HH:00`
    #[serde(rename = "hora")]
    pub hour: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSales {
    #[serde(rename = "idEmpleado")]
    pub employee_id: i32,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSales {
    #[serde(rename = "idCliente")]
    pub customer_id: i32,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
    pub total: f64,
}
