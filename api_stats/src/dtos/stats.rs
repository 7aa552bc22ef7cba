use common::error::{AppError, Res};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Statistics filter as posted by the POS frontend.
///
/// Every field is optional and decoded leniently: values of the wrong JSON
/// type are dropped instead of rejecting the request. Unknown fields are
/// ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatsRequest {
    #[serde(rename = "fechaDesde", alias = "dateFrom", deserialize_with = "lenient_text")]
    pub date_from: Option<String>,
    #[serde(rename = "fechaHasta", alias = "dateTo", deserialize_with = "lenient_text")]
    pub date_to: Option<String>,
    #[serde(rename = "formaDePago", alias = "paymentMethod", deserialize_with = "lenient_text")]
    pub payment_method: Option<String>,
    #[serde(rename = "categoria", alias = "category", deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(rename = "idEmpleado", alias = "employeeId", deserialize_with = "lenient_id")]
    pub employee_id: Option<i64>,
}

impl StatsRequest {
    /// Decodes a request body. An empty body or `null` is an empty filter.
    pub fn from_body(body: &[u8]) -> Res<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice::<Option<Self>>(body)
            .map(Option::unwrap_or_default)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
