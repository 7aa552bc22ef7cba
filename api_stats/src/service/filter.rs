use chrono::{DateTime, NaiveDate, NaiveDateTime};
use db::dtos::stats::{DateRange, StatsFilter};

use crate::dtos::stats::StatsRequest;

/// Turns a posted filter into the canonical one used by the queries.
///
/// Blank strings mean "no restriction", as do unreadable dates and
/// non-positive employee ids. Without any date bound the range defaults
/// to the last month.
pub fn normalize(req: StatsRequest) -> StatsFilter {
    let date_from = req.date_from.as_deref().and_then(|raw| parse_date("fechaDesde", raw));
    let date_to = req.date_to.as_deref().and_then(|raw| parse_date("fechaHasta", raw));

    StatsFilter {
        date_range: DateRange::new(date_from, date_to),
        payment_method: non_blank(req.payment_method),
        category: non_blank(req.category),
        employee_id: req
            .employee_id
            .filter(|id| *id > 0)
            .and_then(|id| i32::try_from(id).ok()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts RFC 3339 timestamps (wall clock as written, offset ignored), naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps and plain dates (midnight).
fn parse_date(field: &str, raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(at);
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0);
    }

    log::warn!("Ignoring unreadable {} value: {:?}", field, raw);
    None
}
