use chrono::NaiveDateTime;

/// Sale-date restriction of a statistics query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    /// No explicit bound was given: the last month, evaluated by the database
    /// at query time.
    #[default]
    LastMonth,
    /// At least one explicit bound. Both bounds are inclusive.
    Between {
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    },
}

impl DateRange {
    pub fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        if from.is_none() && to.is_none() {
            DateRange::LastMonth
        } else {
            DateRange::Between { from, to }
        }
    }
}

/// Normalized statistics filter. `None` means "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsFilter {
    pub date_range: DateRange,
    pub payment_method: Option<String>,
    pub category: Option<String>,
    pub employee_id: Option<i32>,
}
