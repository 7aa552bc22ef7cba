//! WHERE/JOIN composition for the sales statistics queries.
//!
//! Every statistics query reads from `public.venta v`. The filter decides
//! which conditions apply and which dimension tables have to be joined;
//! each aggregation then merges its own mandatory joins with these.

use chrono::NaiveDateTime;

use crate::dtos::stats::{DateRange, StatsFilter};

/// Dimension joins reachable from `venta v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    PaymentMethod,
    SaleLine,
    Product,
    ProductType,
    /// The user who registered the sale.
    Employee,
    /// The user who bought, if any.
    Customer,
}

/// sale line -> product -> product type, in join order.
pub const CATEGORY_CHAIN: [Join; 3] = [Join::SaleLine, Join::Product, Join::ProductType];

impl Join {
    pub fn sql(self) -> &'static str {
        match self {
            Join::PaymentMethod => {
                "INNER JOIN public.forma_de_pago fp ON v.idformadepago = fp.idformadepago"
            }
            Join::SaleLine => "INNER JOIN public.detalle_venta dv ON v.idventa = dv.idventa",
            Join::Product => "INNER JOIN public.producto p ON dv.idproducto = p.idproducto",
            Join::ProductType => {
                "INNER JOIN public.tipo_producto tp ON p.idtipoproducto = tp.idtipoproducto"
            }
            Join::Employee => "INNER JOIN public.usuario u ON v.idempleado = u.idusuario",
            Join::Customer => "LEFT JOIN public.usuario u ON v.idusuario = u.idusuario",
        }
    }
}

/// Where an aggregation's mandatory joins go relative to the filter's joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPlacement {
    /// Mandatory joins the filter did not already request, then the filter's joins.
    Leading,
    /// The filter's joins minus the mandatory ones, then the mandatory joins.
    Trailing,
}

/// A bound value for one `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Timestamp(NaiveDateTime),
    Text(String),
    Int(i32),
}

pub const NOT_VOIDED: &str = "v.anulada = 0";
pub const LAST_MONTH: &str = "v.fechaventa >= CURRENT_DATE - INTERVAL '1 month'";

/// Conditions, joins and positional parameters derived from a filter.
///
/// The n-th `$n` placeholder in `conditions` is bound to `params[n - 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    conditions: Vec<String>,
    joins: Vec<Join>,
    params: Vec<Param>,
}

impl PredicateSet {
    pub fn compose(filter: &StatsFilter) -> Self {
        let mut set = PredicateSet::default();

        set.conditions.push(NOT_VOIDED.to_string());

        match filter.date_range {
            DateRange::Between { from, to } if from.is_some() || to.is_some() => {
                if let Some(from) = from {
                    set.push_bound("v.fechaventa >=", Param::Timestamp(from));
                }
                if let Some(to) = to {
                    set.push_bound("v.fechaventa <=", Param::Timestamp(to));
                }
            }
            _ => set.conditions.push(LAST_MONTH.to_string()),
        }

        if let Some(payment_method) = &filter.payment_method {
            set.require(Join::PaymentMethod);
            set.push_bound("fp.nformadepago =", Param::Text(payment_method.clone()));
        }

        if let Some(category) = &filter.category {
            CATEGORY_CHAIN.iter().for_each(|join| set.require(*join));
            set.push_bound("tp.ntipoproducto =", Param::Text(category.clone()));
        }

        if let Some(employee_id) = filter.employee_id {
            set.push_bound("v.idempleado =", Param::Int(employee_id));
        }

        debug_assert_eq!(
            set.conditions.iter().map(|c| placeholder_count(c)).sum::<usize>(),
            set.params.len(),
            "placeholders and bound parameters out of step"
        );

        set
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// `WHERE a AND b ...`, or an empty string when there are no conditions.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Merges the filter's joins with an aggregation's mandatory joins,
    /// keeping a single copy of each.
    pub fn merged_joins(&self, mandatory: &[Join], placement: JoinPlacement) -> Vec<Join> {
        let mut merged = Vec::with_capacity(self.joins.len() + mandatory.len());
        match placement {
            JoinPlacement::Leading => {
                merged.extend(mandatory.iter().filter(|j| !self.joins.contains(j)));
                merged.extend(self.joins.iter());
            }
            JoinPlacement::Trailing => {
                merged.extend(self.joins.iter().filter(|j| !mandatory.contains(j)));
                merged.extend(mandatory.iter());
            }
        }
        merged
    }

    fn require(&mut self, join: Join) {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
    }

    fn push_bound(&mut self, lhs: &str, param: Param) {
        self.params.push(param);
        self.conditions.push(format!("{} ${}", lhs, self.params.len()));
    }
}

/// Counts `$n` placeholders in a SQL fragment.
pub fn placeholder_count(sql: &str) -> usize {
    sql.as_bytes()
        .windows(2)
        .filter(|w| w[0] == b'$' && w[1].is_ascii_digit())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_filter_excludes_voided_sales_and_defaults_to_last_month() {
        let set = PredicateSet::compose(&StatsFilter::default());

        assert_eq!(set.conditions(), [NOT_VOIDED, LAST_MONTH]);
        assert!(set.joins().is_empty());
        assert!(set.params().is_empty());
        assert_eq!(
            set.where_clause(),
            "WHERE v.anulada = 0 AND v.fechaventa >= CURRENT_DATE - INTERVAL '1 month'"
        );
    }

    #[test]
    fn explicit_bounds_replace_the_implicit_month() {
        let filter = StatsFilter {
            date_range: DateRange::new(Some(at(2024, 5, 1)), Some(at(2024, 5, 31))),
            ..Default::default()
        };

        let set = PredicateSet::compose(&filter);

        assert_eq!(
            set.conditions(),
            [NOT_VOIDED, "v.fechaventa >= $1", "v.fechaventa <= $2"]
        );
        assert_eq!(
            set.params(),
            [
                Param::Timestamp(at(2024, 5, 1)),
                Param::Timestamp(at(2024, 5, 31))
            ]
        );
    }

    #[test]
    fn a_single_bound_is_enough_to_drop_the_implicit_month() {
        let filter = StatsFilter {
            date_range: DateRange::new(None, Some(at(2024, 1, 1))),
            ..Default::default()
        };

        let set = PredicateSet::compose(&filter);

        assert_eq!(set.conditions(), [NOT_VOIDED, "v.fechaventa <= $1"]);
        assert!(!set.conditions().iter().any(|c| c == LAST_MONTH));
    }

    #[test]
    fn boundless_between_still_gets_the_implicit_month() {
        let filter = StatsFilter {
            date_range: DateRange::Between { from: None, to: None },
            ..Default::default()
        };

        let set = PredicateSet::compose(&filter);

        assert_eq!(set.conditions(), [NOT_VOIDED, LAST_MONTH]);
    }

    #[test]
    fn payment_method_filter_joins_the_payment_dimension() {
        let filter = StatsFilter {
            payment_method: Some("Efectivo".into()),
            ..Default::default()
        };

        let set = PredicateSet::compose(&filter);

        assert_eq!(
            set.conditions(),
            [NOT_VOIDED, LAST_MONTH, "fp.nformadepago = $1"]
        );
        assert_eq!(set.joins(), [Join::PaymentMethod]);
        assert_eq!(set.params(), [Param::Text("Efectivo".into())]);
    }

    #[test]
    fn all_filters_number_placeholders_in_rule_order() {
        let filter = StatsFilter {
            date_range: DateRange::new(Some(at(2024, 2, 1)), Some(at(2024, 2, 29))),
            payment_method: Some("Tarjeta".into()),
            category: Some("Bebidas".into()),
            employee_id: Some(42),
        };

        let set = PredicateSet::compose(&filter);

        assert_eq!(
            set.conditions(),
            [
                NOT_VOIDED,
                "v.fechaventa >= $1",
                "v.fechaventa <= $2",
                "fp.nformadepago = $3",
                "tp.ntipoproducto = $4",
                "v.idempleado = $5",
            ]
        );
        assert_eq!(
            set.joins(),
            [
                Join::PaymentMethod,
                Join::SaleLine,
                Join::Product,
                Join::ProductType
            ]
        );
        assert_eq!(set.params().len(), 5);
        assert_eq!(set.params()[4], Param::Int(42));

        let placeholders: usize = set.conditions().iter().map(|c| placeholder_count(c)).sum();
        assert_eq!(placeholders, set.params().len());
    }

    #[test]
    fn leading_merge_skips_joins_the_filter_already_has() {
        let filter = StatsFilter {
            payment_method: Some("Efectivo".into()),
            category: Some("Bebidas".into()),
            ..Default::default()
        };
        let set = PredicateSet::compose(&filter);

        let merged = set.merged_joins(&[Join::PaymentMethod], JoinPlacement::Leading);

        assert_eq!(
            merged,
            [
                Join::PaymentMethod,
                Join::SaleLine,
                Join::Product,
                Join::ProductType
            ]
        );
    }

    #[test]
    fn leading_merge_puts_missing_mandatory_joins_first() {
        let filter = StatsFilter {
            category: Some("Bebidas".into()),
            ..Default::default()
        };
        let set = PredicateSet::compose(&filter);

        let merged = set.merged_joins(&[Join::PaymentMethod], JoinPlacement::Leading);

        assert_eq!(merged[0], Join::PaymentMethod);
        assert_eq!(&merged[1..], CATEGORY_CHAIN);
    }

    #[test]
    fn trailing_merge_keeps_one_copy_of_the_category_chain() {
        let filter = StatsFilter {
            payment_method: Some("Efectivo".into()),
            category: Some("Bebidas".into()),
            ..Default::default()
        };
        let set = PredicateSet::compose(&filter);

        let merged = set.merged_joins(&CATEGORY_CHAIN, JoinPlacement::Trailing);

        assert_eq!(
            merged,
            [
                Join::PaymentMethod,
                Join::SaleLine,
                Join::Product,
                Join::ProductType
            ]
        );
        for join in CATEGORY_CHAIN {
            assert_eq!(merged.iter().filter(|j| **j == join).count(), 1);
        }
    }

    #[test]
    fn placeholder_count_ignores_lone_dollar_signs() {
        assert_eq!(placeholder_count("a = $1 AND b = $12"), 2);
        assert_eq!(placeholder_count("price = '$'"), 0);
        assert_eq!(placeholder_count(LAST_MONTH), 0);
    }
}
