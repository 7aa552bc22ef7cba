use common::error::{AppError, Res};
use sqlx::{
    Executor, PgPool, Postgres,
    postgres::{PgArguments, PgRow},
    query::QueryAs,
};

use crate::{
    dtos::stats::StatsFilter,
    models::stats::{
        CategoryRow, CategorySales, CustomerRow, CustomerSales, EmployeeRow, EmployeeSales,
        HourRow, HourlySales, PaymentMethodRow, PaymentMethodSales,
    },
    predicate::{CATEGORY_CHAIN, Join, JoinPlacement, Param, PredicateSet},
    shape,
};

/// The grouped-sum statistics over `venta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    PaymentMethod,
    Category,
    Hour,
    Employee,
    Customer,
}

const SALE_TOTAL: &str = "COALESCE(SUM(v.montototal), 0)";
const LINE_TOTAL: &str = "COALESCE(SUM(dv.subtotalventa), 0)";
const HOUR_OF_SALE: &str = "TO_CHAR(v.fechaventa, 'HH24:00')";

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::PaymentMethod,
        Aggregation::Category,
        Aggregation::Hour,
        Aggregation::Employee,
        Aggregation::Customer,
    ];

    /// What is being fetched, used in log lines.
    pub fn context(self) -> &'static str {
        match self {
            Aggregation::PaymentMethod => "ventas por forma de pago",
            Aggregation::Category => "ventas por categoría",
            Aggregation::Hour => "ventas por hora",
            Aggregation::Employee => "ventas por empleado",
            Aggregation::Customer => "ventas por cliente",
        }
    }

    /// Message returned to the client when the query fails.
    pub fn failure_message(self) -> String {
        format!("Error al obtener {}.", self.context())
    }

    fn mandatory_joins(self) -> (&'static [Join], JoinPlacement) {
        match self {
            Aggregation::PaymentMethod => (&[Join::PaymentMethod], JoinPlacement::Leading),
            Aggregation::Category => (&CATEGORY_CHAIN, JoinPlacement::Trailing),
            Aggregation::Hour => (&[], JoinPlacement::Leading),
            Aggregation::Employee => (&[Join::Employee], JoinPlacement::Leading),
            Aggregation::Customer => (&[Join::Customer], JoinPlacement::Leading),
        }
    }

    fn total_expr(self) -> &'static str {
        match self {
            Aggregation::Category => LINE_TOTAL,
            _ => SALE_TOTAL,
        }
    }

    fn key_columns(self) -> &'static str {
        match self {
            Aggregation::PaymentMethod => "fp.nformadepago AS payment_method",
            Aggregation::Category => "tp.ntipoproducto AS category",
            Aggregation::Hour => "TO_CHAR(v.fechaventa, 'HH24:00') AS hour",
            Aggregation::Employee => {
                "v.idempleado::int4 AS employee_id,
          COALESCE(u.nombre || ' ' || u.apellido, u.nombre, u.nusuario, 'Sin nombre') AS full_name"
            }
            Aggregation::Customer => {
                "v.idusuario::int4 AS customer_id,
          CASE
            WHEN u.nombre IS NOT NULL AND u.apellido IS NOT NULL THEN u.nombre || ' ' || u.apellido
            WHEN u.nombre IS NOT NULL THEN u.nombre
            WHEN u.nusuario IS NOT NULL THEN u.nusuario
            ELSE 'Cliente ' || v.idusuario::text
          END AS full_name"
            }
        }
    }

    fn group_by(self) -> &'static str {
        match self {
            Aggregation::PaymentMethod => "fp.nformadepago",
            Aggregation::Category => "tp.ntipoproducto",
            Aggregation::Hour => HOUR_OF_SALE,
            Aggregation::Employee => "v.idempleado, u.nombre, u.apellido, u.nusuario",
            Aggregation::Customer => "v.idusuario, u.nombre, u.apellido, u.nusuario",
        }
    }

    fn order_by(self) -> String {
        let total = self.total_expr();
        match self {
            Aggregation::PaymentMethod => format!("{total} DESC, fp.nformadepago ASC"),
            Aggregation::Category => format!("{total} DESC, tp.ntipoproducto ASC"),
            Aggregation::Hour => format!("{HOUR_OF_SALE} ASC"),
            Aggregation::Employee => format!("{total} DESC, v.idempleado ASC"),
            Aggregation::Customer => format!("{total} DESC, v.idusuario ASC NULLS LAST"),
        }
    }

    /// Joins this aggregation runs with, after merging its mandatory ones.
    pub fn joins(self, predicates: &PredicateSet) -> Vec<Join> {
        let (mandatory, placement) = self.mandatory_joins();
        predicates.merged_joins(mandatory, placement)
    }

    /// Full statement text. Parameters are `predicates.params()`, in order.
    pub fn sql(self, predicates: &PredicateSet) -> String {
        let joins = self
            .joins(predicates)
            .into_iter()
            .map(Join::sql)
            .collect::<Vec<_>>()
            .join("\n        ");

        format!(
            "
        SELECT
          {keys},
          {total}::text AS total
        FROM public.venta v
        {joins}
        {where_clause}
        GROUP BY {group_by}
        ORDER BY {order_by}
      ",
            keys = self.key_columns(),
            total = self.total_expr(),
            joins = joins,
            where_clause = predicates.where_clause(),
            group_by = self.group_by(),
            order_by = self.order_by(),
        )
    }
}

pub async fn sales_by_payment_method(
    pool: &PgPool,
    filter: &StatsFilter,
) -> Res<Vec<PaymentMethodSales>> {
    let rows = fetch_grouped::<PaymentMethodRow>(pool, Aggregation::PaymentMethod, filter).await?;
    Ok(shape::payment_methods(rows))
}

pub async fn sales_by_category(pool: &PgPool, filter: &StatsFilter) -> Res<Vec<CategorySales>> {
    let rows = fetch_grouped::<CategoryRow>(pool, Aggregation::Category, filter).await?;
    Ok(shape::categories(rows))
}

pub async fn sales_by_hour(pool: &PgPool, filter: &StatsFilter) -> Res<Vec<HourlySales>> {
    let rows = fetch_grouped::<HourRow>(pool, Aggregation::Hour, filter).await?;
    Ok(shape::hours(rows))
}

pub async fn sales_by_employee(pool: &PgPool, filter: &StatsFilter) -> Res<Vec<EmployeeSales>> {
    let rows = fetch_grouped::<EmployeeRow>(pool, Aggregation::Employee, filter).await?;
    Ok(shape::employees(rows))
}

pub async fn sales_by_customer(pool: &PgPool, filter: &StatsFilter) -> Res<Vec<CustomerSales>> {
    let rows = fetch_grouped::<CustomerRow>(pool, Aggregation::Customer, filter).await?;
    Ok(shape::customers(rows))
}

/// Runs one aggregation on a single pooled connection.
///
/// The connection goes back to the pool when it is dropped, whether the
/// query succeeded or not. Any failure is logged and replaced by the
/// aggregation's user-facing message.
async fn fetch_grouped<R>(
    pool: &PgPool,
    aggregation: Aggregation,
    filter: &StatsFilter,
) -> Res<Vec<R>>
where
    R: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let predicates = PredicateSet::compose(filter);
    let sql = aggregation.sql(&predicates);

    let result: Result<Vec<R>, sqlx::Error> = async {
        let mut conn = pool.acquire().await?;
        fetch_rows::<_, R>(&mut *conn, &sql, predicates.params()).await
    }
    .await;

    result.map_err(|err| {
        log::error!("Error al obtener {}: {}", aggregation.context(), err);
        AppError::Query(aggregation.failure_message())
    })
}

async fn fetch_rows<'e, E, R>(
    executor: E,
    sql: &'e str,
    params: &'e [Param],
) -> Result<Vec<R>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres> + 'e,
    R: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin + 'e,
{
    let query = bind_params(sqlx::query_as::<_, R>(sql), params);
    query.fetch_all(executor).await
}

fn bind_params<'q, R>(
    mut query: QueryAs<'q, Postgres, R, PgArguments>,
    params: &'q [Param],
) -> QueryAs<'q, Postgres, R, PgArguments> {
    for param in params {
        query = match param {
            Param::Timestamp(at) => query.bind(*at),
            Param::Text(text) => query.bind(text.as_str()),
            Param::Int(n) => query.bind(*n),
        };
    }
    query
}
