/// Rendering shaped queries to PostgreSQL.
///
/// Every row is emitted as a single `jsonb_build_object(...)` so that narrow
/// and wide projections share one code path and the response contains only
/// the projected keys. All user-supplied text is bound, never interpolated;
/// interpolated identifiers come from static catalogs.

use super::order::OrderBy;
use super::predicate::{Comparison, Predicate, Relation, Value};
use super::projection::Field;
use sqlx::{PgExecutor, Postgres, QueryBuilder};

/// A listing ready to render: projection, filter and order over one table.
#[derive(Debug)]
pub struct ListQuery<'a> {
    pub table: &'static str,
    pub alias: &'static str,
    pub fields: &'a [&'static Field],
    pub predicate: &'a Predicate,
    pub order: &'a OrderBy,
}

impl ListQuery<'_> {
    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT jsonb_build_object(");
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push("'").push(field.name).push("', ").push(field.sql);
        }
        qb.push(") FROM ")
            .push(self.table)
            .push(" ")
            .push(self.alias)
            .push(" WHERE ");
        push_predicate(&mut qb, self.predicate, self.alias, 0);

        qb.push(" ORDER BY ");
        for term in &self.order.terms {
            qb.push(term.key.sql)
                .push(if term.descending { " DESC, " } else { " ASC, " });
        }
        qb.push(self.alias).push(".id ASC");

        qb
    }

    pub async fn fetch_all<'e, E>(&self, executor: E) -> Result<Vec<serde_json::Value>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = self.build();
        tracing::debug!(table = self.table, sql = qb.sql(), "Running listing query");
        qb.build_query_scalar::<serde_json::Value>()
            .fetch_all(executor)
            .await
    }

    pub async fn fetch_optional<'e, E>(
        &self,
        executor: E,
    ) -> Result<Option<serde_json::Value>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = self.build();
        qb.build_query_scalar::<serde_json::Value>()
            .fetch_optional(executor)
            .await
    }
}

/// Escapes `LIKE` wildcards so the needle matches literally.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Appends `predicate` with columns qualified by `scope`.
pub fn push_predicate(
    qb: &mut QueryBuilder<'static, Postgres>,
    predicate: &Predicate,
    scope: &str,
    depth: usize,
) {
    match predicate {
        Predicate::All => {
            qb.push("TRUE");
        }
        Predicate::And(terms) => push_joined(qb, terms, " AND ", "TRUE", scope, depth),
        Predicate::Or(terms) => push_joined(qb, terms, " OR ", "FALSE", scope, depth),
        Predicate::Contains { column, needle } => {
            qb.push(format!("{}.{} ILIKE ", scope, column))
                .push_bind(format!("%{}%", escape_like(needle)));
        }
        Predicate::Eq { column, value } => {
            qb.push(format!("{}.{} = ", scope, column));
            push_value(qb, value);
        }
        Predicate::In { column, values } => {
            qb.push(format!("{}.{} = ANY(", scope, column))
                .push_bind(values.clone())
                .push(")");
        }
        Predicate::IsNull { column } => {
            qb.push(format!("{}.{} IS NULL", scope, column));
        }
        Predicate::Compare { column, op, value } => {
            let op = match op {
                Comparison::GreaterOrEqual => ">=",
                Comparison::Less => "<",
            };
            qb.push(format!("{}.{} {} ", scope, column, op));
            push_value(qb, value);
        }
        Predicate::Some { relation, inner } => {
            let (from, join) = relation_sql(*relation, scope, depth);
            let related = format!("r{}", depth);
            qb.push(format!("EXISTS (SELECT 1 FROM {} WHERE {} AND ", from, join));
            push_predicate(qb, inner, &related, depth + 1);
            qb.push(")");
        }
    }
}

fn push_joined(
    qb: &mut QueryBuilder<'static, Postgres>,
    terms: &[Predicate],
    separator: &str,
    empty: &str,
    scope: &str,
    depth: usize,
) {
    if terms.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, term, scope, depth);
    }
    qb.push(")");
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &Value) {
    match value {
        Value::Int(v) => {
            qb.push_bind(*v);
        }
        Value::Bool(v) => {
            qb.push_bind(*v);
        }
        Value::Text(v) => {
            qb.push_bind(v.clone());
        }
        Value::Role(v) => {
            qb.push_bind(*v);
        }
        Value::Status(v) => {
            qb.push_bind(*v);
        }
        Value::Now => {
            qb.push("NOW()");
        }
    }
}

/// `FROM` clause and join condition for following `relation` out of `outer`.
/// The related row is always aliased `r{depth}`.
fn relation_sql(relation: Relation, outer: &str, depth: usize) -> (String, String) {
    let r = format!("r{}", depth);
    let l = format!("l{}", depth);
    match relation {
        Relation::ProjectUsers => (
            format!("project_users {l} JOIN users {r} ON {r}.id = {l}.user_id"),
            format!("{l}.project_id = {outer}.id"),
        ),
        Relation::ProjectOrganization => (
            format!("organizations {r}"),
            format!("{r}.id = {outer}.organization_id"),
        ),
        Relation::TaskProject => (format!("projects {r}"), format!("{r}.id = {outer}.project_id")),
        Relation::UserInternships => (
            format!("internships {r}"),
            format!("{r}.user_id = {outer}.id"),
        ),
        Relation::UserCompetencies => (
            format!("competency_users {l} JOIN competencies {r} ON {r}.id = {l}.competency_id"),
            format!("{l}.user_id = {outer}.id"),
        ),
    }
}
