/// Query shaping
///
/// Turns loosely-typed listing parameters (`fields=`, `order_desc=`,
/// `search=`, `stage=`) into a storage-agnostic description of a listing, then
/// renders that description to SQL.
///
/// - [`projection`]: which fields to return
/// - [`order`]: sort terms
/// - [`search`] and [`stage`]: filter predicates
/// - [`visibility`]: role-dependent restrictions, always AND-ed in
/// - [`catalog`]: the static per-entity tables every name is checked against
/// - [`sql`]: rendering to a bound `QueryBuilder`
///
/// Nothing here touches the database except [`sql::ListQuery::fetch_all`] and
/// [`sql::ListQuery::fetch_optional`]. Unknown names are dropped silently at
/// every step.

pub mod catalog;
pub mod order;
pub mod predicate;
pub mod projection;
pub mod search;
pub mod sql;
pub mod stage;
pub mod visibility;

pub use catalog::{Catalog, ProfileShape, UserShape};
pub use order::OrderBy;
pub use predicate::{Predicate, Relation, Value};
pub use projection::Projection;
pub use sql::ListQuery;
pub use stage::{InternshipStage, ProjectStage};

/// Raw listing parameters as they arrive on a query string.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ListParams {
    pub fields: Option<String>,
    pub order_desc: Option<String>,
    pub search: Option<String>,
    pub stage: Option<String>,
}

/// A resolved listing over one catalog.
#[derive(Debug, Clone)]
pub struct Shaped {
    pub projection: Projection,
    pub order: OrderBy,
    pub search: Predicate,
}

impl Shaped {
    pub fn from_params(params: &ListParams, catalog: &Catalog) -> Shaped {
        let shaped = Shaped {
            projection: Projection::parse(params.fields.as_deref(), catalog.selectable),
            order: OrderBy::parse(params.order_desc.as_deref(), catalog.sortable),
            search: search::search_predicate(params.search.as_deref(), catalog.searchable),
        };

        tracing::debug!(
            table = catalog.table,
            fields = ?shaped.projection.names(catalog.wide),
            order = ?shaped.order.pairs(),
            searching = !shaped.search.is_all(),
            "Shaped listing"
        );

        shaped
    }

    /// Runs the listing with `filter` (visibility, stage, scope) AND-ed with
    /// the search predicate.
    pub async fn fetch<'e, E>(
        &self,
        executor: E,
        catalog: &Catalog,
        filter: Predicate,
    ) -> Result<Vec<serde_json::Value>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let predicate = Predicate::and([filter, self.search.clone()]);
        let fields = self.projection.fields(catalog.wide);

        ListQuery {
            table: catalog.table,
            alias: catalog.alias,
            fields: &fields,
            predicate: &predicate,
            order: &self.order,
        }
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::catalog::{PROJECTS, TASKS};

    #[test]
    fn test_absent_params_give_wide_default() {
        let shaped = Shaped::from_params(&ListParams::default(), &PROJECTS);

        assert!(shaped.projection.is_wide());
        assert!(shaped.order.is_default());
        assert!(shaped.search.is_all());
    }

    #[test]
    fn test_params_resolve_against_catalog() {
        let params = ListParams {
            fields: Some("title,project,password".into()),
            order_desc: Some("project,password".into()),
            search: Some("crm".into()),
            stage: None,
        };
        let shaped = Shaped::from_params(&params, &TASKS);

        assert_eq!(shaped.projection.names(TASKS.wide), vec!["title", "project"]);
        assert_eq!(shaped.order.pairs(), vec![("project", true)]);
        assert!(!shaped.search.is_all());
    }
}
