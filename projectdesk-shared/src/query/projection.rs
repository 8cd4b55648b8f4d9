/// Field projection.
///
/// Each entity has immutable field templates. A client `fields=` list is
/// resolved against a template into a new selection; the template itself is
/// never modified.

use std::collections::BTreeSet;

/// A selectable output field and the SQL expression producing it.
#[derive(Debug, PartialEq, Eq)]
pub struct Field {
    /// Key in the response object, and the name clients request.
    pub name: &'static str,
    pub sql: &'static str,
}

/// Which fields a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Fixed default shape with relations joined.
    Wide,
    /// Exactly these fields, in template order.
    Narrow(Vec<&'static Field>),
}

/// Splits a comma-separated list, trimming blanks.
pub(crate) fn split_list(input: Option<&str>) -> impl Iterator<Item = &str> {
    input
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

impl Projection {
    /// Resolves `fields=` against `template`. Unknown names are dropped; when
    /// nothing known remains the listing falls back to the wide shape.
    pub fn parse(input: Option<&str>, template: &'static [Field]) -> Projection {
        let requested: BTreeSet<&str> = split_list(input).collect();

        let fields: Vec<&'static Field> = template
            .iter()
            .filter(|field| requested.contains(field.name))
            .collect();

        if fields.is_empty() {
            Projection::Wide
        } else {
            Projection::Narrow(fields)
        }
    }

    /// Fields to emit, given the entity's wide shape.
    pub fn fields(&self, wide: &'static [Field]) -> Vec<&'static Field> {
        match self {
            Projection::Wide => wide.iter().collect(),
            Projection::Narrow(fields) => fields.clone(),
        }
    }

    pub fn names(&self, wide: &'static [Field]) -> Vec<&'static str> {
        self.fields(wide).into_iter().map(|f| f.name).collect()
    }

    pub fn includes(&self, name: &str, wide: &'static [Field]) -> bool {
        self.fields(wide).iter().any(|f| f.name == name)
    }

    pub fn is_wide(&self) -> bool {
        matches!(self, Projection::Wide)
    }
}
