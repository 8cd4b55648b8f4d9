/// Sort descriptors from `order_desc=` lists.
///
/// Every named field sorts descending; there is no ascending client control.
/// With no usable name the listing falls back to ascending primary key.

use super::projection::split_list;

/// A sortable name and the SQL expression it orders by. Relation keys order by
/// a correlated sub-select (member count, joined title).
#[derive(Debug, PartialEq, Eq)]
pub struct SortKey {
    pub name: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub key: &'static SortKey,
    pub descending: bool,
}

/// Ordered sort terms; empty means primary key ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    pub terms: Vec<OrderTerm>,
}

impl OrderBy {
    /// Keeps known names in the order given, duplicates included.
    pub fn parse(input: Option<&str>, keys: &'static [SortKey]) -> OrderBy {
        let terms = split_list(input)
            .filter_map(|name| keys.iter().find(|key| key.name == name))
            .map(|key| OrderTerm {
                key,
                descending: true,
            })
            .collect();

        OrderBy { terms }
    }

    pub fn is_default(&self) -> bool {
        self.terms.is_empty()
    }

    /// `(field, descending)` pairs as the database will apply them.
    pub fn pairs(&self) -> Vec<(&'static str, bool)> {
        if self.is_default() {
            return vec![("id", false)];
        }
        self.terms.iter().map(|t| (t.key.name, t.descending)).collect()
    }
}
