/// Free-text search.

use super::predicate::{Predicate, Relation};

/// A column a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Column(&'static str),
    /// Columns of a related row, matched if any related row matches.
    Related(Relation, &'static [&'static str]),
}

/// OR of case-insensitive substring matches over `fields`. Blank or absent
/// input matches everything.
pub fn search_predicate(input: Option<&str>, fields: &[SearchField]) -> Predicate {
    let needle = input.map(str::trim).unwrap_or_default();
    if needle.is_empty() {
        return Predicate::All;
    }

    Predicate::or(fields.iter().map(|field| match *field {
        SearchField::Column(column) => Predicate::contains(column, needle),
        SearchField::Related(relation, columns) => Predicate::some(
            relation,
            Predicate::or(columns.iter().map(|column| Predicate::contains(column, needle))),
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: &[SearchField] = &[
        SearchField::Column("title"),
        SearchField::Related(Relation::TaskProject, &["title"]),
        SearchField::Column("comment"),
    ];

    #[test]
    fn test_blank_search_matches_all() {
        assert!(search_predicate(None, FIELDS).is_all());
        assert!(search_predicate(Some(""), FIELDS).is_all());
        assert!(search_predicate(Some("  \t "), FIELDS).is_all());
    }

    #[test]
    fn test_search_is_trimmed_or_over_fields() {
        let p = search_predicate(Some("  crm "), FIELDS);

        assert_eq!(
            p,
            Predicate::Or(vec![
                Predicate::contains("title", "crm"),
                Predicate::some(Relation::TaskProject, Predicate::contains("title", "crm")),
                Predicate::contains("comment", "crm"),
            ])
        );
    }
}
