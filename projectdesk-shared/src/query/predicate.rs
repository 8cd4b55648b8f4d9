/// Storage-agnostic filter trees.
///
/// Columns are named relative to the row being filtered. [`Predicate::Some`]
/// moves the scope into a related table, so nested predicates name columns of
/// that table.

use crate::models::user::{Role, UserStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Text(String),
    Role(Role),
    Status(UserStatus),
    /// Evaluated by the database at query time.
    Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    Less,
}

/// Edges a predicate can follow from one table to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// project → assigned users
    ProjectUsers,
    /// project → its organization
    ProjectOrganization,
    /// task → its project
    TaskProject,
    /// user → internship periods
    UserInternships,
    /// user → competencies
    UserCompetencies,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    All,
    And(Vec<Predicate>),
    /// An empty disjunction matches nothing.
    Or(Vec<Predicate>),
    /// Case-insensitive substring match.
    Contains { column: &'static str, needle: String },
    Eq { column: &'static str, value: Value },
    In { column: &'static str, values: Vec<String> },
    IsNull { column: &'static str },
    Compare {
        column: &'static str,
        op: Comparison,
        value: Value,
    },
    /// At least one related row satisfies `inner`.
    Some {
        relation: Relation,
        inner: Box<Predicate>,
    },
}

impl Predicate {
    /// Conjunction that drops `All` terms and flattens nested `And`s.
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut terms = Vec::new();
        for part in parts {
            match part {
                Predicate::All => {}
                Predicate::And(inner) => terms.extend(inner),
                other => terms.push(other),
            }
        }

        match terms.len() {
            0 => Predicate::All,
            1 => terms.remove(0),
            _ => Predicate::And(terms),
        }
    }

    /// Disjunction; collapses to `All` if any branch matches everything.
    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut terms: Vec<Predicate> = parts.into_iter().collect();
        if terms.iter().any(Predicate::is_all) {
            return Predicate::All;
        }
        if terms.len() == 1 {
            return terms.remove(0);
        }
        Predicate::Or(terms)
    }

    pub fn eq(column: &'static str, value: Value) -> Predicate {
        Predicate::Eq { column, value }
    }

    pub fn contains(column: &'static str, needle: impl Into<String>) -> Predicate {
        Predicate::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn some(relation: Relation, inner: Predicate) -> Predicate {
        Predicate::Some {
            relation,
            inner: Box::new(inner),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_drops_match_all_terms() {
        let p = Predicate::and([
            Predicate::All,
            Predicate::eq("id", Value::Int(1)),
            Predicate::All,
        ]);
        assert_eq!(p, Predicate::eq("id", Value::Int(1)));
        assert_eq!(Predicate::and([Predicate::All, Predicate::All]), Predicate::All);
    }

    #[test]
    fn test_and_flattens() {
        let inner = Predicate::and([
            Predicate::eq("a", Value::Int(1)),
            Predicate::eq("b", Value::Int(2)),
        ]);
        let outer = Predicate::and([inner, Predicate::IsNull { column: "c" }]);

        match outer {
            Predicate::And(terms) => assert_eq!(terms.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_or_with_match_all_branch() {
        let p = Predicate::or([Predicate::eq("a", Value::Int(1)), Predicate::All]);
        assert!(p.is_all());
        assert_eq!(Predicate::or(Vec::new()), Predicate::Or(Vec::new()));
    }
}
