/// Stage filters for project and internship listings.

use super::predicate::{Comparison, Predicate, Relation, Value};
use crate::models::user::UserStatus;

/// Lifecycle stage of a project, derived from its dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectStage {
    /// `end_date` not yet passed
    Active,
    #[default]
    All,
    /// Not yet started (no `start_date`)
    Potential,
    /// `end_date` passed
    Finished,
}

impl ProjectStage {
    /// Unknown or absent values mean no restriction. Both the historical
    /// `POTENCIAL` spelling and `POTENTIAL` are accepted.
    pub fn parse(input: Option<&str>) -> ProjectStage {
        match input.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("ACTIVE") => ProjectStage::Active,
            Some("FINISHED") => ProjectStage::Finished,
            Some("POTENCIAL") | Some("POTENTIAL") => ProjectStage::Potential,
            _ => ProjectStage::All,
        }
    }

    pub fn predicate(self) -> Predicate {
        match self {
            ProjectStage::All => Predicate::All,
            ProjectStage::Active => Predicate::Compare {
                column: "end_date",
                op: Comparison::GreaterOrEqual,
                value: Value::Now,
            },
            ProjectStage::Finished => Predicate::Compare {
                column: "end_date",
                op: Comparison::Less,
                value: Value::Now,
            },
            ProjectStage::Potential => Predicate::IsNull { column: "start_date" },
        }
    }
}

/// Stage of an intern's or practicant's placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InternshipStage {
    Active,
    Finished,
    #[default]
    All,
}

impl InternshipStage {
    pub fn parse(input: Option<&str>) -> InternshipStage {
        match input.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("ACTIVE") => InternshipStage::Active,
            Some("FINISHED") => InternshipStage::Finished,
            _ => InternshipStage::All,
        }
    }

    /// Users with some internship of the kind `status` implies, ending in the
    /// future (active) or the past (finished).
    pub fn predicate(self, status: UserStatus) -> Predicate {
        let op = match self {
            InternshipStage::All => return Predicate::All,
            InternshipStage::Active => Comparison::GreaterOrEqual,
            InternshipStage::Finished => Comparison::Less,
        };

        Predicate::some(
            Relation::UserInternships,
            Predicate::and([
                Predicate::eq("is_practice", Value::Bool(status.is_practice())),
                Predicate::Compare {
                    column: "end_date",
                    op,
                    value: Value::Now,
                },
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_stage_parse() {
        assert_eq!(ProjectStage::parse(Some("ACTIVE")), ProjectStage::Active);
        assert_eq!(ProjectStage::parse(Some("finished")), ProjectStage::Finished);
        assert_eq!(ProjectStage::parse(Some("POTENCIAL")), ProjectStage::Potential);
        assert_eq!(ProjectStage::parse(Some("POTENTIAL")), ProjectStage::Potential);
        assert_eq!(ProjectStage::parse(Some("ALL")), ProjectStage::All);
        assert_eq!(ProjectStage::parse(Some("whenever")), ProjectStage::All);
        assert_eq!(ProjectStage::parse(None), ProjectStage::All);
    }

    #[test]
    fn test_project_stage_predicates() {
        assert!(ProjectStage::All.predicate().is_all());
        assert_eq!(
            ProjectStage::Potential.predicate(),
            Predicate::IsNull { column: "start_date" }
        );
        assert!(matches!(
            ProjectStage::Active.predicate(),
            Predicate::Compare {
                column: "end_date",
                op: Comparison::GreaterOrEqual,
                value: Value::Now
            }
        ));
        assert!(matches!(
            ProjectStage::Finished.predicate(),
            Predicate::Compare {
                column: "end_date",
                op: Comparison::Less,
                value: Value::Now
            }
        ));
    }

    #[test]
    fn test_internship_stage_follows_status_kind() {
        assert!(InternshipStage::All.predicate(UserStatus::Practice).is_all());

        let p = InternshipStage::Active.predicate(UserStatus::Practice);
        match p {
            Predicate::Some {
                relation: Relation::UserInternships,
                inner,
            } => match *inner {
                Predicate::And(ref terms) => {
                    assert_eq!(terms[0], Predicate::eq("is_practice", Value::Bool(true)));
                }
                ref other => panic!("expected And, got {:?}", other),
            },
            other => panic!("expected Some, got {:?}", other),
        }

        let p = InternshipStage::Finished.predicate(UserStatus::Internship);
        let Predicate::Some { inner, .. } = p else {
            panic!("expected Some");
        };
        assert_eq!(
            *inner,
            Predicate::And(vec![
                Predicate::eq("is_practice", Value::Bool(false)),
                Predicate::Compare {
                    column: "end_date",
                    op: Comparison::Less,
                    value: Value::Now,
                },
            ])
        );
    }
}
