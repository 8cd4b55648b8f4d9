/// Role-scoped visibility.
///
/// | Role       | Projects                          | Tasks                                      |
/// |------------|-----------------------------------|--------------------------------------------|
/// | ADMIN      | all                               | all                                        |
/// | CUSTOMER   | organization contact is caller    | project's organization contact is caller   |
/// | SPECIALIST | caller assigned to project        | caller is executor or reviewer             |
/// | GUEST      | as SPECIALIST                     | as SPECIALIST                              |
///
/// The result is always AND-ed with the caller's own filters, so these rules
/// cannot be widened from a query string.

use super::predicate::{Predicate, Relation, Value};
use crate::auth::middleware::Identity;
use crate::models::user::Role;

/// Projects the caller may see.
pub fn project_visibility(identity: &Identity) -> Predicate {
    match identity.role {
        Role::Admin => Predicate::All,
        Role::Customer => customer_projects(identity.id),
        Role::Specialist | Role::Guest => Predicate::some(
            Relation::ProjectUsers,
            Predicate::eq("id", Value::Int(identity.id)),
        ),
    }
}

/// Tasks the caller may see.
pub fn task_visibility(identity: &Identity) -> Predicate {
    match identity.role {
        Role::Admin => Predicate::All,
        Role::Customer => Predicate::some(Relation::TaskProject, customer_projects(identity.id)),
        Role::Specialist | Role::Guest => own_tasks(identity.id),
    }
}

/// Tasks where `user_id` is executor or reviewer.
pub fn own_tasks(user_id: i32) -> Predicate {
    Predicate::or([
        Predicate::eq("executor_id", Value::Int(user_id)),
        Predicate::eq("reviewer_id", Value::Int(user_id)),
    ])
}

fn customer_projects(user_id: i32) -> Predicate {
    Predicate::some(
        Relation::ProjectOrganization,
        Predicate::eq("contact_person_id", Value::Int(user_id)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserStatus;

    fn identity(id: i32, role: Role) -> Identity {
        Identity {
            id,
            email: None,
            first_name: None,
            last_name: None,
            middle_name: None,
            role,
            status: UserStatus::Specialist,
        }
    }

    #[test]
    fn test_admin_is_unrestricted() {
        assert!(project_visibility(&identity(1, Role::Admin)).is_all());
        assert!(task_visibility(&identity(1, Role::Admin)).is_all());
    }

    #[test]
    fn test_customer_scoped_by_organization_contact() {
        assert_eq!(
            project_visibility(&identity(7, Role::Customer)),
            Predicate::some(
                Relation::ProjectOrganization,
                Predicate::eq("contact_person_id", Value::Int(7)),
            )
        );
        assert_eq!(
            task_visibility(&identity(7, Role::Customer)),
            Predicate::some(
                Relation::TaskProject,
                Predicate::some(
                    Relation::ProjectOrganization,
                    Predicate::eq("contact_person_id", Value::Int(7)),
                ),
            )
        );
    }

    #[test]
    fn test_specialist_and_guest_scoped_to_membership() {
        for role in [Role::Specialist, Role::Guest] {
            assert_eq!(
                project_visibility(&identity(3, role)),
                Predicate::some(Relation::ProjectUsers, Predicate::eq("id", Value::Int(3)))
            );
            assert_eq!(task_visibility(&identity(3, role)), own_tasks(3));
        }
    }

    #[test]
    fn test_only_non_admins_are_restricted() {
        for role in Role::ALL {
            let restricted = !project_visibility(&identity(1, role)).is_all();
            assert_eq!(restricted, role != Role::Admin);
        }
    }
}
