/// Static field, sort and search tables per entity.
///
/// These are the only identifiers that ever reach generated SQL. Field SQL is
/// written against the listing alias (`p`, `t`, `u`); relation fields are
/// correlated sub-selects that aggregate to JSON.

use super::order::SortKey;
use super::predicate::Relation;
use super::projection::Field;
use super::search::SearchField;
use crate::models::user::{Role, UserStatus};

/// Everything needed to shape a listing over one table.
#[derive(Debug)]
pub struct Catalog {
    pub table: &'static str,
    pub alias: &'static str,
    /// Names a client may request through `fields=`.
    pub selectable: &'static [Field],
    /// Default shape when no known field is requested.
    pub wide: &'static [Field],
    pub sortable: &'static [SortKey],
    pub searchable: &'static [SearchField],
}

// Projects

const P_ID: Field = Field { name: "id", sql: "p.id" };
const P_TITLE: Field = Field { name: "title", sql: "p.title" };
const P_CUSTOMER: Field = Field { name: "customer", sql: "p.customer" };
const P_STATUS: Field = Field { name: "status", sql: "p.status" };
const P_CONTACT_PERSON: Field = Field { name: "contact_person", sql: "p.contact_person" };
const P_CONTACT_DATA: Field = Field { name: "contact_data", sql: "p.contact_data" };
const P_DESCRIPTION: Field = Field { name: "description", sql: "p.description" };
const P_TECHNICAL_TASK: Field = Field { name: "technical_task", sql: "p.technical_task" };
const P_COMMENT: Field = Field { name: "comment", sql: "p.comment" };
const P_USERS: Field = Field {
    name: "users",
    sql: "COALESCE((SELECT jsonb_agg(jsonb_build_object('id', pu_u.id, 'firstName', pu_u.first_name, \
          'lastName', pu_u.last_name, 'middleName', pu_u.middle_name) ORDER BY pu_u.id) \
          FROM project_users pu JOIN users pu_u ON pu_u.id = pu.user_id WHERE pu.project_id = p.id), '[]'::jsonb)",
};

static PROJECT_SELECTABLE: &[Field] = &[
    P_ID,
    P_TITLE,
    P_CUSTOMER,
    P_STATUS,
    P_CONTACT_PERSON,
    P_CONTACT_DATA,
    P_DESCRIPTION,
    P_TECHNICAL_TASK,
    P_COMMENT,
    P_USERS,
];

static PROJECT_WIDE: &[Field] = &[
    P_ID,
    P_TITLE,
    Field { name: "owner_id", sql: "p.owner_id" },
    Field { name: "organization_id", sql: "p.organization_id" },
    P_CUSTOMER,
    P_CONTACT_PERSON,
    P_CONTACT_DATA,
    Field { name: "director", sql: "p.director" },
    P_DESCRIPTION,
    P_TECHNICAL_TASK,
    Field { name: "contract", sql: "p.contract" },
    Field { name: "contract_date", sql: "p.contract_date" },
    Field { name: "service_name", sql: "p.service_name" },
    Field { name: "document_number", sql: "p.document_number" },
    P_COMMENT,
    P_STATUS,
    Field { name: "start_date", sql: "p.start_date" },
    Field { name: "end_date", sql: "p.end_date" },
    Field { name: "created_at", sql: "p.created_at" },
    Field { name: "updated_at", sql: "p.updated_at" },
    P_USERS,
];

/// `{id, title}` pairs for drop-downs.
pub static PROJECT_LIST_ITEM: &[Field] = &[P_ID, P_TITLE];

static PROJECT_SORT: &[SortKey] = &[
    SortKey { name: "id", sql: "p.id" },
    SortKey { name: "title", sql: "p.title" },
    SortKey { name: "customer", sql: "p.customer" },
    SortKey { name: "status", sql: "p.status" },
    SortKey { name: "contact_person", sql: "p.contact_person" },
    SortKey { name: "contact_data", sql: "p.contact_data" },
    SortKey { name: "description", sql: "p.description" },
    SortKey { name: "technical_task", sql: "p.technical_task" },
    SortKey { name: "comment", sql: "p.comment" },
    SortKey {
        name: "users",
        sql: "(SELECT COUNT(*) FROM project_users pc WHERE pc.project_id = p.id)",
    },
];

static PROJECT_SEARCH: &[SearchField] = &[
    SearchField::Column("title"),
    SearchField::Column("customer"),
    SearchField::Column("contact_person"),
    SearchField::Column("contact_data"),
    SearchField::Column("description"),
    SearchField::Column("technical_task"),
    SearchField::Related(Relation::ProjectUsers, &["first_name", "last_name", "middle_name"]),
    SearchField::Column("comment"),
];

pub static PROJECTS: Catalog = Catalog {
    table: "projects",
    alias: "p",
    selectable: PROJECT_SELECTABLE,
    wide: PROJECT_WIDE,
    sortable: PROJECT_SORT,
    searchable: PROJECT_SEARCH,
};

// Tasks

static TASK_SELECTABLE: &[Field] = &[
    Field { name: "id", sql: "t.id" },
    Field { name: "title", sql: "t.title" },
    Field { name: "description", sql: "t.description" },
    Field { name: "start_date", sql: "t.start_date" },
    Field { name: "end_date", sql: "t.end_date" },
    Field { name: "is_done", sql: "t.is_done" },
    Field { name: "project_id", sql: "t.project_id" },
    Field { name: "comment", sql: "t.comment" },
    Field { name: "reviewer_id", sql: "t.reviewer_id" },
    Field { name: "executor_id", sql: "t.executor_id" },
    Field { name: "status", sql: "t.status" },
    Field { name: "hours", sql: "t.hours" },
    Field {
        name: "project",
        sql: "(SELECT jsonb_build_object('title', tp.title) FROM projects tp WHERE tp.id = t.project_id)",
    },
];

static TASK_WIDE: &[Field] = &[
    Field { name: "id", sql: "t.id" },
    Field { name: "title", sql: "t.title" },
    Field { name: "description", sql: "t.description" },
    Field { name: "start_date", sql: "t.start_date" },
    Field { name: "end_date", sql: "t.end_date" },
    Field { name: "is_done", sql: "t.is_done" },
    Field { name: "status", sql: "t.status" },
    Field { name: "hours", sql: "t.hours" },
    Field { name: "comment", sql: "t.comment" },
    Field { name: "project_id", sql: "t.project_id" },
    Field { name: "executor_id", sql: "t.executor_id" },
    Field { name: "reviewer_id", sql: "t.reviewer_id" },
    Field { name: "created_at", sql: "t.created_at" },
    Field { name: "updated_at", sql: "t.updated_at" },
    Field {
        name: "project",
        sql: "(SELECT jsonb_build_object('title', tp.title) FROM projects tp WHERE tp.id = t.project_id)",
    },
];

static TASK_SORT: &[SortKey] = &[
    SortKey { name: "id", sql: "t.id" },
    SortKey { name: "title", sql: "t.title" },
    SortKey { name: "description", sql: "t.description" },
    SortKey { name: "start_date", sql: "t.start_date" },
    SortKey { name: "end_date", sql: "t.end_date" },
    SortKey { name: "is_done", sql: "t.is_done" },
    SortKey { name: "project_id", sql: "t.project_id" },
    SortKey { name: "comment", sql: "t.comment" },
    SortKey { name: "reviewer_id", sql: "t.reviewer_id" },
    SortKey { name: "executor_id", sql: "t.executor_id" },
    SortKey { name: "status", sql: "t.status" },
    SortKey { name: "hours", sql: "t.hours" },
    SortKey {
        name: "project",
        sql: "(SELECT ts.title FROM projects ts WHERE ts.id = t.project_id)",
    },
];

static TASK_SEARCH: &[SearchField] = &[
    SearchField::Column("title"),
    SearchField::Related(Relation::TaskProject, &["title"]),
    SearchField::Column("comment"),
];

pub static TASKS: Catalog = Catalog {
    table: "tasks",
    alias: "t",
    selectable: TASK_SELECTABLE,
    wide: TASK_WIDE,
    sortable: TASK_SORT,
    searchable: TASK_SEARCH,
};

// Users

const U_ID: Field = Field { name: "id", sql: "u.id" };
const U_FIRST_NAME: Field = Field { name: "firstName", sql: "u.first_name" };
const U_LAST_NAME: Field = Field { name: "lastName", sql: "u.last_name" };
const U_MIDDLE_NAME: Field = Field { name: "middleName", sql: "u.middle_name" };
const U_DIRECTION: Field = Field { name: "direction", sql: "u.direction" };
const U_ROLE: Field = Field { name: "role", sql: "u.role" };
const U_LOGIN: Field = Field { name: "login", sql: "u.login" };
const U_EMAIL: Field = Field { name: "email", sql: "u.email" };
const U_PHONE: Field = Field { name: "phone", sql: "u.phone" };
const U_TELEGRAM: Field = Field { name: "telegram", sql: "u.telegram" };
const U_RATE: Field = Field { name: "rate", sql: "u.rate" };
const U_STATUS: Field = Field { name: "status", sql: "u.status" };
const U_STUDY_GROUP: Field = Field { name: "study_group", sql: "u.study_group" };
const U_PLANS: Field = Field { name: "plans", sql: "u.plans" };
const U_POSITION: Field = Field { name: "position", sql: "u.position" };
const U_ABOUT: Field = Field { name: "about", sql: "u.about" };
const U_PORTFOLIO: Field = Field { name: "portfolio", sql: "u.portfolio" };
const U_NOTE: Field = Field { name: "note", sql: "u.note" };
const U_INN: Field = Field { name: "inn", sql: "u.inn" };
const U_SNILS: Field = Field { name: "snils", sql: "u.snils" };
const U_BIRTHDAY: Field = Field { name: "birthday", sql: "u.birthday" };
const U_PASSPORT_DATA: Field = Field { name: "passport_data", sql: "u.passport_data" };
const U_REGISTRATION_ADDRESS: Field = Field {
    name: "registration_address",
    sql: "u.registration_address",
};
const U_LIVING_ADDRESS: Field = Field { name: "living_address", sql: "u.living_address" };
const U_REQUISITES: Field = Field { name: "requisites", sql: "u.requisites" };
const U_NPD_REFERENCE: Field = Field { name: "npd_reference", sql: "u.npd_reference" };
const U_COMPETENCIES: Field = Field {
    name: "competencies",
    sql: "COALESCE((SELECT jsonb_agg(jsonb_build_object('id', uc.id, 'text', uc.text) ORDER BY uc.id) \
          FROM competency_users ucu JOIN competencies uc ON uc.id = ucu.competency_id \
          WHERE ucu.user_id = u.id), '[]'::jsonb)",
};
const U_PROJECTS: Field = Field {
    name: "projects",
    sql: "COALESCE((SELECT jsonb_agg(to_jsonb(up) ORDER BY up.id) \
          FROM project_users upu JOIN projects up ON up.id = upu.project_id \
          WHERE upu.user_id = u.id), '[]'::jsonb)",
};
const U_TASKS: Field = Field {
    name: "tasks",
    sql: "COALESCE((SELECT jsonb_agg(to_jsonb(ut) ORDER BY ut.id) FROM tasks ut \
          WHERE ut.executor_id = u.id), '[]'::jsonb)",
};
const U_INTERNSHIPS: Field = Field {
    name: "internships",
    sql: "COALESCE((SELECT jsonb_agg(jsonb_build_object('id', ui.id, 'status', ui.status, \
          'start_date', ui.start_date, 'end_date', ui.end_date) ORDER BY ui.id) FROM internships ui \
          WHERE ui.user_id = u.id AND NOT ui.is_practice), '[]'::jsonb)",
};
const U_PRACTICES: Field = Field {
    name: "internships",
    sql: "COALESCE((SELECT jsonb_agg(jsonb_build_object('id', ui.id, 'status', ui.status, \
          'start_date', ui.start_date, 'end_date', ui.end_date) ORDER BY ui.id) FROM internships ui \
          WHERE ui.user_id = u.id AND ui.is_practice), '[]'::jsonb)",
};

/// Default specialist shape. Never contains the password hash.
static USER_DEFAULT: &[Field] = &[
    U_ID,
    U_FIRST_NAME,
    U_LAST_NAME,
    U_MIDDLE_NAME,
    U_DIRECTION,
    U_ROLE,
    U_LOGIN,
    U_EMAIL,
    U_PHONE,
    U_TELEGRAM,
    U_RATE,
    U_STATUS,
    U_STUDY_GROUP,
    U_PLANS,
    U_ABOUT,
    U_PORTFOLIO,
    U_NOTE,
    U_INN,
    U_SNILS,
    U_BIRTHDAY,
    U_PASSPORT_DATA,
    U_COMPETENCIES,
    U_REGISTRATION_ADDRESS,
    U_LIVING_ADDRESS,
    U_REQUISITES,
    U_NPD_REFERENCE,
];

static USER_SPECIALIST_PROFILE: &[Field] = &[
    U_ID,
    U_FIRST_NAME,
    U_LAST_NAME,
    U_MIDDLE_NAME,
    U_DIRECTION,
    U_ROLE,
    U_LOGIN,
    U_EMAIL,
    U_PHONE,
    U_TELEGRAM,
    U_RATE,
    U_STATUS,
    U_STUDY_GROUP,
    U_PLANS,
    U_ABOUT,
    U_PORTFOLIO,
    U_NOTE,
    U_INN,
    U_SNILS,
    U_BIRTHDAY,
    U_PASSPORT_DATA,
    U_COMPETENCIES,
    U_REGISTRATION_ADDRESS,
    U_LIVING_ADDRESS,
    U_REQUISITES,
    U_NPD_REFERENCE,
    U_PROJECTS,
    U_TASKS,
];

static USER_INTERN: &[Field] = &[
    U_ID,
    U_FIRST_NAME,
    U_LAST_NAME,
    U_MIDDLE_NAME,
    U_DIRECTION,
    U_ROLE,
    U_EMAIL,
    U_PHONE,
    U_LOGIN,
    U_TELEGRAM,
    U_STATUS,
    U_STUDY_GROUP,
    U_PLANS,
    U_ABOUT,
    U_PORTFOLIO,
    U_NOTE,
    U_COMPETENCIES,
    U_INTERNSHIPS,
];

static USER_PRACTICANT: &[Field] = &[
    U_ID,
    U_FIRST_NAME,
    U_LAST_NAME,
    U_MIDDLE_NAME,
    U_DIRECTION,
    U_ROLE,
    U_EMAIL,
    U_PHONE,
    U_LOGIN,
    U_TELEGRAM,
    U_STATUS,
    U_STUDY_GROUP,
    U_PLANS,
    U_ABOUT,
    U_PORTFOLIO,
    U_NOTE,
    U_COMPETENCIES,
    U_PRACTICES,
];

static USER_BASIC: &[Field] = &[
    U_ID,
    U_EMAIL,
    U_ROLE,
    U_LOGIN,
    U_FIRST_NAME,
    U_LAST_NAME,
    U_MIDDLE_NAME,
];

static USER_ADMIN: &[Field] = &[
    U_ID,
    U_EMAIL,
    U_FIRST_NAME,
    U_LAST_NAME,
    U_ROLE,
    U_LOGIN,
    U_MIDDLE_NAME,
    U_PHONE,
    U_DIRECTION,
    U_COMPETENCIES,
    U_POSITION,
];

/// Fields returned by the name drop-down.
pub static USER_LIST_ITEM: &[Field] = &[U_ID, U_FIRST_NAME, U_LAST_NAME, U_MIDDLE_NAME, U_ROLE];

static USER_SORT: &[SortKey] = &[
    SortKey { name: "id", sql: "u.id" },
    SortKey { name: "firstName", sql: "u.first_name" },
    SortKey { name: "lastName", sql: "u.last_name" },
    SortKey { name: "middleName", sql: "u.middle_name" },
    SortKey { name: "direction", sql: "u.direction" },
    SortKey { name: "role", sql: "u.role" },
    SortKey { name: "login", sql: "u.login" },
    SortKey { name: "email", sql: "u.email" },
    SortKey { name: "phone", sql: "u.phone" },
    SortKey { name: "telegram", sql: "u.telegram" },
    SortKey { name: "status", sql: "u.status" },
    SortKey { name: "study_group", sql: "u.study_group" },
    SortKey { name: "plans", sql: "u.plans" },
    SortKey { name: "about", sql: "u.about" },
    SortKey { name: "portfolio", sql: "u.portfolio" },
    SortKey {
        name: "competencies",
        sql: "(SELECT COUNT(*) FROM competency_users cc WHERE cc.user_id = u.id)",
    },
    SortKey { name: "note", sql: "u.note" },
    SortKey { name: "inn", sql: "u.inn" },
    SortKey { name: "snils", sql: "u.snils" },
    SortKey { name: "birthday", sql: "u.birthday" },
    SortKey { name: "passport_data", sql: "u.passport_data" },
    SortKey { name: "registration_address", sql: "u.registration_address" },
    SortKey { name: "living_address", sql: "u.living_address" },
    SortKey { name: "requisites", sql: "u.requisites" },
    SortKey { name: "npd_reference", sql: "u.npd_reference" },
];

static USER_SEARCH: &[SearchField] = &[
    SearchField::Column("first_name"),
    SearchField::Column("last_name"),
    SearchField::Column("middle_name"),
    SearchField::Column("direction"),
    SearchField::Column("email"),
    SearchField::Column("login"),
    SearchField::Column("phone"),
    SearchField::Column("telegram"),
    SearchField::Column("study_group"),
    SearchField::Column("plans"),
    SearchField::Column("about"),
    SearchField::Column("portfolio"),
    SearchField::Column("note"),
    SearchField::Column("inn"),
    SearchField::Column("snils"),
    SearchField::Column("birthday"),
    SearchField::Column("passport_data"),
    SearchField::Column("registration_address"),
    SearchField::Column("living_address"),
    SearchField::Column("requisites"),
    SearchField::Column("npd_reference"),
];

/// Name-only search for drop-downs.
pub static USER_NAME_SEARCH: &[SearchField] = &[
    SearchField::Column("first_name"),
    SearchField::Column("last_name"),
    SearchField::Column("middle_name"),
];

pub const USER_TABLE: &str = "users";
pub const USER_ALIAS: &str = "u";

/// Listing shape chosen by the requested status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserShape {
    Specialist,
    Intern,
    Practicant,
}

impl UserShape {
    pub fn for_status(status: UserStatus) -> UserShape {
        match status {
            UserStatus::Specialist => UserShape::Specialist,
            UserStatus::Internship => UserShape::Intern,
            UserStatus::Practice => UserShape::Practicant,
        }
    }

    /// Selectable names and default shape are the same table per variant.
    pub fn catalog(self) -> Catalog {
        let fields = match self {
            UserShape::Specialist => USER_DEFAULT,
            UserShape::Intern => USER_INTERN,
            UserShape::Practicant => USER_PRACTICANT,
        };
        Catalog {
            table: USER_TABLE,
            alias: USER_ALIAS,
            selectable: fields,
            wide: fields,
            sortable: USER_SORT,
            searchable: USER_SEARCH,
        }
    }
}

/// Profile shape chosen from the caller's role and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileShape {
    /// Customers and guests: identity fields only.
    Basic,
    Specialist,
    Intern,
    Practicant,
    Admin,
}

impl ProfileShape {
    pub fn for_identity(role: Role, status: UserStatus) -> ProfileShape {
        match (role, status) {
            (Role::Admin, _) => ProfileShape::Admin,
            (Role::Customer | Role::Guest, _) => ProfileShape::Basic,
            (Role::Specialist, UserStatus::Specialist) => ProfileShape::Specialist,
            (Role::Specialist, UserStatus::Internship) => ProfileShape::Intern,
            (Role::Specialist, UserStatus::Practice) => ProfileShape::Practicant,
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            ProfileShape::Basic => USER_BASIC,
            ProfileShape::Specialist => USER_SPECIALIST_PROFILE,
            ProfileShape::Intern => USER_INTERN,
            ProfileShape::Practicant => USER_PRACTICANT,
            ProfileShape::Admin => USER_ADMIN,
        }
    }
}
