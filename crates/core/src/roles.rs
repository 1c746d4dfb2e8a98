//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000002_create_roles_table.sql`.

/// Role whose holders make up the population evaluated by the lifecycle job.
pub const ROLE_STUDENT: &str = "student";

pub const ROLE_COURSE_CREATOR: &str = "coursecreator";
pub const ROLE_EDITING_TEACHER: &str = "editingteacher";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_ADMIN: &str = "admin";

/// Roles whose holders are never suspended or deleted automatically, even
/// when they also hold [`ROLE_STUDENT`].
pub const EXCLUDED_ROLES: &[&str] = &[
    ROLE_COURSE_CREATOR,
    ROLE_EDITING_TEACHER,
    ROLE_TEACHER,
    ROLE_MANAGER,
    ROLE_ADMIN,
];
