//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod course_repo;
pub mod lifecycle_snapshot_repo;
pub mod role_repo;
pub mod user_repo;

pub use course_repo::CourseRepo;
pub use lifecycle_snapshot_repo::LifecycleSnapshotRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
