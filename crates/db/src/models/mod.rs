//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, where rows are created here

pub mod course;
pub mod lifecycle;
pub mod role;
pub mod user;
