//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Insert DTOs used by the repositories and the write pipeline
//! - Query parameter types for list endpoints

pub mod goal;
pub mod limitation;
pub mod resource;
pub mod resource_type;
pub mod tag;
pub mod technique;
pub mod use_case;
