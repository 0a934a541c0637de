//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside the technique write pipeline take an open transaction instead.

pub mod goal_repo;
pub mod limitation_repo;
pub mod resource_repo;
pub mod resource_type_repo;
pub mod tag_repo;
pub mod technique_repo;
pub mod use_case_repo;

pub use goal_repo::GoalRepo;
pub use limitation_repo::LimitationRepo;
pub use resource_repo::ResourceRepo;
pub use resource_type_repo::ResourceTypeRepo;
pub use tag_repo::TagRepo;
pub use technique_repo::TechniqueRepo;
pub use use_case_repo::UseCaseRepo;
