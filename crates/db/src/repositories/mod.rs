//! Typed access to the record tree, one repository per top-level branch.
//!
//! Repositories decode and default records at the store boundary; callers
//! only ever see the shapes from `ipa_core`.

pub mod catalog_repo;
pub mod graduate_repo;
pub mod promotion_repo;
pub mod student_repo;
pub mod user_repo;

pub use catalog_repo::CatalogRepo;
pub use graduate_repo::GraduateRepo;
pub use promotion_repo::PromotionRepo;
pub use student_repo::StudentRepo;
pub use user_repo::UserRepo;
