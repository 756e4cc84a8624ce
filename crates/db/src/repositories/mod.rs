//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lock-scoped helpers instead
//! take `&mut PgConnection` so callers can compose them inside their
//! own transaction; every mutation of a contended counter (`booked`,
//! `visits_used`) goes through such a helper under a `FOR UPDATE`
//! lock.

pub mod activity_repo;
pub mod kid_repo;
pub mod record_repo;
pub mod slot_repo;
pub mod studio_error_repo;
pub mod subscription_repo;
pub mod subscription_type_repo;
pub mod template_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use kid_repo::KidRepo;
pub use record_repo::RecordRepo;
pub use slot_repo::SlotRepo;
pub use studio_error_repo::StudioErrorRepo;
pub use subscription_repo::SubscriptionRepo;
pub use subscription_type_repo::SubscriptionTypeRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
