//! Schedule generation and auto-enrollment.
//!
//! The generator turns weekly templates into concrete future slots;
//! the enrollment engine fills each freshly created slot from active
//! subscriptions. Both make partial progress: a failure on one slot or
//! one subscription is logged and the walk continues.

pub mod enroll;
pub mod generator;

pub use enroll::auto_enroll_slot;
pub use generator::{extend_schedule, GenerationSummary};
