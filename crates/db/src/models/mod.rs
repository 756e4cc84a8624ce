//! Entity structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod activity;
pub mod kid;
pub mod record;
pub mod slot;
pub mod studio_error;
pub mod subscription;
pub mod subscription_type;
pub mod template;
pub mod user;
