//! HTTP handlers, one module per resource.

pub mod activity;
pub mod kid;
pub mod record;
pub mod schedule;
pub mod slot;
pub mod studio_error;
pub mod subscription;
pub mod subscription_type;
pub mod template;
pub mod user;
