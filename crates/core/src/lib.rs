//! Domain layer for the studio booking backend.
//!
//! Pure logic only: the error taxonomy, shared type aliases, schedule
//! math for the slot generator, and booking input validation. Nothing
//! in this crate touches the database or the network.

pub mod booking;
pub mod error;
pub mod schedule;
pub mod types;
