//! Database entity models.
//!
//! These are the structs repositories read from and write to PostgreSQL.
//! They are distinct from the API models in [`crate::api::models`], which
//! define the public contract.

pub mod answers;
pub mod claims;
pub mod downtimes;
pub mod equipment;
pub mod groups;
pub mod users;
