//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request
//! deserialization and response serialization. These models define the public
//! API contract and are distinct from the database models, allowing
//! independent evolution of API and storage representations. All models are
//! annotated with `utoipa` for automatic API docs.

pub mod answers;
pub mod auth;
pub mod downtimes;
pub mod equipment;
pub mod groups;
pub mod pagination;
pub mod users;
