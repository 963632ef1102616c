//! Common type definitions.
//!
//! - [`UserId`]: user account identifier (UUID)
//! - [`GroupId`]: shop/group identifier
//! - [`EquipmentId`]: equipment unit identifier
//! - [`ClaimId`]: occupancy claim identifier
//! - [`AnswerId`]: downtime reason-code identifier
//! - [`DowntimeStartId`]: start marker of a downtime interval (epoch seconds)
//!
//! Equipment, groups and answers use the plant system's small integer keys;
//! users are identified by UUID and claims by a bigserial surrogate key.

use uuid::Uuid;

pub type UserId = Uuid;
pub type GroupId = i32;
pub type EquipmentId = i32;
pub type ClaimId = i64;
pub type AnswerId = i32;
pub type DowntimeStartId = i64;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
