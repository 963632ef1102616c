//! Database repository for occupancy claims.
//!
//! All writes here are invoked by the occupancy engine inside one
//! transaction per toggle; see [`crate::occupancy`]. The partial unique
//! index `claims_one_active_per_equipment` backs the at-most-one-active
//! invariant at the database level.

use crate::db::{
    errors::Result,
    models::claims::{ActiveClaimDBResponse, ClaimDBResponse},
};
use crate::types::{ClaimId, EquipmentId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Namespace for per-equipment advisory locks, so claim serialization never
/// collides with other advisory lock users on the same database.
const CLAIM_LOCK_NAMESPACE: i32 = 0x464C_4F4F; // "FLOO"

pub struct Claims<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Claims<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Serialize claim mutations per equipment unit for the rest of the
    /// current transaction. Transaction-scoped, so the lock is released on
    /// commit or rollback; calls for different equipment do not block each
    /// other.
    #[instrument(skip(self), err)]
    pub async fn lock_equipment(&mut self, equipment_id: EquipmentId) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(CLAIM_LOCK_NAMESPACE)
            .bind(equipment_id)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }

    /// The active claim on an equipment unit, if any (at most one by invariant)
    #[instrument(skip(self), err)]
    pub async fn active_for_equipment(&mut self, equipment_id: EquipmentId) -> Result<Option<ActiveClaimDBResponse>> {
        let claim = sqlx::query_as::<_, ActiveClaimDBResponse>(
            "SELECT c.id, c.user_id, u.username AS holder
             FROM claims c
             JOIN users u ON u.id = c.user_id
             WHERE c.equipment_id = $1 AND c.active
             LIMIT 1",
        )
        .bind(equipment_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(claim)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn insert(&mut self, equipment_id: EquipmentId, user_id: UserId, minutes_to_live: i32) -> Result<ClaimDBResponse> {
        let claim = sqlx::query_as::<_, ClaimDBResponse>(
            "INSERT INTO claims (equipment_id, user_id, active, subscribe_time, minutes_to_live)
             VALUES ($1, $2, TRUE, NOW(), $3)
             RETURNING id, equipment_id, user_id, active, subscribe_time, unsubscribe_time, minutes_to_live",
        )
        .bind(equipment_id)
        .bind(user_id)
        .bind(minutes_to_live)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(claim)
    }

    #[instrument(skip(self), err)]
    pub async fn deactivate(&mut self, claim_id: ClaimId) -> Result<()> {
        sqlx::query("UPDATE claims SET active = FALSE, unsubscribe_time = NOW() WHERE id = $1")
            .bind(claim_id)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }
}
