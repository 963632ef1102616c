//! Equipment occupancy engine.
//!
//! One operation lives here: toggling a claim. A claim binds one user to one
//! equipment unit; at any moment at most one claim per unit is active. The
//! toggle resolves to one of four outcomes, decided by [`decide`]:
//!
//! - the unit is idle: the acting user acquires it;
//! - the acting user already holds it: their claim is released (ownership
//!   always takes precedence over privilege, so a master releases their own
//!   claim this way too, never by takeover);
//! - another user holds it and the actor is an operator: the request is
//!   rejected, naming the holder;
//! - another user holds it and the actor is a master: the holder's claim is
//!   deactivated and a new one is inserted for the actor in the same
//!   transaction (forced takeover).
//!
//! Each toggle runs as a single transaction. A transaction-scoped advisory
//! lock keyed on the equipment id serializes the read-decide-write sequence
//! against concurrent toggles of the same unit, while toggles of different
//! units proceed in parallel; the partial unique index on active claims
//! backs the invariant if anything slips past. Every failure path returns
//! before commit, so no partial state (a deactivated claim without its
//! replacement) is ever observable.

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::{
    api::models::users::Role,
    db::{
        handlers::{Claims, Users},
        models::claims::ActiveClaimDBResponse,
    },
    errors::{Error, Result},
    types::{ClaimId, EquipmentId, UserId, abbrev_uuid},
};

/// Result of a claim toggle, as surfaced to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub equipment_id: EquipmentId,
    pub now_active: bool,
}

/// What a toggle should do to the claim relation
#[derive(Debug, Clone, PartialEq)]
enum ClaimAction {
    /// Unit is idle: insert a claim for the actor
    Acquire,
    /// Actor holds the unit: deactivate their claim
    Release { claim_id: ClaimId },
    /// Another user holds the unit and the actor outranks them:
    /// deactivate the holder's claim and insert one for the actor
    Takeover { claim_id: ClaimId },
    /// Another user holds the unit and the actor may not displace them
    Denied { holder: String },
}

/// The claim state machine, separated from I/O so every branch is testable
/// in isolation.
fn decide(actor: UserId, role: &Role, current: Option<&ActiveClaimDBResponse>) -> ClaimAction {
    match current {
        None => ClaimAction::Acquire,
        Some(claim) if claim.user_id == actor => ClaimAction::Release { claim_id: claim.id },
        Some(claim) => match role {
            Role::Master => ClaimAction::Takeover { claim_id: claim.id },
            Role::Operator => ClaimAction::Denied {
                holder: claim.holder.clone(),
            },
        },
    }
}

/// Executes claim toggles against the database.
///
/// Owns the unit of work: each [`toggle_claim`](Self::toggle_claim) call
/// begins one transaction and either commits the full outcome or rolls back.
pub struct OccupancyEngine {
    db: PgPool,
    claim_ttl_minutes: i32,
}

impl OccupancyEngine {
    pub fn new(db: PgPool, claim_ttl_minutes: i32) -> Self {
        Self { db, claim_ttl_minutes }
    }

    /// Toggle the acting user's claim on an equipment unit.
    ///
    /// Fails with `NotFound` when the acting user record is missing and with
    /// `Occupied` when the unit is held by someone the actor may not
    /// displace. Neither failure leaves any mutation behind.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&acting_user_id)), err)]
    pub async fn toggle_claim(&self, acting_user_id: UserId, equipment_id: EquipmentId) -> Result<ToggleOutcome> {
        let mut tx = self.db.begin().await.map_err(|e| Error::Database(e.into()))?;

        // Serialize the read-decide-write sequence per equipment unit
        Claims::new(&mut tx).lock_equipment(equipment_id).await?;

        let user = Users::new(&mut tx)
            .get_by_id(acting_user_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "user".to_string(),
                id: acting_user_id.to_string(),
            })?;

        let current = Claims::new(&mut tx).active_for_equipment(equipment_id).await?;

        let mut claims = Claims::new(&mut tx);
        let now_active = match decide(acting_user_id, &user.role, current.as_ref()) {
            ClaimAction::Acquire => {
                claims.insert(equipment_id, acting_user_id, self.claim_ttl_minutes).await?;
                info!("Equipment {} claimed by {}", equipment_id, user.username);
                true
            }
            ClaimAction::Release { claim_id } => {
                claims.deactivate(claim_id).await?;
                info!("Equipment {} released by {}", equipment_id, user.username);
                false
            }
            ClaimAction::Takeover { claim_id } => {
                claims.deactivate(claim_id).await?;
                claims.insert(equipment_id, acting_user_id, self.claim_ttl_minutes).await?;
                info!("Equipment {} taken over by {}", equipment_id, user.username);
                true
            }
            ClaimAction::Denied { holder } => {
                // Dropping the transaction rolls it back; nothing was written
                return Err(Error::Occupied { equipment_id, holder });
            }
        };

        tx.commit().await.map_err(|e| Error::Database(e.into()))?;

        Ok(ToggleOutcome { equipment_id, now_active })
    }
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::test_utils::{active_claim_count, create_test_equipment, create_test_group, create_test_user};
    use sqlx::PgPool;

    async fn setup(pool: &PgPool) -> EquipmentId {
        let group = create_test_group(pool, "press shop").await;
        create_test_equipment(pool, group.id, "press-1").await
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_toggle_is_claim_then_release(pool: PgPool) {
        let equipment_id = setup(&pool).await;
        let ivan = create_test_user(&pool, "ivan", Role::Operator).await;
        let engine = OccupancyEngine::new(pool.clone(), 480);

        let first = engine.toggle_claim(ivan.id, equipment_id).await.unwrap();
        assert!(first.now_active);
        assert_eq!(active_claim_count(&pool, equipment_id).await, 1);

        let second = engine.toggle_claim(ivan.id, equipment_id).await.unwrap();
        assert!(!second.now_active);
        assert_eq!(active_claim_count(&pool, equipment_id).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_user_is_rejected(pool: PgPool) {
        let equipment_id = setup(&pool).await;
        let engine = OccupancyEngine::new(pool.clone(), 480);

        let result = engine.toggle_claim(uuid::Uuid::new_v4(), equipment_id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        assert_eq!(active_claim_count(&pool, equipment_id).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_operator_conflict_leaves_claim_untouched(pool: PgPool) {
        let equipment_id = setup(&pool).await;
        let ivan = create_test_user(&pool, "ivan", Role::Operator).await;
        let petr = create_test_user(&pool, "petr", Role::Operator).await;
        let engine = OccupancyEngine::new(pool.clone(), 480);

        engine.toggle_claim(ivan.id, equipment_id).await.unwrap();

        let denied = engine.toggle_claim(petr.id, equipment_id).await.unwrap_err();
        match &denied {
            Error::Occupied { holder, .. } => assert_eq!(holder, "ivan"),
            other => panic!("expected Occupied, got {other:?}"),
        }
        assert_eq!(denied.status_code(), axum::http::StatusCode::FORBIDDEN);

        // Ivan's claim survives, still open
        let (active, unsubscribe_time): (bool, Option<chrono::DateTime<chrono::Utc>>) =
            sqlx::query_as("SELECT active, unsubscribe_time FROM claims WHERE equipment_id = $1 AND user_id = $2")
                .bind(equipment_id)
                .bind(ivan.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(active);
        assert!(unsubscribe_time.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_master_takeover_and_release(pool: PgPool) {
        // The full scenario: ivan claims, petr is denied, master1 takes over,
        // master1 releases.
        let equipment_id = setup(&pool).await;
        let ivan = create_test_user(&pool, "ivan", Role::Operator).await;
        let petr = create_test_user(&pool, "petr", Role::Operator).await;
        let master = create_test_user(&pool, "master1", Role::Master).await;
        let engine = OccupancyEngine::new(pool.clone(), 480);

        assert!(engine.toggle_claim(ivan.id, equipment_id).await.unwrap().now_active);
        assert!(matches!(
            engine.toggle_claim(petr.id, equipment_id).await.unwrap_err(),
            Error::Occupied { .. }
        ));

        let takeover = engine.toggle_claim(master.id, equipment_id).await.unwrap();
        assert!(takeover.now_active);

        // Ivan's claim was closed with a timestamp; master holds the unit now
        let (active, unsubscribe_time): (bool, Option<chrono::DateTime<chrono::Utc>>) =
            sqlx::query_as("SELECT active, unsubscribe_time FROM claims WHERE equipment_id = $1 AND user_id = $2")
                .bind(equipment_id)
                .bind(ivan.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(!active);
        assert!(unsubscribe_time.is_some());
        assert_eq!(active_claim_count(&pool, equipment_id).await, 1);

        // Toggling again releases the master's own claim, not another takeover
        let release = engine.toggle_claim(master.id, equipment_id).await.unwrap();
        assert!(!release.now_active);
        assert_eq!(active_claim_count(&pool, equipment_id).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_concurrent_toggles_uphold_invariant(pool: PgPool) {
        let equipment_id = setup(&pool).await;
        let ivan = create_test_user(&pool, "ivan", Role::Operator).await;
        let petr = create_test_user(&pool, "petr", Role::Operator).await;
        let master = create_test_user(&pool, "master1", Role::Master).await;

        let mut handles = Vec::new();
        for user_id in [ivan.id, petr.id, master.id] {
            for _ in 0..4 {
                let engine = OccupancyEngine::new(pool.clone(), 480);
                handles.push(tokio::spawn(async move {
                    // Conflicts are a legal outcome here; only storage errors matter
                    match engine.toggle_claim(user_id, equipment_id).await {
                        Ok(_) | Err(Error::Occupied { .. }) => {}
                        Err(other) => panic!("unexpected toggle failure: {other:?}"),
                    }
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Whatever the interleaving, never more than one active claim
        assert!(active_claim_count(&pool, equipment_id).await <= 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_independent_equipment_does_not_interfere(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        let press = create_test_equipment(&pool, group.id, "press-1").await;
        let lathe = create_test_equipment(&pool, group.id, "lathe-1").await;
        let ivan = create_test_user(&pool, "ivan", Role::Operator).await;
        let petr = create_test_user(&pool, "petr", Role::Operator).await;
        let engine = OccupancyEngine::new(pool.clone(), 480);

        assert!(engine.toggle_claim(ivan.id, press).await.unwrap().now_active);
        // Petr is free to claim a different unit
        assert!(engine.toggle_claim(petr.id, lathe).await.unwrap().now_active);

        assert_eq!(active_claim_count(&pool, press).await, 1);
        assert_eq!(active_claim_count(&pool, lathe).await, 1);
    }
}
