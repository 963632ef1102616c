//! Database repository for equipment.
//!
//! Equipment is static reference data; this repository only reads. The
//! listing projects each unit together with its active claim holder so the
//! dashboard can render occupancy in one query.

use crate::db::{errors::Result, models::equipment::EquipmentDBResponse};
use crate::types::{EquipmentId, GroupId};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing equipment of one shop
#[derive(Debug, Clone)]
pub struct EquipmentFilter {
    pub group_id: GroupId,
    pub skip: i64,
    pub limit: i64,
}

pub struct Equipment<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Equipment<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), fields(group_id = filter.group_id, limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &EquipmentFilter) -> Result<Vec<EquipmentDBResponse>> {
        let equipment = sqlx::query_as::<_, EquipmentDBResponse>(
            "SELECT e.id, e.group_id, e.name, e.sort_order,
                    COALESCE(c.active, FALSE) AS occupied,
                    c.user_id AS holder_id,
                    u.username AS holder
             FROM equipment e
             LEFT JOIN claims c ON c.equipment_id = e.id AND c.active
             LEFT JOIN users u ON u.id = c.user_id
             WHERE e.group_id = $1
             ORDER BY e.sort_order, e.id
             LIMIT $2 OFFSET $3",
        )
        .bind(filter.group_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(equipment)
    }

    #[instrument(skip(self), err)]
    pub async fn count_for_group(&mut self, group_id: GroupId) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM equipment WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self, name), err)]
    pub async fn create(&mut self, group_id: GroupId, name: &str) -> Result<EquipmentId> {
        let id = sqlx::query_scalar::<_, EquipmentId>("INSERT INTO equipment (group_id, name) VALUES ($1, $2) RETURNING id")
            .bind(group_id)
            .bind(name)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::Claims;
    use crate::test_utils::{create_test_group, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_projects_occupancy(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        let ivan = create_test_user(&pool, "ivan", Role::Operator).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Equipment::new(&mut conn);

        let press = repo.create(group.id, "press-1").await.unwrap();
        let lathe = repo.create(group.id, "lathe-1").await.unwrap();

        Claims::new(&mut conn).insert(press, ivan.id, 480).await.unwrap();

        let mut repo = Equipment::new(&mut conn);
        let filter = EquipmentFilter {
            group_id: group.id,
            skip: 0,
            limit: 10,
        };
        let listed = repo.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 2);

        let press_row = listed.iter().find(|e| e.id == press).unwrap();
        assert!(press_row.occupied);
        assert_eq!(press_row.holder.as_deref(), Some("ivan"));

        let lathe_row = listed.iter().find(|e| e.id == lathe).unwrap();
        assert!(!lathe_row.occupied);
        assert!(lathe_row.holder.is_none());

        assert_eq!(repo.count_for_group(group.id).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_pagination(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Equipment::new(&mut conn);
        for i in 0..5 {
            repo.create(group.id, &format!("press-{i}")).await.unwrap();
        }

        let page = repo
            .list(&EquipmentFilter {
                group_id: group.id,
                skip: 2,
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "press-2");
        assert_eq!(repo.count_for_group(group.id).await.unwrap(), 5);
    }
}
