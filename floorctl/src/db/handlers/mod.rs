//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection (or transaction, via deref) and
//! provides strongly-typed operations for one entity, returning models from
//! [`crate::db::models`]. Callers own transaction boundaries: repositories
//! never begin or commit on their own, so a handler can compose several
//! repositories inside one atomic unit.
//!
//! ```ignore
//! use floorctl::db::handlers::Users;
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Users::new(&mut tx);
//!     let user = repo.get_by_username("ivan").await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod answers;
pub mod claims;
pub mod downtimes;
pub mod equipment;
pub mod groups;
pub mod users;

pub use answers::Answers;
pub use claims::Claims;
pub use downtimes::Downtimes;
pub use equipment::Equipment;
pub use groups::Groups;
pub use users::Users;
