//! Data access: one repository trait per entity, with PostgreSQL and in-memory backends.
//!
//! Relations are loaded only when asked for through [`UserInclude`] / [`HouseInclude`].

pub mod memory;
pub mod postgres;
pub mod schema;

use crate::error::StoreError;
use crate::model::{
    BatchCount, House, HouseFilter, HouseInclude, HouseView, User, UserChanges, UserFilter, UserInclude,
    UserView,
};
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use schema::ensure_schema;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str, include: UserInclude) -> Result<Option<UserView>, StoreError>;

    async fn find_many(&self, filter: UserFilter) -> Result<Vec<User>, StoreError>;

    /// Inserts a user whose id has already been assigned.
    async fn create(&self, user: User) -> Result<User, StoreError>;

    /// Inserts all users or none of them.
    async fn create_many(&self, users: Vec<User>) -> Result<BatchCount, StoreError>;

    /// Returns `None` when no user has this id.
    async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>, StoreError>;

    /// Returns the removed user, or `None` when no user has this id.
    async fn delete(&self, id: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait HouseRepository: Send + Sync {
    async fn find_by_id(&self, id: &str, include: HouseInclude) -> Result<Option<HouseView>, StoreError>;

    async fn find_many(&self, filter: HouseFilter, include: HouseInclude) -> Result<Vec<HouseView>, StoreError>;

    /// Fails with [`StoreError::Constraint`] when `owner_id` or `built_by_id` names no user.
    async fn create(&self, house: House) -> Result<House, StoreError>;
}

/// Backend reachability, used by the readiness check.
#[async_trait]
pub trait Ping: Send + Sync {
    /// Short name of the backend, reported by `/ready`.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;
}
