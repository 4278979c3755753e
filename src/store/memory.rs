//! In-process store used when no `DATABASE_URL` is configured, and by the test suite.
//!
//! Mirrors the constraints of the SQL schema: unique ids, house references must name
//! an existing user, and deleting a user clears those references.

use super::{HouseRepository, Ping, UserRepository};
use crate::error::StoreError;
use crate::model::{
    BatchCount, House, HouseFilter, HouseInclude, HouseView, Related, User, UserChanges, UserFilter, UserInclude,
    UserView,
};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    houses: Vec<House>,
}

impl Tables {
    fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn check_new_user(&self, user: &User) -> Result<(), StoreError> {
        if self.user(&user.id).is_some() {
            return Err(StoreError::Constraint(format!("duplicate user id '{}'", user.id)));
        }
        Ok(())
    }

    fn check_reference(&self, column: &str, id: &Option<String>) -> Result<(), StoreError> {
        match id {
            Some(id) if self.user(id).is_none() => Err(StoreError::Constraint(format!(
                "houses.{} references missing user '{}'",
                column, id
            ))),
            _ => Ok(()),
        }
    }

    fn houses_where(&self, filter: &HouseFilter) -> Vec<House> {
        self.houses.iter().filter(|h| filter.matches(h)).cloned().collect()
    }

    fn view(&self, house: House, include: HouseInclude) -> HouseView {
        let lookup = |id: &Option<String>| id.as_deref().and_then(|id| self.user(id)).cloned();
        HouseView {
            owner: if include.owner { Related::Loaded(lookup(&house.owner_id)) } else { Related::Excluded },
            built_by: if include.built_by { Related::Loaded(lookup(&house.built_by_id)) } else { Related::Excluded },
            house,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str, include: UserInclude) -> Result<Option<UserView>, StoreError> {
        let tables = self.tables.read().await;
        let Some(user) = tables.user(id).cloned() else {
            return Ok(None);
        };
        let mut view = UserView::from(user);
        if include.house_owned {
            view.house_owned = Related::Loaded(tables.houses_where(&HouseFilter::owned_by(id)));
        }
        if include.house_built {
            view.house_built = Related::Loaded(tables.houses_where(&HouseFilter::built_by(id)));
        }
        Ok(Some(view))
    }

    async fn find_many(&self, filter: UserFilter) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_new_user(&user)?;
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn create_many(&self, users: Vec<User>) -> Result<BatchCount, StoreError> {
        let mut tables = self.tables.write().await;
        {
            let mut batch_ids = HashSet::with_capacity(users.len());
            for user in &users {
                tables.check_new_user(user)?;
                if !batch_ids.insert(user.id.as_str()) {
                    return Err(StoreError::Constraint(format!("duplicate user id '{}'", user.id)));
                }
            }
        }
        let count = users.len() as u64;
        tables.users.extend(users);
        Ok(BatchCount { count })
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(age) = changes.age {
            user.age = age;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(pos) = tables.users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        let removed = tables.users.remove(pos);
        for house in tables.houses.iter_mut() {
            if house.owner_id.as_deref() == Some(id) {
                house.owner_id = None;
            }
            if house.built_by_id.as_deref() == Some(id) {
                house.built_by_id = None;
            }
        }
        Ok(Some(removed))
    }
}

#[async_trait]
impl HouseRepository for MemoryStore {
    async fn find_by_id(&self, id: &str, include: HouseInclude) -> Result<Option<HouseView>, StoreError> {
        let tables = self.tables.read().await;
        let house = tables.houses.iter().find(|h| h.id == id).cloned();
        Ok(house.map(|h| tables.view(h, include)))
    }

    async fn find_many(&self, filter: HouseFilter, include: HouseInclude) -> Result<Vec<HouseView>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .houses_where(&filter)
            .into_iter()
            .map(|h| tables.view(h, include))
            .collect())
    }

    async fn create(&self, house: House) -> Result<House, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.houses.iter().any(|h| h.id == house.id) {
            return Err(StoreError::Constraint(format!("duplicate house id '{}'", house.id)));
        }
        tables.check_reference("owner_id", &house.owner_id)?;
        tables.check_reference("built_by_id", &house.built_by_id)?;
        tables.houses.push(house.clone());
        Ok(house)
    }
}

#[async_trait]
impl Ping for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
