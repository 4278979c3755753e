//! PostgreSQL-backed repositories.

use super::{HouseRepository, Ping, UserRepository};
use crate::error::StoreError;
use crate::model::{
    BatchCount, House, HouseFilter, HouseInclude, HouseView, Related, User, UserChanges, UserFilter, UserInclude,
    UserView,
};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;

const USER_COLUMNS: &str = "id, first_name, last_name, age";
const HOUSE_COLUMNS: &str = "id, address, owner_id, built_by_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(PgStore::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn houses_where(&self, filter: &HouseFilter) -> Result<Vec<House>, StoreError> {
        let sql = format!(
            "SELECT {} FROM houses WHERE ($1::text IS NULL OR owner_id = $1) AND ($2::text IS NULL OR built_by_id = $2)",
            HOUSE_COLUMNS
        );
        tracing::debug!(sql = %sql, filter = ?filter, "query");
        sqlx::query_as::<_, House>(&sql)
            .bind(filter.owner_id.as_deref())
            .bind(filter.built_by_id.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// Batch-loads the users referenced by `ids`, keyed by id.
    async fn users_by_ids(&self, ids: Vec<String>) -> Result<HashMap<String, User>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        tracing::debug!(sql = %sql, ids = ids.len(), "query");
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    async fn attach_parties(&self, houses: Vec<House>, include: HouseInclude) -> Result<Vec<HouseView>, StoreError> {
        let mut ids: Vec<String> = Vec::new();
        for h in &houses {
            if include.owner {
                ids.extend(h.owner_id.iter().cloned());
            }
            if include.built_by {
                ids.extend(h.built_by_id.iter().cloned());
            }
        }
        ids.sort();
        ids.dedup();
        let users = self.users_by_ids(ids).await?;
        let lookup = |id: &Option<String>| id.as_ref().and_then(|id| users.get(id)).cloned();
        Ok(houses
            .into_iter()
            .map(|house| HouseView {
                owner: if include.owner { Related::Loaded(lookup(&house.owner_id)) } else { Related::Excluded },
                built_by: if include.built_by { Related::Loaded(lookup(&house.built_by_id)) } else { Related::Excluded },
                house,
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: &str, include: UserInclude) -> Result<Option<UserView>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        tracing::debug!(sql = %sql, id = %id, "query");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        let Some(user) = user else {
            return Ok(None);
        };
        let mut view = UserView::from(user);
        if include.house_owned {
            view.house_owned = Related::Loaded(self.houses_where(&HouseFilter::owned_by(id)).await?);
        }
        if include.house_built {
            view.house_built = Related::Loaded(self.houses_where(&HouseFilter::built_by(id)).await?);
        }
        Ok(Some(view))
    }

    async fn find_many(&self, filter: UserFilter) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE ($1::integer IS NULL OR age > $1)", USER_COLUMNS);
        tracing::debug!(sql = %sql, filter = ?filter, "query");
        sqlx::query_as::<_, User>(&sql)
            .bind(filter.older_than)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %user.id, "query");
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.age)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create_many(&self, users: Vec<User>) -> Result<BatchCount, StoreError> {
        let sql = format!("INSERT INTO users ({}) VALUES ($1, $2, $3, $4)", USER_COLUMNS);
        tracing::debug!(sql = %sql, rows = users.len(), "query (tx)");
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        let mut count = 0u64;
        for user in &users {
            let done = sqlx::query(&sql)
                .bind(&user.id)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(user.age)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
            count += done.rows_affected();
        }
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(BatchCount { count })
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET age = COALESCE($2, age) WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.age)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete(&self, id: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
        tracing::debug!(sql = %sql, id = %id, "query");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl HouseRepository for PgStore {
    async fn find_by_id(&self, id: &str, include: HouseInclude) -> Result<Option<HouseView>, StoreError> {
        let sql = format!("SELECT {} FROM houses WHERE id = $1", HOUSE_COLUMNS);
        tracing::debug!(sql = %sql, id = %id, "query");
        let house = sqlx::query_as::<_, House>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        match house {
            Some(house) => Ok(self.attach_parties(vec![house], include).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_many(&self, filter: HouseFilter, include: HouseInclude) -> Result<Vec<HouseView>, StoreError> {
        let houses = self.houses_where(&filter).await?;
        self.attach_parties(houses, include).await
    }

    async fn create(&self, house: House) -> Result<House, StoreError> {
        let sql = format!(
            "INSERT INTO houses ({cols}) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            cols = HOUSE_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %house.id, "query");
        sqlx::query_as::<_, House>(&sql)
            .bind(&house.id)
            .bind(&house.address)
            .bind(house.owner_id.as_deref())
            .bind(house.built_by_id.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl Ping for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .fetch_optional(&self.pool)
            .await
            .map(|_| ())
            .map_err(StoreError::from_sqlx)
    }
}

/// Runs against a throwaway database created by `#[sqlx::test]` from `DATABASE_URL`.
/// Enable with `--features postgres-tests`.
#[cfg(all(test, feature = "postgres-tests"))]
mod tests {
    use super::*;
    use crate::store::ensure_schema;

    fn user(id: &str, age: i32) -> User {
        User { id: id.into(), first_name: "Edsger".into(), last_name: "Dijkstra".into(), age }
    }

    fn house(id: &str, owner: Option<&str>, builder: Option<&str>) -> House {
        House {
            id: id.into(),
            address: "1 Nuenen Ln, Austin, TX 78701".into(),
            owner_id: owner.map(String::from),
            built_by_id: builder.map(String::from),
        }
    }

    async fn store(pool: PgPool) -> PgStore {
        ensure_schema(&pool).await.unwrap();
        PgStore::new(pool)
    }

    #[sqlx::test]
    async fn update_without_age_keeps_it(pool: PgPool) {
        let store = store(pool).await;
        UserRepository::create(&store, user("u", 40)).await.unwrap();

        let same = UserRepository::update(&store, "u", UserChanges::default()).await.unwrap().unwrap();
        assert_eq!(same.age, 40);
        let older = UserRepository::update(&store, "u", UserChanges { age: Some(41) }).await.unwrap().unwrap();
        assert_eq!(older.age, 41);
        assert!(UserRepository::update(&store, "nobody", UserChanges { age: Some(1) }).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn age_filter_is_strict(pool: PgPool) {
        let store = store(pool).await;
        UserRepository::create_many(&store, vec![user("a", 25), user("b", 26)]).await.unwrap();
        let listed = UserRepository::find_many(&store, UserFilter { older_than: Some(25) }).await.unwrap();
        assert_eq!(listed, vec![user("b", 26)]);
    }

    #[sqlx::test]
    async fn batch_with_duplicate_id_rolls_back(pool: PgPool) {
        let store = store(pool).await;
        let err = UserRepository::create_many(&store, vec![user("a", 30), user("a", 31)]).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(UserRepository::find_many(&store, UserFilter::default()).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn houses_load_owner_and_builder(pool: PgPool) {
        let store = store(pool).await;
        UserRepository::create(&store, user("owner", 50)).await.unwrap();
        UserRepository::create(&store, user("builder", 60)).await.unwrap();
        HouseRepository::create(&store, house("h1", Some("owner"), Some("builder"))).await.unwrap();
        HouseRepository::create(&store, house("h2", None, Some("builder"))).await.unwrap();

        let all = HouseRepository::find_many(&store, HouseFilter::default(), HouseInclude::ALL).await.unwrap();
        assert_eq!(all.len(), 2);
        let h1 = all.iter().find(|v| v.house.id == "h1").unwrap();
        assert_eq!(h1.owner.loaded().and_then(|u| u.as_ref()).map(|u| u.id.as_str()), Some("owner"));
        assert_eq!(h1.built_by.loaded().and_then(|u| u.as_ref()).map(|u| u.id.as_str()), Some("builder"));

        let builder = UserRepository::find_by_id(&store, "builder", UserInclude::ALL).await.unwrap().unwrap();
        assert_eq!(builder.house_built.loaded().map(Vec::len), Some(2));
        assert_eq!(builder.house_owned.loaded().map(Vec::len), Some(0));
    }

    #[sqlx::test]
    async fn deleting_a_user_nulls_house_references(pool: PgPool) {
        let store = store(pool).await;
        UserRepository::create(&store, user("owner", 50)).await.unwrap();
        HouseRepository::create(&store, house("h", Some("owner"), Some("owner"))).await.unwrap();

        let removed = UserRepository::delete(&store, "owner").await.unwrap();
        assert_eq!(removed.map(|u| u.id), Some("owner".to_string()));

        let view = HouseRepository::find_by_id(&store, "h", HouseInclude::ALL).await.unwrap().unwrap();
        assert_eq!(view.house.owner_id, None);
        assert_eq!(view.built_by, Related::Loaded(None));
    }

    #[sqlx::test]
    async fn dangling_owner_is_a_constraint_error(pool: PgPool) {
        let store = store(pool).await;
        let err = HouseRepository::create(&store, house("h", Some("ghost"), None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[sqlx::test]
    async fn ping_succeeds(pool: PgPool) {
        let store = store(pool).await;
        store.ping().await.unwrap();
        assert_eq!(store.backend(), "postgres");
    }
}
