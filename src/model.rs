//! Persisted records, request payloads and relation-bearing views.

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: String,
    pub address: String,
    pub owner_id: Option<String>,
    pub built_by_id: Option<String>,
}

/// Body of `POST /user` and one element of `POST /users`. Any `id` sent by the client is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

impl NewUser {
    pub fn with_id(self, id: String) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
        }
    }
}

/// Body of `POST /house`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHouse {
    pub address: Option<String>,
    pub owner_id: Option<String>,
    pub built_by_id: Option<String>,
}

/// Body of `PUT /:id`. Only `age` is writable; an absent `age` leaves the row untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UserChanges {
    pub age: Option<i32>,
}

/// Result of a bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCount {
    pub count: u64,
}

/// A relation that was either loaded alongside its parent row or left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Related<T> {
    #[default]
    Excluded,
    Loaded(T),
}

impl<T> Related<T> {
    pub fn is_excluded(&self) -> bool {
        matches!(self, Related::Excluded)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Related::Loaded(v) => Some(v),
            Related::Excluded => None,
        }
    }
}

impl<T: Serialize> Serialize for Related<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Related::Loaded(v) => v.serialize(serializer),
            Related::Excluded => serializer.serialize_none(),
        }
    }
}

/// Which of a user's relations to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserInclude {
    pub house_owned: bool,
    pub house_built: bool,
}

impl UserInclude {
    pub const NONE: UserInclude = UserInclude { house_owned: false, house_built: false };
    pub const ALL: UserInclude = UserInclude { house_owned: true, house_built: true };
}

/// Which of a house's relations to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HouseInclude {
    pub owner: bool,
    pub built_by: bool,
}

impl HouseInclude {
    pub const NONE: HouseInclude = HouseInclude { owner: false, built_by: false };
    pub const ALL: HouseInclude = HouseInclude { owner: true, built_by: true };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Related::is_excluded")]
    pub house_owned: Related<Vec<House>>,
    #[serde(skip_serializing_if = "Related::is_excluded")]
    pub house_built: Related<Vec<House>>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            user,
            house_owned: Related::Excluded,
            house_built: Related::Excluded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseView {
    #[serde(flatten)]
    pub house: House,
    #[serde(skip_serializing_if = "Related::is_excluded")]
    pub owner: Related<Option<User>>,
    #[serde(skip_serializing_if = "Related::is_excluded")]
    pub built_by: Related<Option<User>>,
}

impl From<House> for HouseView {
    fn from(house: House) -> Self {
        HouseView {
            house,
            owner: Related::Excluded,
            built_by: Related::Excluded,
        }
    }
}

/// Filter for user listings. `older_than` keeps users with `age > older_than`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub older_than: Option<i32>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.older_than.map_or(true, |min| user.age > min)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseFilter {
    pub owner_id: Option<String>,
    pub built_by_id: Option<String>,
}

impl HouseFilter {
    pub fn owned_by(id: &str) -> Self {
        HouseFilter { owner_id: Some(id.to_string()), built_by_id: None }
    }

    pub fn built_by(id: &str) -> Self {
        HouseFilter { owner_id: None, built_by_id: Some(id.to_string()) }
    }

    pub fn matches(&self, house: &House) -> bool {
        let owner_ok = self.owner_id.as_ref().map_or(true, |id| house.owner_id.as_ref() == Some(id));
        let builder_ok = self.built_by_id.as_ref().map_or(true, |id| house.built_by_id.as_ref() == Some(id));
        owner_ok && builder_ok
    }
}
