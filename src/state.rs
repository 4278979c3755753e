//! Shared application state: the data-access handles injected into every handler.

use crate::store::{HouseRepository, Ping, UserRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub houses: Arc<dyn HouseRepository>,
    pub store: Arc<dyn Ping>,
}

impl AppState {
    /// Builds the state from one backend serving both repositories.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + HouseRepository + Ping + 'static,
    {
        AppState {
            users: store.clone(),
            houses: store.clone(),
            store,
        }
    }
}
