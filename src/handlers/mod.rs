//! HTTP handlers, one per route.

pub mod house;
pub mod user;
