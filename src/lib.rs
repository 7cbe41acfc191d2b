use sqlx::{Pool, Sqlite};

use crate::token::Keys;

pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod password;
pub mod route;
pub mod schema;
pub mod store;
pub mod token;

// Struct representing the application state
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub keys: Keys,
}
