use chrono::{DateTime, Utc};

// A registered account. The password hash is opaque and never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// Data model representing a Todo item
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
}
