use chrono::Utc;
use sqlx::{query, query_as, Pool, Sqlite};

use crate::model::{Todo, User};

// helper to fetch user by username
pub async fn find_user_by_username(
    db: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

// A duplicate username surfaces as a UNIQUE violation from sqlite.
pub async fn insert_user(
    db: &Pool<Sqlite>,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    query_as::<_, User>(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) \
         RETURNING id, username, password_hash, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(db)
    .await
}

// owner_id always comes from the resolved user, never from a request body
pub async fn insert_todo(
    db: &Pool<Sqlite>,
    owner_id: i64,
    title: &str,
    description: Option<&str>,
) -> Result<Todo, sqlx::Error> {
    query_as::<_, Todo>(
        "INSERT INTO todos (title, description, completed, created_at, owner_id) \
         VALUES (?, ?, 0, ?, ?) \
         RETURNING id, title, description, completed, created_at, owner_id",
    )
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .bind(owner_id)
    .fetch_one(db)
    .await
}

pub async fn list_todos(db: &Pool<Sqlite>, owner_id: i64) -> Result<Vec<Todo>, sqlx::Error> {
    query_as::<_, Todo>(
        "SELECT id, title, description, completed, created_at, owner_id FROM todos \
         WHERE owner_id = ? ORDER BY id",
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}

// id and owner are checked in the same query, so somebody else's todo is
// indistinguishable from a missing one
pub async fn find_todo(
    db: &Pool<Sqlite>,
    owner_id: i64,
    todo_id: i64,
) -> Result<Option<Todo>, sqlx::Error> {
    query_as::<_, Todo>(
        "SELECT id, title, description, completed, created_at, owner_id FROM todos \
         WHERE id = ? AND owner_id = ?",
    )
    .bind(todo_id)
    .bind(owner_id)
    .fetch_optional(db)
    .await
}

pub async fn update_todo(
    db: &Pool<Sqlite>,
    owner_id: i64,
    todo_id: i64,
    title: &str,
    description: Option<&str>,
    completed: bool,
) -> Result<Option<Todo>, sqlx::Error> {
    query_as::<_, Todo>(
        "UPDATE todos SET title = ?, description = ?, completed = ? \
         WHERE id = ? AND owner_id = ? \
         RETURNING id, title, description, completed, created_at, owner_id",
    )
    .bind(title)
    .bind(description)
    .bind(completed)
    .bind(todo_id)
    .bind(owner_id)
    .fetch_optional(db)
    .await
}

// Removal is permanent; there is no soft delete.
pub async fn delete_todo(
    db: &Pool<Sqlite>,
    owner_id: i64,
    todo_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = query("DELETE FROM todos WHERE id = ? AND owner_id = ?")
        .bind(todo_id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
