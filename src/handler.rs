use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Form, Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::ApiError,
    model::{Todo, User},
    password,
    schema::{
        CreateTodoSchema, LoginSchema, SignupSchema, TokenResponse, UpdateTodoSchema, UserResponse,
    },
    store, token, AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Multi-user Todo API with Rust, SQLX, Sqlite, and Axum";

    Json(json!({
        "status": "success",
        "message": MESSAGE
    }))
}

// Handler for registering a new user; responds with a ready-to-use token
pub async fn signup(
    State(data): State<Arc<AppState>>,
    Json(body): Json<SignupSchema>,
) -> Result<Json<TokenResponse>, ApiError> {
    if body.username.is_empty() {
        return Err(ApiError::Validation("Username must not be empty".to_string()));
    }
    if body.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".to_string()));
    }

    if store::find_user_by_username(&data.db, &body.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&body.password)?;

    let user = match store::insert_user(&data.db, &body.username, &password_hash).await {
        Ok(user) => user,
        // lost the race against a concurrent signup for the same name
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(username = %user.username, id = user.id, "user registered");

    let token = token::issue(&data.keys, &user.username, Utc::now())?;
    Ok(Json(TokenResponse::bearer(token)))
}

// Handler for the OAuth2 password-style token route
pub async fn login(
    State(data): State<Arc<AppState>>,
    Form(body): Form<LoginSchema>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = store::find_user_by_username(&data.db, &body.username).await?;

    // identical response whether the username or the password was wrong
    let user = match user {
        Some(user) if password::verify_password(&body.password, &user.password_hash) => user,
        _ => {
            return Err(ApiError::Validation(
                "Incorrect username or password".to_string(),
            ))
        }
    };

    let token = token::issue(&data.keys, &user.username, Utc::now())?;
    Ok(Json(TokenResponse::bearer(token)))
}

// Handler for inspecting the account behind the presented token
pub async fn whoami(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

// Handler for creating a new Todo; the owner is always the caller
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(body): Json<CreateTodoSchema>,
) -> Result<Json<Todo>, ApiError> {
    if body.title.is_empty() {
        return Err(ApiError::Validation("Title must not be empty".to_string()));
    }

    let todo =
        store::insert_todo(&data.db, user.id, &body.title, body.description.as_deref()).await?;
    Ok(Json(todo))
}

// Handler for getting all Todo items owned by the caller, oldest first
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = store::list_todos(&data.db, user.id).await?;
    Ok(Json(todos))
}

// Handler for getting a specific Todo by ID
pub async fn get_todo(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Todo>, ApiError> {
    let todo = store::find_todo(&data.db, user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(todo))
}

// Handler for updating a Todo by ID; absent fields keep their current value
pub async fn update_todo(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(body): Json<UpdateTodoSchema>,
) -> Result<Json<Todo>, ApiError> {
    let current = store::find_todo(&data.db, user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(title) = &body.title {
        if title.is_empty() {
            return Err(ApiError::Validation("Title must not be empty".to_string()));
        }
    }

    let title = body.title.unwrap_or(current.title);
    let description = body.description.or(current.description);
    let completed = body.completed.unwrap_or(current.completed);

    // Re-checks ownership in the write itself; a todo deleted in between
    // read and write turns into NotFound rather than a resurrection.
    let todo = store::update_todo(&data.db, user.id, id, &title, description.as_deref(), completed)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(todo))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !store::delete_todo(&data.db, user.id, id).await? {
        return Err(not_found(id));
    }

    Ok(Json(json!({
        "message": format!("Todo {} deleted successfully", id)
    })))
}

// Absent and not-owned ids get the same answer on purpose.
fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Todo with ID: {} not found", id))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
