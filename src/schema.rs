use chrono::{DateTime, Utc};

use crate::model::User;

// Struct representing the request body for signing up
#[derive(Debug, serde::Deserialize)]
pub struct SignupSchema {
    pub username: String,
    pub password: String,
}

// Form body for the token route (OAuth2 password-style login)
#[derive(Debug, serde::Deserialize)]
pub struct LoginSchema {
    pub username: String,
    pub password: String,
}

// Struct representing the request body for creating a new Todo.
// Any owner field a caller sends is ignored; ownership comes from the token.
#[derive(Debug, serde::Deserialize)]
pub struct CreateTodoSchema {
    pub title: String,
    pub description: Option<String>,
}

// Struct representing the request body for updating a Todo.
// Absent fields keep their current value.
#[derive(Debug, serde::Deserialize)]
pub struct UpdateTodoSchema {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, serde::Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// Public view of an account, minus the password hash
#[derive(Debug, serde::Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}
