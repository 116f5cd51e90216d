use serde::{Deserialize, Serialize};

use crate::models::Category;

// -- JWT Claims --

/// Session claims. `sub` is the `users.id` the token was issued for; it
/// stands in for the user id the screens used to pass around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub email: String,
    pub token: String,
}

// -- Journals --

/// Body for both create and update: the same three fields are editable.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalRequest {
    pub image: String,
    pub description: String,
    pub category: Category,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalListQuery {
    /// `All` or a category name. Absent means `All`.
    pub category: Option<String>,
}
