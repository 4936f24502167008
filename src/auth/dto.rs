use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::AppError, validation::Validator};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Normalizes the email and checks field shapes.
    pub fn validate(&mut self) -> Result<(), AppError> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();

        let mut v = Validator::new();
        if v.required("username", "Username", &self.username) {
            v.length("username", "Username", &self.username, 4, 32);
        }
        if v.required("email", "Email address", &self.email) {
            v.email("email", &self.email);
        }
        if v.required("password", "Password", &self.password) {
            v.length("password", "Password", &self.password, 4, 256);
        }
        v.finish()
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&mut self) -> Result<(), AppError> {
        self.username = self.username.trim().to_string();

        let mut v = Validator::new();
        v.required("username", "Username", &self.username);
        v.required("password", "Password", &self.password);
        v.finish()
    }
}

/// Identity returned after registration. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
}

/// Outcome of a successful login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
