use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserRole {
    Citizen,
    Responder,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn responder(&self) -> bool {
        self.role == UserRole::Responder
    }
}

/// Token payload. `iat`/`exp` are unix seconds; the auth middleware rejects
/// tokens past `exp` before looking anything else up.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Session {
    pub user: User,
    pub iat: i64,
    pub exp: i64,
}
