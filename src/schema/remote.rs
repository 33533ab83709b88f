use serde::{Deserialize, Serialize};

/// Row shape for the remote `incidents` table (snake_case columns).
#[derive(Serialize, Deserialize, Debug)]
pub struct IncidentRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub upvotes: i64,
    pub upvoted_by: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct PasswordGrant {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct TokenGrant {
    pub access_token: String,
    pub user: GrantUser,
}

#[derive(Deserialize, Debug)]
pub struct GrantUser {
    pub id: String,
    pub email: String,
}

/// Row shape for the remote `profiles` table, looked up to resolve a role.
#[derive(Deserialize, Debug)]
pub struct ProfileRow {
    pub id: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<String>,
}
