use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::incident::{IncidentStatus, IncidentType, Location, Severity};
use super::session::User;

#[derive(Deserialize, ToSchema, Debug)]
pub struct NewIncident {
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub description: String,
    pub severity: Severity,
    pub location: Option<Location>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct NewNote {
    pub content: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct StatusChange {
    pub status: IncidentStatus,
}

/// Feed filters; a missing value or the literal "All" leaves that dimension
/// unconstrained.
#[derive(Deserialize, IntoParams, Debug)]
pub struct FeedParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub severity: Option<String>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct EvidenceResponse {
    pub url: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct UpvoteResponse {
    pub upvotes: u32,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct StatsResponse {
    pub total: usize,
    pub active: usize,
    pub critical: usize,
    pub fire: usize,
    pub medical: usize,
    pub police: usize,
    pub hazard: usize,
    pub other: usize,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct VersionResponse {
    pub revision: String,
    pub built: String,
}
