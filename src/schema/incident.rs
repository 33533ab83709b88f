use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncidentType {
    Fire,
    Medical,
    Police,
    Hazard,
    Other,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Fire => "Fire",
            IncidentType::Medical => "Medical",
            IncidentType::Police => "Police",
            IncidentType::Hazard => "Hazard",
            IncidentType::Other => "Other",
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncidentStatus {
    Unverified,
    Verified,
    Resolved,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            lat: 0.0,
            lng: 0.0,
            address: None,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct Note {
    pub id: String,
    pub author: String,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A reported incident. `upvotes` always equals `upvoted_by.len()`; the
/// store maintains that invariant, nothing else may touch these fields.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub description: String,
    pub location: Location,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub upvotes: u32,
    #[serde(rename = "upvotedBy")]
    pub upvoted_by: BTreeSet<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub notes: Vec<Note>,
}
