use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::remote;
use crate::schema::incident::{Incident, IncidentStatus};
use crate::schema::remote::IncidentRow;
use crate::schema::session::User;
use crate::store::incidents::{IncidentDraft, IncidentStore};
use crate::store::sessions::demo_accounts;
use crate::utils::fresh_id;

/// The adapter seam between the in-memory demo deployment and the remote
/// backend-as-a-service deployment. One of the two is selected at startup;
/// never both.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    async fn create_incident(&self, draft: IncidentDraft) -> anyhow::Result<Incident>;
    /// `Ok(None)` is the expected bad-credentials outcome; `Err` is an
    /// external-dependency failure.
    async fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<Option<User>>;
    /// Stores an evidence image and returns the reference consumed as the
    /// incident's image field.
    async fn store_evidence(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<String>;
}

/// Local mode: incidents live in the shared in-memory store, credentials are
/// the two fixed demo accounts.
pub struct LocalBackend {
    incidents: Arc<IncidentStore>,
}

impl LocalBackend {
    pub fn new(incidents: Arc<IncidentStore>) -> Self {
        Self { incidents }
    }
}

#[async_trait]
impl ReportBackend for LocalBackend {
    async fn create_incident(&self, draft: IncidentDraft) -> anyhow::Result<Incident> {
        Ok(self.incidents.create(draft))
    }

    async fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<Option<User>> {
        Ok(demo_accounts()
            .into_iter()
            .find(|(e, p, _)| *e == email && *p == password)
            .map(|(_, _, user)| user))
    }

    // Demo mode keeps no object storage; the reference only ever travels
    // back through the incident's image field.
    async fn store_evidence(&self, name: &str, _bytes: Vec<u8>) -> anyhow::Result<String> {
        Ok(format!("local://incident-evidence/{name}"))
    }
}

/// Remote mode: creation inserts a row into the fixed incidents table and
/// login exchanges credentials with the remote auth service. Reads are not
/// part of the remote surface.
pub struct RemoteBackend;

#[async_trait]
impl ReportBackend for RemoteBackend {
    async fn create_incident(&self, draft: IncidentDraft) -> anyhow::Result<Incident> {
        let row = IncidentRow {
            kind: draft.kind.as_str().to_string(),
            description: draft.description.clone(),
            severity: draft.severity.as_str().to_string(),
            status: "Unverified".to_string(),
            lat: draft.location.lat,
            lng: draft.location.lng,
            address: draft.location.address.clone(),
            image_url: draft.image_url.clone(),
            upvotes: 0,
            upvoted_by: Vec::new(),
        };
        remote::insert_incident(&row)?;
        Ok(Incident {
            id: fresh_id(),
            kind: draft.kind,
            description: draft.description,
            location: draft.location,
            severity: draft.severity,
            status: IncidentStatus::Unverified,
            timestamp: Utc::now(),
            upvotes: 0,
            upvoted_by: BTreeSet::new(),
            image_url: draft.image_url,
            notes: Vec::new(),
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<Option<User>> {
        remote::exchange_credentials(email, password)
    }

    async fn store_evidence(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
        remote::upload_evidence(name, bytes)
    }
}
