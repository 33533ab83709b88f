use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::schema::api::StatsResponse;
use crate::schema::incident::{Incident, IncidentStatus, IncidentType, Location, Note, Severity};
use crate::utils::fresh_id;

/// Caller-supplied fields for a new report. Everything else (id, timestamp,
/// status, vote state, notes) is decided by the store.
#[derive(Clone, Debug)]
pub struct IncidentDraft {
    pub kind: IncidentType,
    pub description: String,
    pub severity: Severity,
    pub location: Location,
    pub image_url: Option<String>,
}

/// Single source of truth for all incidents. Every mutation builds a new
/// collection and swaps the `Arc`, so readers hold immutable snapshots and
/// can detect change with `Arc::ptr_eq` against an older snapshot.
pub struct IncidentStore {
    inner: RwLock<Arc<Vec<Incident>>>,
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Incident>> {
        self.inner.read().unwrap().clone()
    }

    /// Creates an incident from the draft and prepends it (most-recent-first).
    /// Status, vote state and notes are forced regardless of the caller.
    pub fn create(&self, draft: IncidentDraft) -> Incident {
        let mut guard = self.inner.write().unwrap();
        let mut id = fresh_id();
        while guard.iter().any(|i| i.id == id) {
            id = fresh_id();
        }
        let incident = Incident {
            id,
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
        };
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(incident.clone());
        next.extend(guard.iter().cloned());
        *guard = Arc::new(next);
        incident
    }

    /// Replaces the status of the matching incident. No transition table is
    /// enforced; any status may be set from any other. Returns `false` when
    /// the id is unknown.
    pub fn set_status(&self, id: &str, status: IncidentStatus) -> bool {
        self.mutate(id, |incident| {
            incident.status = status;
        })
        .is_some()
    }

    /// Appends a note; notes are never mutated or removed afterwards.
    /// Returns the stored note, or `None` when the id is unknown.
    pub fn add_note(&self, id: &str, author: &str, content: &str) -> Option<Note> {
        self.mutate(id, |incident| {
            let note = Note {
                id: fresh_id(),
                author: author.to_string(),
                content: content.to_string(),
                timestamp: Utc::now(),
            };
            incident.notes.push(note.clone());
            note
        })
    }

    /// Records one corroboration vote. Idempotent per `(id, voter)`: a voter
    /// already present leaves count and set untouched. Returns the resulting
    /// count, or `None` when the id is unknown.
    pub fn upvote(&self, id: &str, voter: &str) -> Option<u32> {
        self.mutate(id, |incident| {
            if incident.upvoted_by.insert(voter.to_string()) {
                incident.upvotes += 1;
            }
            incident.upvotes
        })
    }

    fn mutate<T>(&self, id: &str, f: impl FnOnce(&mut Incident) -> T) -> Option<T> {
        let mut guard = self.inner.write().unwrap();
        guard.iter().position(|i| i.id == id).map(|pos| {
            let mut next: Vec<Incident> = guard.iter().cloned().collect();
            let out = f(&mut next[pos]);
            *guard = Arc::new(next);
            out
        })
    }
}

/// Feed filtering: conjunction of both predicates, order-preserving, no side
/// effects. A filter of `None` or "All" leaves that dimension unconstrained.
pub fn filter_feed(
    incidents: &[Incident],
    kind: Option<&str>,
    severity: Option<&str>,
) -> Vec<Incident> {
    incidents
        .iter()
        .filter(|i| {
            let kind_match = match kind {
                None | Some("All") => true,
                Some(k) => i.kind.as_str() == k,
            };
            let sev_match = match severity {
                None | Some("All") => true,
                Some(s) => i.severity.as_str() == s,
            };
            kind_match && sev_match
        })
        .cloned()
        .collect()
}

/// Dashboard aggregates over one snapshot.
pub fn tally(incidents: &[Incident]) -> StatsResponse {
    let count_kind =
        |k: IncidentType| incidents.iter().filter(|i| i.kind == k).count();
    StatsResponse {
        total: incidents.len(),
        active: incidents
            .iter()
            .filter(|i| i.status != IncidentStatus::Resolved)
            .count(),
        critical: incidents
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count(),
        fire: count_kind(IncidentType::Fire),
        medical: count_kind(IncidentType::Medical),
        police: count_kind(IncidentType::Police),
        hazard: count_kind(IncidentType::Hazard),
        other: count_kind(IncidentType::Other),
    }
}

/// The three demo incidents the feed ships with before anyone reports.
pub fn demo_incidents() -> Vec<Incident> {
    let now = Utc::now();
    vec![
        Incident {
            id: "demofire1".into(),
            kind: IncidentType::Fire,
            description: "Large structural fire reported at warehouse district. Visible smoke."
                .into(),
            location: Location {
                lat: 40.7128,
                lng: -74.0060,
                address: Some("123 Industrial Ave".into()),
            },
            severity: Severity::Critical,
            status: IncidentStatus::Verified,
            timestamp: now - chrono::Duration::minutes(15),
            upvotes: 0,
            upvoted_by: BTreeSet::new(),
            image_url: None,
            notes: vec![Note {
                id: "demonote1".into(),
                author: "Dispatcher".into(),
                content: "Units dispatched.".into(),
                timestamp: now,
            }],
        },
        Incident {
            id: "demomed01".into(),
            kind: IncidentType::Medical,
            description: "Car accident, two vehicles involved. Possible injuries.".into(),
            location: Location {
                lat: 40.7150,
                lng: -74.0100,
                address: Some("Intersection of Main & 5th".into()),
            },
            severity: Severity::High,
            status: IncidentStatus::Unverified,
            timestamp: now - chrono::Duration::minutes(45),
            upvotes: 0,
            upvoted_by: BTreeSet::new(),
            image_url: None,
            notes: Vec::new(),
        },
        Incident {
            id: "demohaz01".into(),
            kind: IncidentType::Hazard,
            description: "Downed power line blocking the road.".into(),
            location: Location {
                lat: 40.7200,
                lng: -73.9900,
                address: Some("450 Park Lane".into()),
            },
            severity: Severity::Medium,
            status: IncidentStatus::Resolved,
            timestamp: now - chrono::Duration::hours(2),
            upvotes: 0,
            upvoted_by: BTreeSet::new(),
            image_url: None,
            notes: Vec::new(),
        },
    ]
}

impl IncidentStore {
    pub fn seed_demo(&self) {
        let mut guard = self.inner.write().unwrap();
        if guard.is_empty() {
            *guard = Arc::new(demo_incidents());
        }
    }
}
