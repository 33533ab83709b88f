use crate::schema::incident::{IncidentType, Location, Severity};
use crate::store::incidents::IncidentDraft;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Details,
    Location,
    Evidence,
}

/// Client-side accumulation of a report across the three form steps.
/// Stepping forward out of `Location` requires a description; everything
/// else is unguarded. Losing the geolocation capability is not an error:
/// the location simply stays at the (0, 0) default.
#[derive(Clone, Debug)]
pub struct ReportDraft {
    step: Step,
    pub kind: IncidentType,
    pub severity: Severity,
    pub description: String,
    pub location: Location,
    pub image_url: Option<String>,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            step: Step::Details,
            kind: IncidentType::Fire,
            severity: Severity::Medium,
            description: String::new(),
            location: Location::default(),
            image_url: None,
        }
    }
}

impl ReportDraft {
    /// A draft already carrying everything the form collects, positioned at
    /// the submission step. `None` for the location keeps the (0, 0) default.
    pub fn filled(
        kind: IncidentType,
        severity: Severity,
        description: String,
        location: Option<Location>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            step: Step::Evidence,
            kind,
            severity,
            description,
            location: location.unwrap_or_default(),
            image_url,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn next(&mut self) -> Result<Step, &'static str> {
        self.step = match self.step {
            Step::Details => Step::Location,
            Step::Location => {
                if self.description.trim().is_empty() {
                    return Err("A description is required before continuing");
                }
                Step::Evidence
            }
            Step::Evidence => Step::Evidence,
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Step {
        self.step = match self.step {
            Step::Details | Step::Location => Step::Details,
            Step::Evidence => Step::Location,
        };
        self.step
    }

    /// Adopts acquired coordinates; the address mirrors them, as the form
    /// does when no street address is known.
    pub fn set_coordinates(&mut self, lat: f64, lng: f64) {
        self.location = Location {
            lat,
            lng,
            address: Some(format!("{lat:.4}, {lng:.4}")),
        };
    }

    pub fn submit(self) -> Result<IncidentDraft, &'static str> {
        if self.description.trim().is_empty() {
            return Err("A description is required");
        }
        Ok(IncidentDraft {
            kind: self.kind,
            description: self.description,
            severity: self.severity,
            location: self.location,
            image_url: self.image_url,
        })
    }
}
