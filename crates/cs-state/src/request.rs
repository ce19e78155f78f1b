//! # Certificate Draft and Request
//!
//! `CertificateDraft` is the mutable record the wizard edits. Validation
//! turns it into an `InformationSection` when leaving the information step,
//! and the section plus the activity list into a `CertificateRequest` when
//! leaving the activity step. A request is never mutated afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cs_core::{CommunicationMedium, Relation, RelationId, Timestamp, UserProfile};

use crate::workload;

/// Default weekly workload of a fresh draft, in hours.
pub const DEFAULT_HOURS_PER_WEEK: f64 = 1.0;

// ─── Validation errors ───────────────────────────────────────────────

/// A user input that blocks advancing the wizard. All are recoverable by
/// correcting the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("you have no matches a certificate could be requested for")]
    NoRelations,

    #[error("a pupil must be selected")]
    RelationMissing,

    #[error("relation {0} is not one of your matches")]
    UnknownRelation(RelationId),

    #[error("at least one subject must be selected")]
    SubjectsMissing,

    #[error("subject {subject:?} is not taught in this match")]
    SubjectNotOffered { subject: String },

    #[error("a communication medium must be selected")]
    MediumMissing,

    #[error(
        "weekly workload must be given in 15-minute steps, at least 15 minutes \
         and at most 40 hours (got {hours})"
    )]
    WorkloadNotAllowed { hours: f64 },

    #[error("end date {end} must be before today and not before the match started on {start}")]
    EndDateOutOfRange { end: Timestamp, start: Timestamp },

    #[error("at least one activity must be entered")]
    ActivitiesMissing,

    #[error("an activity description must not be blank")]
    BlankActivity,

    #[error("no activity at position {index} (have {len})")]
    ActivityIndex { index: usize, len: usize },
}

// ─── Draft ───────────────────────────────────────────────────────────

/// The in-progress certificate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateDraft {
    pub(crate) relation: Option<RelationId>,
    pub(crate) period_end: Timestamp,
    pub(crate) week_count: u32,
    pub(crate) hours_per_week: f64,
    pub(crate) hours_total: f64,
    pub(crate) subjects: Vec<String>,
    pub(crate) medium: Option<CommunicationMedium>,
    pub(crate) activities: Vec<String>,
    pub(crate) ongoing: bool,
}

impl CertificateDraft {
    /// An empty draft whose period ends at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            relation: None,
            period_end: now,
            week_count: 0,
            hours_per_week: DEFAULT_HOURS_PER_WEEK,
            hours_total: 0.0,
            subjects: Vec::new(),
            medium: None,
            activities: Vec::new(),
            ongoing: false,
        }
    }

    pub fn relation(&self) -> Option<&RelationId> {
        self.relation.as_ref()
    }

    pub fn period_end(&self) -> Timestamp {
        self.period_end
    }

    pub fn week_count(&self) -> u32 {
        self.week_count
    }

    pub fn hours_per_week(&self) -> f64 {
        self.hours_per_week
    }

    pub fn hours_total(&self) -> f64 {
        self.hours_total
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn medium(&self) -> Option<CommunicationMedium> {
        self.medium
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn ongoing(&self) -> bool {
        self.ongoing
    }
}

// ─── Validated sections ──────────────────────────────────────────────

/// Everything the information step collects, validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationSection {
    relation: RelationId,
    period_end: Timestamp,
    week_count: u32,
    hours_per_week: f64,
    hours_total: f64,
    subjects: Vec<String>,
    medium: CommunicationMedium,
    ongoing: bool,
}

impl InformationSection {
    /// Validate the information fields of `draft` against `user`'s matches.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// matches exist, relation selected, subjects, medium, workload.
    pub fn validate(
        draft: &CertificateDraft,
        user: &UserProfile,
    ) -> Result<Self, ValidationError> {
        if !user.has_relations() {
            return Err(ValidationError::NoRelations);
        }
        let relation = draft.relation.clone().ok_or(ValidationError::RelationMissing)?;
        let counterpart = user
            .find_relation(&relation)
            .ok_or_else(|| ValidationError::UnknownRelation(relation.clone()))?;
        if draft.subjects.is_empty() {
            return Err(ValidationError::SubjectsMissing);
        }
        check_subjects(counterpart, &draft.subjects)?;
        let medium = draft.medium.ok_or(ValidationError::MediumMissing)?;
        workload::validate_workload(draft.hours_per_week)?;

        Ok(Self {
            relation,
            period_end: draft.period_end,
            week_count: draft.week_count,
            hours_per_week: draft.hours_per_week,
            hours_total: draft.hours_total,
            subjects: draft.subjects.clone(),
            medium,
            ongoing: draft.ongoing,
        })
    }
}

/// Every subject must be on the counterpart's list.
pub(crate) fn check_subjects(relation: &Relation, subjects: &[String]) -> Result<(), ValidationError> {
    match subjects.iter().find(|s| !relation.offers_subject(s)) {
        Some(subject) => Err(ValidationError::SubjectNotOffered {
            subject: subject.clone(),
        }),
        None => Ok(()),
    }
}

// ─── Request ─────────────────────────────────────────────────────────

/// A complete certificate request, ready to be sent to the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRequest {
    information: InformationSection,
    activities: Vec<String>,
}

impl CertificateRequest {
    /// Combine a validated information section with the activity list.
    pub fn new(
        information: InformationSection,
        activities: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if activities.is_empty() {
            return Err(ValidationError::ActivitiesMissing);
        }
        Ok(Self {
            information,
            activities,
        })
    }

    pub(crate) fn information(&self) -> &InformationSection {
        &self.information
    }

    pub fn relation(&self) -> &RelationId {
        &self.information.relation
    }

    pub fn period_end(&self) -> Timestamp {
        self.information.period_end
    }

    pub fn week_count(&self) -> u32 {
        self.information.week_count
    }

    pub fn hours_per_week(&self) -> f64 {
        self.information.hours_per_week
    }

    pub fn hours_total(&self) -> f64 {
        self.information.hours_total
    }

    pub fn subjects(&self) -> &[String] {
        &self.information.subjects
    }

    pub fn medium(&self) -> CommunicationMedium {
        self.information.medium
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn ongoing(&self) -> bool {
        self.information.ongoing
    }
}
