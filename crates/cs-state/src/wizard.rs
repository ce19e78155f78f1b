//! # Certificate Wizard
//!
//! Four-step guided input flow for composing a certificate request.
//!
//! ```text
//! Introduction ──▶ Information ──▶ Activity ──▶ Mode
//!      ◀────────────── back() ◀──────────┘
//! ```
//!
//! There is no generic "next": every step has its own guarded advance. The
//! step state is a tagged union; `Activity` carries the validated
//! information section and `Mode` carries the finished request. The
//! editable draft lives beside it, so going back never loses input.
//!
//! Whenever the selected relation, the period end, or the weekly hours
//! change, the week count and total hours are recomputed. Without a
//! selected relation the derived values are left untouched.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use cs_core::{
    Clock, CommunicationMedium, Relation, RelationId, SystemClock, Timestamp, UserProfile,
};

use crate::request::{
    check_subjects, CertificateDraft, CertificateRequest, InformationSection, ValidationError,
};
use crate::step::Step;
use crate::workload;

// ─── Context ─────────────────────────────────────────────────────────

/// Everything the wizard needs from its surroundings.
#[derive(Debug, Clone)]
pub struct WizardContext {
    /// The authenticated user and their matches.
    pub user: UserProfile,
    /// Source of "now" for period defaults and date bounds.
    pub clock: Arc<dyn Clock>,
}

impl WizardContext {
    pub fn new(user: UserProfile, clock: Arc<dyn Clock>) -> Self {
        Self { user, clock }
    }

    /// Context reading wall-clock time.
    pub fn with_system_clock(user: UserProfile) -> Self {
        Self::new(user, Arc::new(SystemClock))
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors returned by wizard operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    /// The operation belongs to a different step.
    #[error("operation belongs to the {expected} step, but the wizard is at {actual}")]
    WrongStep { expected: Step, actual: Step },

    /// User input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ─── Wizard ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Progress {
    Introduction,
    Information,
    Activity { information: InformationSection },
    Mode { request: CertificateRequest },
}

impl Progress {
    fn step(&self) -> Step {
        match self {
            Self::Introduction => Step::Introduction,
            Self::Information => Step::Information,
            Self::Activity { .. } => Step::Activity,
            Self::Mode { .. } => Step::Mode,
        }
    }
}

/// A certificate wizard session over a fresh draft.
#[derive(Debug, Clone)]
pub struct Wizard {
    context: WizardContext,
    draft: CertificateDraft,
    progress: Progress,
}

impl Wizard {
    /// Start at the introduction with an empty draft.
    pub fn new(context: WizardContext) -> Self {
        let draft = CertificateDraft::new(context.clock.now());
        Self {
            context,
            draft,
            progress: Progress::Introduction,
        }
    }

    pub fn step(&self) -> Step {
        self.progress.step()
    }

    pub fn draft(&self) -> &CertificateDraft {
        &self.draft
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    /// The finished request, once the wizard has reached the mode step.
    pub fn request(&self) -> Option<&CertificateRequest> {
        match &self.progress {
            Progress::Mode { request } => Some(request),
            _ => None,
        }
    }

    /// The counterpart currently selected in the draft.
    pub fn selected_relation(&self) -> Option<&Relation> {
        self.draft
            .relation
            .as_ref()
            .and_then(|id| self.context.user.find_relation(id))
    }

    /// Whether the entered weekly hours would pass validation.
    pub fn is_workload_allowed(&self) -> bool {
        workload::is_workload_allowed(self.draft.hours_per_week)
    }

    /// Whether `end` may be picked as the period end for the selected
    /// relation: strictly before now and not before the relation's start date.
    pub fn is_end_date_selectable(&self, end: Timestamp) -> bool {
        match self.selected_relation() {
            Some(relation) => {
                end < self.context.clock.now() && end.date() >= relation.started_at.date()
            }
            None => false,
        }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Go one step back. Draft fields are kept as entered.
    pub fn back(&mut self) -> Step {
        let from = self.step();
        self.progress = match std::mem::replace(&mut self.progress, Progress::Introduction) {
            Progress::Introduction | Progress::Information => Progress::Introduction,
            Progress::Activity { .. } => Progress::Information,
            Progress::Mode { request } => Progress::Activity {
                information: request.information().clone(),
            },
        };
        debug!(from = %from, to = %self.step(), "certificate wizard moved back");
        self.step()
    }

    /// Leave the introduction.
    pub fn advance_introduction(&mut self) -> Result<(), WizardError> {
        self.require(Step::Introduction)?;
        self.progress = Progress::Information;
        info!(step = %Step::Information, "certificate wizard advanced");
        Ok(())
    }

    /// Validate the information fields and move to the activity step.
    pub fn advance_information(&mut self) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        let information = InformationSection::validate(&self.draft, &self.context.user)
            .map_err(|e| {
                debug!(reason = %e, "information step blocked");
                e
            })?;
        self.progress = Progress::Activity { information };
        info!(step = %Step::Activity, "certificate wizard advanced");
        Ok(())
    }

    /// Require at least one activity and move to the mode step with the
    /// finished request.
    pub fn advance_activity(&mut self) -> Result<(), WizardError> {
        let information = match &self.progress {
            Progress::Activity { information } => information.clone(),
            other => {
                return Err(WizardError::WrongStep {
                    expected: Step::Activity,
                    actual: other.step(),
                })
            }
        };
        let request = CertificateRequest::new(information, self.draft.activities.clone())
            .map_err(|e| {
                debug!(reason = %e, "activity step blocked");
                e
            })?;
        self.progress = Progress::Mode { request };
        info!(step = %Step::Mode, "certificate wizard advanced");
        Ok(())
    }

    // ── Information step ─────────────────────────────────────────────

    /// Choose the counterpart. Switching to a different counterpart clears
    /// the subjects and resets the period end to now, since the old end may
    /// precede the new start date. Re-selecting the current one keeps both.
    pub fn select_relation(&mut self, id: RelationId) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        if self.context.user.find_relation(&id).is_none() {
            return Err(ValidationError::UnknownRelation(id).into());
        }
        if self.draft.relation.as_ref() == Some(&id) {
            return Ok(());
        }
        debug!(relation = %id, "relation selected");
        self.draft.relation = Some(id);
        self.draft.subjects.clear();
        self.draft.period_end = self.context.clock.now();
        self.recompute_workload();
        Ok(())
    }

    /// Set the end of the certificate period.
    pub fn set_period_end(&mut self, end: Timestamp) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        let start = self
            .selected_relation()
            .map(|r| r.started_at)
            .ok_or(ValidationError::RelationMissing)?;
        if !self.is_end_date_selectable(end) {
            return Err(ValidationError::EndDateOutOfRange { end, start }.into());
        }
        self.draft.period_end = end;
        self.recompute_workload();
        Ok(())
    }

    /// Set the weekly hours. Any number is stored; the range and step are
    /// checked when advancing.
    pub fn set_hours_per_week(&mut self, hours: f64) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        self.draft.hours_per_week = hours;
        self.recompute_workload();
        Ok(())
    }

    /// Replace the subject selection. Duplicates are dropped, order kept.
    pub fn set_subjects(&mut self, subjects: Vec<String>) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        let relation = self
            .selected_relation()
            .ok_or(ValidationError::RelationMissing)?;
        check_subjects(relation, &subjects)?;
        let mut unique: Vec<String> = Vec::with_capacity(subjects.len());
        for subject in subjects {
            if !unique.contains(&subject) {
                unique.push(subject);
            }
        }
        self.draft.subjects = unique;
        Ok(())
    }

    pub fn set_medium(&mut self, medium: CommunicationMedium) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        self.draft.medium = Some(medium);
        Ok(())
    }

    /// Mark whether the tutoring is still ongoing.
    pub fn set_ongoing(&mut self, ongoing: bool) -> Result<(), WizardError> {
        self.require(Step::Information)?;
        self.draft.ongoing = ongoing;
        Ok(())
    }

    // ── Activity step ────────────────────────────────────────────────

    /// Append an activity description. Returns its index.
    pub fn add_activity(&mut self, text: &str) -> Result<usize, WizardError> {
        self.require(Step::Activity)?;
        let text = non_blank(text)?;
        self.draft.activities.push(text);
        Ok(self.draft.activities.len() - 1)
    }

    /// Replace the activity at `index`.
    pub fn update_activity(&mut self, index: usize, text: &str) -> Result<(), WizardError> {
        self.require(Step::Activity)?;
        let text = non_blank(text)?;
        let len = self.draft.activities.len();
        let slot = self
            .draft
            .activities
            .get_mut(index)
            .ok_or(ValidationError::ActivityIndex { index, len })?;
        *slot = text;
        Ok(())
    }

    /// Remove and return the activity at `index`.
    pub fn remove_activity(&mut self, index: usize) -> Result<String, WizardError> {
        self.require(Step::Activity)?;
        let len = self.draft.activities.len();
        if index >= len {
            return Err(ValidationError::ActivityIndex { index, len }.into());
        }
        Ok(self.draft.activities.remove(index))
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require(&self, expected: Step) -> Result<(), WizardError> {
        let actual = self.step();
        if actual != expected {
            return Err(WizardError::WrongStep { expected, actual });
        }
        Ok(())
    }

    fn recompute_workload(&mut self) {
        let Some(started_at) = self.selected_relation().map(|r| r.started_at) else {
            return;
        };
        let weeks = workload::weeks_between(started_at, self.draft.period_end);
        self.draft.week_count = weeks;
        self.draft.hours_total = workload::total_hours(self.draft.hours_per_week, weeks);
        debug!(
            week_count = weeks,
            hours_total = self.draft.hours_total,
            "workload recomputed"
        );
    }
}

fn non_blank(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankActivity);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::{FixedClock, UserId};
    use proptest::prelude::*;

    fn day(n: u64) -> Timestamp {
        Timestamp::parse("2026-01-05T10:00:00Z").unwrap().plus_days(n)
    }

    fn relation(id: &str, started: u64, subjects: &[&str]) -> Relation {
        Relation {
            id: RelationId::new(id).unwrap(),
            first_name: "Lea".into(),
            last_name: id.into(),
            started_at: day(started),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            dissolved: false,
        }
    }

    fn user() -> UserProfile {
        let mut dissolved = relation("late", 40, &["Englisch"]);
        dissolved.dissolved = true;
        UserProfile {
            id: UserId::new("student-1").unwrap(),
            first_name: "Max".into(),
            last_name: "Muster".into(),
            matches: vec![relation("early", 0, &["Mathematik", "Physik"])],
            dissolved_matches: vec![dissolved],
        }
    }

    /// A wizard whose clock reads day 100.
    fn wizard() -> Wizard {
        Wizard::new(WizardContext::new(user(), Arc::new(FixedClock(day(100)))))
    }

    fn rid(id: &str) -> RelationId {
        RelationId::new(id).unwrap()
    }

    fn at_information() -> Wizard {
        let mut w = wizard();
        w.advance_introduction().unwrap();
        w
    }

    fn filled_information() -> Wizard {
        let mut w = at_information();
        w.select_relation(rid("early")).unwrap();
        w.set_period_end(day(70)).unwrap();
        w.set_hours_per_week(2.0).unwrap();
        w.set_subjects(vec!["Mathematik".into()]).unwrap();
        w.set_medium(CommunicationMedium::VideoChat).unwrap();
        w
    }

    fn at_mode() -> Wizard {
        let mut w = filled_information();
        w.advance_information().unwrap();
        w.add_activity("Hausaufgabenbetreuung").unwrap();
        w.advance_activity().unwrap();
        w
    }

    #[test]
    fn test_fresh_wizard_starts_at_introduction() {
        let w = wizard();
        assert_eq!(w.step(), Step::Introduction);
        assert_eq!(w.draft().period_end(), day(100));
        assert!(w.request().is_none());
    }

    #[test]
    fn test_ten_week_example() {
        let w = filled_information();
        assert_eq!(w.draft().week_count(), 10);
        assert_eq!(w.draft().hours_total(), 20.0);
    }

    #[test]
    fn test_total_follows_hours_change() {
        let mut w = filled_information();
        w.set_hours_per_week(1.5).unwrap();
        assert_eq!(w.draft().hours_total(), 15.0);
        w.set_period_end(day(35)).unwrap();
        assert_eq!(w.draft().week_count(), 5);
        assert_eq!(w.draft().hours_total(), 7.5);
    }

    #[test]
    fn test_no_recompute_without_relation() {
        let mut w = at_information();
        w.set_hours_per_week(3.0).unwrap();
        assert_eq!(w.draft().hours_per_week(), 3.0);
        assert_eq!(w.draft().week_count(), 0);
        assert_eq!(w.draft().hours_total(), 0.0);
    }

    #[test]
    fn test_selecting_relation_resets_period_and_subjects() {
        let mut w = filled_information();
        w.select_relation(rid("late")).unwrap();
        assert_eq!(w.draft().period_end(), day(100));
        assert!(w.draft().subjects().is_empty());
        // Day 40 to day 100 is 60 days.
        assert_eq!(w.draft().week_count(), 8);
        assert_eq!(w.draft().hours_total(), 16.0);
    }

    #[test]
    fn test_reselecting_same_relation_keeps_input() {
        let mut w = filled_information();
        w.select_relation(rid("early")).unwrap();
        assert_eq!(w.draft().period_end(), day(70));
        assert_eq!(w.draft().subjects(), ["Mathematik"]);
        assert_eq!(w.draft().week_count(), 10);
        assert_eq!(w.draft().hours_total(), 20.0);
    }

    #[test]
    fn test_unknown_relation_rejected() {
        let mut w = at_information();
        assert_eq!(
            w.select_relation(rid("stranger")),
            Err(WizardError::Validation(ValidationError::UnknownRelation(rid(
                "stranger"
            ))))
        );
        assert!(w.draft().relation().is_none());
    }

    #[test]
    fn test_end_date_bounds() {
        let mut w = at_information();
        assert_eq!(
            w.set_period_end(day(10)),
            Err(WizardError::Validation(ValidationError::RelationMissing))
        );

        w.select_relation(rid("late")).unwrap();
        assert!(!w.is_end_date_selectable(day(39)));
        assert!(w.is_end_date_selectable(day(40)));
        assert!(w.is_end_date_selectable(day(99)));
        assert!(!w.is_end_date_selectable(day(100)));
        assert!(!w.is_end_date_selectable(day(130)));
        assert!(matches!(
            w.set_period_end(day(39)),
            Err(WizardError::Validation(ValidationError::EndDateOutOfRange { .. }))
        ));
        assert_eq!(w.draft().period_end(), day(100));
    }

    #[test]
    fn test_subjects_must_come_from_relation() {
        let mut w = at_information();
        assert_eq!(
            w.set_subjects(vec!["Mathematik".into()]),
            Err(WizardError::Validation(ValidationError::RelationMissing))
        );
        w.select_relation(rid("early")).unwrap();
        assert!(w.set_subjects(vec!["Englisch".into()]).is_err());
        w.set_subjects(vec!["Physik".into(), "Mathematik".into(), "Physik".into()])
            .unwrap();
        assert_eq!(w.draft().subjects(), ["Physik", "Mathematik"]);
    }

    #[test]
    fn test_zero_subjects_blocks_advance() {
        let mut w = filled_information();
        w.set_subjects(vec![]).unwrap();
        assert_eq!(
            w.advance_information(),
            Err(WizardError::Validation(ValidationError::SubjectsMissing))
        );
        assert_eq!(w.step(), Step::Information);
    }

    #[test]
    fn test_invalid_workload_blocks_advance() {
        let mut w = filled_information();
        w.set_hours_per_week(0.1).unwrap();
        assert!(!w.is_workload_allowed());
        assert_eq!(
            w.advance_information(),
            Err(WizardError::Validation(ValidationError::WorkloadNotAllowed {
                hours: 0.1
            }))
        );
        w.set_hours_per_week(40.0).unwrap();
        w.advance_information().unwrap();
        assert_eq!(w.step(), Step::Activity);
    }

    #[test]
    fn test_missing_medium_blocks_advance() {
        let mut w = at_information();
        w.select_relation(rid("early")).unwrap();
        w.set_subjects(vec!["Physik".into()]).unwrap();
        assert_eq!(
            w.advance_information(),
            Err(WizardError::Validation(ValidationError::MediumMissing))
        );
    }

    #[test]
    fn test_no_matches_blocks_information_step() {
        let mut user = user();
        user.matches.clear();
        user.dissolved_matches.clear();
        let mut w = Wizard::new(WizardContext::new(user, Arc::new(FixedClock(day(100)))));
        w.advance_introduction().unwrap();
        assert_eq!(
            w.advance_information(),
            Err(WizardError::Validation(ValidationError::NoRelations))
        );
    }

    #[test]
    fn test_back_from_activity_keeps_fields() {
        let mut w = filled_information();
        w.set_ongoing(true).unwrap();
        w.advance_information().unwrap();
        w.add_activity("Vorbereitung auf Klassenarbeiten").unwrap();
        let before = w.draft().clone();

        assert_eq!(w.back(), Step::Information);
        assert_eq!(w.draft(), &before);
        w.advance_information().unwrap();
        assert_eq!(w.draft().activities(), ["Vorbereitung auf Klassenarbeiten"]);
    }

    #[test]
    fn test_back_from_mode_and_introduction() {
        let mut w = at_mode();
        assert_eq!(w.back(), Step::Activity);
        assert!(w.request().is_none());
        w.advance_activity().unwrap();
        assert!(w.request().is_some());

        let mut fresh = wizard();
        assert_eq!(fresh.back(), Step::Introduction);
    }

    #[test]
    fn test_activity_step_requires_entry() {
        let mut w = filled_information();
        w.advance_information().unwrap();
        assert_eq!(
            w.advance_activity(),
            Err(WizardError::Validation(ValidationError::ActivitiesMissing))
        );
        assert_eq!(
            w.add_activity("   "),
            Err(WizardError::Validation(ValidationError::BlankActivity))
        );
    }

    #[test]
    fn test_activity_editing() {
        let mut w = filled_information();
        w.advance_information().unwrap();
        assert_eq!(w.add_activity(" Nachhilfe Mathe ").unwrap(), 0);
        assert_eq!(w.add_activity("Referat geübt").unwrap(), 1);
        w.update_activity(1, "Referat vorbereitet").unwrap();
        assert_eq!(w.remove_activity(0).unwrap(), "Nachhilfe Mathe");
        assert_eq!(w.draft().activities(), ["Referat vorbereitet"]);
        assert_eq!(
            w.remove_activity(5),
            Err(WizardError::Validation(ValidationError::ActivityIndex {
                index: 5,
                len: 1
            }))
        );
    }

    #[test]
    fn test_operations_are_bound_to_their_step() {
        let mut w = wizard();
        assert_eq!(
            w.set_medium(CommunicationMedium::Phone),
            Err(WizardError::WrongStep {
                expected: Step::Information,
                actual: Step::Introduction
            })
        );
        assert!(w.add_activity("x").is_err());
        assert!(w.advance_information().is_err());

        let mut w = at_mode();
        assert!(w.set_hours_per_week(3.0).is_err());
        assert!(w.advance_introduction().is_err());
    }

    #[test]
    fn test_request_snapshot() {
        let w = at_mode();
        let request = w.request().unwrap();
        assert_eq!(request.relation(), &rid("early"));
        assert_eq!(request.week_count(), 10);
        assert_eq!(request.hours_total(), 20.0);
        assert_eq!(request.medium(), CommunicationMedium::VideoChat);
        assert_eq!(request.activities(), ["Hausaufgabenbetreuung"]);
        assert_eq!(request.period_end(), day(70));
    }

    proptest! {
        #[test]
        fn prop_total_tracks_hours_and_period_edits(
            edits in proptest::collection::vec((any::<bool>(), 0u32..100), 1..20)
        ) {
            let mut w = at_information();
            w.select_relation(rid("early")).unwrap();
            for (is_hours, value) in edits {
                if is_hours {
                    w.set_hours_per_week(f64::from(value) * 0.25).unwrap();
                } else {
                    w.set_period_end(day(u64::from(value))).unwrap();
                    prop_assert_eq!(w.draft().week_count(), value / 7);
                }
                let draft = w.draft();
                prop_assert_eq!(
                    draft.hours_total(),
                    draft.hours_per_week() * f64::from(draft.week_count())
                );
            }
        }
    }
}
