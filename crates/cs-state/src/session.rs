//! # Certificate Session
//!
//! Outer lifecycle around the wizard, from opening the dialog to saving the
//! rendered document.
//!
//! ```text
//! Closed ──open──▶ Composing ──begin_submission──▶ Submitting ──ok──▶ Created
//!   ▲                 ▲                               │
//!   │                 └──acknowledge_failure── Failed ◀──err
//!   └──────────────────────── close() from any state
//! ```
//!
//! A session is owned by one caller and mutated from discrete UI or
//! network-completion callbacks. Only one creation request can be
//! outstanding: `begin_submission` is refused while `Submitting`. Closing
//! discards everything; reopening starts from an empty draft.

use thiserror::Error;
use tracing::{info, warn};

use cs_core::CertificateId;

use crate::download::{DownloadError, DownloadStage};
use crate::gateway::{CertificateGateway, DocumentSink, GatewayError, SinkError};
use crate::request::CertificateRequest;
use crate::step::Step;
use crate::wizard::{Wizard, WizardContext};

/// Lifecycle state of a certificate session.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No dialog open.
    Closed,
    /// The wizard is collecting input.
    Composing(Wizard),
    /// The request has been sent; waiting for the identifier.
    Submitting(Wizard),
    /// Creation failed. The wizard is kept at the mode step.
    Failed { wizard: Wizard, reason: String },
    /// The certificate exists; documents can be fetched.
    Created(DownloadStage),
}

impl SessionState {
    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Composing(_) => "COMPOSING",
            Self::Submitting(_) => "SUBMITTING",
            Self::Failed { .. } => "FAILED",
            Self::Created(_) => "CREATED",
        }
    }
}

/// Errors from session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("the certificate dialog is not open")]
    NotOpen,

    #[error("the certificate dialog is already open")]
    AlreadyOpen,

    #[error("the request is not complete yet (wizard is at the {step} step)")]
    NotReadyToSubmit { step: Step },

    #[error("a certificate request is already being submitted")]
    SubmissionInFlight,

    #[error("no certificate request is being submitted")]
    NoSubmissionInFlight,

    #[error("the certificate has already been created")]
    AlreadyCreated,

    #[error("the certificate has not been created yet")]
    NotCreated,

    #[error("certificate creation failed: {0}")]
    Create(GatewayError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("an error occurred while saving the certificate, please contact Corona School support ({0})")]
    Sink(SinkError),
}

/// One certificate dialog, from open to download.
#[derive(Debug, Clone)]
pub struct CertificateSession {
    state: SessionState,
}

impl Default for CertificateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateSession {
    /// A closed session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, SessionState::Closed)
    }

    /// Open the dialog with a fresh wizard.
    pub fn open(&mut self, context: WizardContext) -> Result<&mut Wizard, SessionError> {
        if self.is_open() {
            return Err(SessionError::AlreadyOpen);
        }
        info!(user = %context.user.id, "certificate dialog opened");
        self.state = SessionState::Composing(Wizard::new(context));
        match &mut self.state {
            SessionState::Composing(wizard) => Ok(wizard),
            _ => Err(SessionError::NotOpen),
        }
    }

    /// Close the dialog from any state, discarding unsent input.
    pub fn close(&mut self) {
        if self.is_open() {
            info!(from = self.state.name(), "certificate dialog closed");
        }
        self.state = SessionState::Closed;
    }

    /// The wizard, while composing.
    pub fn wizard(&self) -> Option<&Wizard> {
        match &self.state {
            SessionState::Composing(wizard) => Some(wizard),
            _ => None,
        }
    }

    pub fn wizard_mut(&mut self) -> Option<&mut Wizard> {
        match &mut self.state {
            SessionState::Composing(wizard) => Some(wizard),
            _ => None,
        }
    }

    /// The download stage, once the certificate exists.
    pub fn download(&self) -> Option<&DownloadStage> {
        match &self.state {
            SessionState::Created(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn download_mut(&mut self) -> Option<&mut DownloadStage> {
        match &mut self.state {
            SessionState::Created(stage) => Some(stage),
            _ => None,
        }
    }

    /// Freeze the request for sending and enter `Submitting`.
    ///
    /// Allowed from `Composing` at the mode step and from `Failed`.
    pub fn begin_submission(&mut self) -> Result<CertificateRequest, SessionError> {
        let request = match &self.state {
            SessionState::Composing(wizard) | SessionState::Failed { wizard, .. } => wizard
                .request()
                .cloned()
                .ok_or(SessionError::NotReadyToSubmit {
                    step: wizard.step(),
                })?,
            SessionState::Submitting(_) => return Err(SessionError::SubmissionInFlight),
            SessionState::Created(_) => return Err(SessionError::AlreadyCreated),
            SessionState::Closed => return Err(SessionError::NotOpen),
        };
        self.state = match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Composing(wizard) | SessionState::Failed { wizard, .. } => {
                SessionState::Submitting(wizard)
            }
            other => other,
        };
        info!(relation = %request.relation(), "certificate request submitted");
        Ok(request)
    }

    /// Record the outcome of the creation call.
    pub fn complete_submission(
        &mut self,
        outcome: Result<CertificateId, GatewayError>,
    ) -> Result<CertificateId, SessionError> {
        let wizard = match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Submitting(wizard) => wizard,
            other => {
                self.state = other;
                return Err(SessionError::NoSubmissionInFlight);
            }
        };
        match outcome {
            Ok(id) => {
                info!(certificate = %id, "certificate created");
                self.state = SessionState::Created(DownloadStage::new(id.clone()));
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "certificate creation failed");
                self.state = SessionState::Failed {
                    wizard,
                    reason: e.to_string(),
                };
                Err(SessionError::Create(e))
            }
        }
    }

    /// Leave `Failed` and return to the wizard.
    pub fn acknowledge_failure(&mut self) -> Result<(), SessionError> {
        self.state = match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Failed { wizard, .. } => SessionState::Composing(wizard),
            other => {
                let err = match &other {
                    SessionState::Closed => SessionError::NotOpen,
                    SessionState::Submitting(_) => SessionError::SubmissionInFlight,
                    SessionState::Created(_) => SessionError::AlreadyCreated,
                    _ => SessionError::NoSubmissionInFlight,
                };
                self.state = other;
                return Err(err);
            }
        };
        Ok(())
    }

    /// Submit the finished request through `gateway`.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<CertificateId, SessionError>
    where
        G: CertificateGateway + ?Sized,
    {
        let request = self.begin_submission()?;
        let outcome = gateway.create_certificate(&request).await;
        self.complete_submission(outcome)
    }

    /// Fetch the document in the selected language and hand it to `sink`.
    pub async fn fetch_document<G, S>(&mut self, gateway: &G, sink: &mut S) -> Result<(), SessionError>
    where
        G: CertificateGateway + ?Sized,
        S: DocumentSink + ?Sized,
    {
        let stage = self.download_mut().ok_or(SessionError::NotCreated)?;
        let ticket = stage.begin_fetch()?;
        let outcome = gateway
            .get_certificate(&ticket.certificate, ticket.language)
            .await
            .map_err(|e| e.to_string());
        let document = stage.complete_fetch(outcome)?;
        sink.save(&document).map_err(|e| {
            warn!(error = %e, "certificate could not be saved");
            SessionError::Sink(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use cs_core::{
        CommunicationMedium, FixedClock, LanguageCode, Relation, RelationId, Timestamp, UserId,
        UserProfile,
    };

    use crate::download::DownloadState;
    use crate::gateway::MemorySink;

    #[derive(Default)]
    struct ScriptedGateway {
        create: Mutex<Vec<Result<CertificateId, GatewayError>>>,
        fetch: Mutex<Vec<Result<Vec<u8>, GatewayError>>>,
        requested_languages: Mutex<Vec<LanguageCode>>,
    }

    impl ScriptedGateway {
        fn creating(results: Vec<Result<CertificateId, GatewayError>>) -> Self {
            Self {
                create: Mutex::new(results),
                ..Self::default()
            }
        }

        fn fetching(self, results: Vec<Result<Vec<u8>, GatewayError>>) -> Self {
            *self.fetch.lock().unwrap() = results;
            self
        }
    }

    #[async_trait]
    impl CertificateGateway for ScriptedGateway {
        async fn create_certificate(
            &self,
            _request: &CertificateRequest,
        ) -> Result<CertificateId, GatewayError> {
            self.create.lock().unwrap().remove(0)
        }

        async fn get_certificate(
            &self,
            _certificate: &CertificateId,
            language: LanguageCode,
        ) -> Result<Vec<u8>, GatewayError> {
            self.requested_languages.lock().unwrap().push(language);
            self.fetch.lock().unwrap().remove(0)
        }
    }

    struct BrokenSink;

    impl DocumentSink for BrokenSink {
        fn save(&mut self, _document: &crate::download::CertificateDocument) -> Result<(), SinkError> {
            Err(SinkError::Other("disk full".into()))
        }
    }

    fn day(n: u64) -> Timestamp {
        Timestamp::parse("2026-02-02T12:00:00Z").unwrap().plus_days(n)
    }

    fn context() -> WizardContext {
        let user = UserProfile {
            id: UserId::new("student-9").unwrap(),
            first_name: "Jana".into(),
            last_name: "Klein".into(),
            matches: vec![Relation {
                id: RelationId::new("match-3").unwrap(),
                first_name: "Emil".into(),
                last_name: "Brandt".into(),
                started_at: day(0),
                subjects: vec!["Deutsch".into(), "Chemie".into()],
                dissolved: false,
            }],
            dissolved_matches: vec![],
        };
        WizardContext::new(user, Arc::new(FixedClock(day(90))))
    }

    fn cert(id: &str) -> CertificateId {
        CertificateId::new(id).unwrap()
    }

    fn open_at_mode(session: &mut CertificateSession) {
        let wizard = session.open(context()).unwrap();
        wizard.advance_introduction().unwrap();
        wizard.select_relation(RelationId::new("match-3").unwrap()).unwrap();
        wizard.set_period_end(day(56)).unwrap();
        wizard.set_subjects(vec!["Chemie".into()]).unwrap();
        wizard.set_medium(CommunicationMedium::Email).unwrap();
        wizard.set_hours_per_week(1.25).unwrap();
        wizard.advance_information().unwrap();
        wizard.add_activity("Versuchsprotokolle besprochen").unwrap();
        wizard.advance_activity().unwrap();
    }

    #[test]
    fn test_open_and_close() {
        let mut session = CertificateSession::new();
        assert!(!session.is_open());
        session.open(context()).unwrap();
        assert!(matches!(session.open(context()), Err(SessionError::AlreadyOpen)));
        session.close();
        assert!(!session.is_open());
        assert!(session.wizard().is_none());
    }

    #[test]
    fn test_reopen_starts_fresh() {
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        session.close();
        let wizard = session.open(context()).unwrap();
        assert_eq!(wizard.step(), Step::Introduction);
        assert!(wizard.draft().relation().is_none());
        assert!(wizard.draft().activities().is_empty());
    }

    #[test]
    fn test_submission_requires_mode_step() {
        let mut session = CertificateSession::new();
        assert!(matches!(session.begin_submission(), Err(SessionError::NotOpen)));
        session.open(context()).unwrap();
        assert!(matches!(
            session.begin_submission(),
            Err(SessionError::NotReadyToSubmit {
                step: Step::Introduction
            })
        ));
    }

    #[test]
    fn test_double_submission_refused() {
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        let request = session.begin_submission().unwrap();
        assert_eq!(request.week_count(), 8);
        assert_eq!(request.hours_total(), 10.0);
        assert!(matches!(
            session.begin_submission(),
            Err(SessionError::SubmissionInFlight)
        ));
        assert!(session.wizard_mut().is_none());
        session.complete_submission(Ok(cert("C-1"))).unwrap();
        assert!(matches!(session.state(), SessionState::Created(_)));
    }

    #[test]
    fn test_completion_without_submission_refused() {
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        assert!(matches!(
            session.complete_submission(Ok(cert("C-1"))),
            Err(SessionError::NoSubmissionInFlight)
        ));
        assert!(matches!(session.state(), SessionState::Composing(_)));
    }

    #[test]
    fn test_close_while_submitting_discards() {
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        session.begin_submission().unwrap();
        session.close();
        assert!(matches!(
            session.complete_submission(Ok(cert("late"))),
            Err(SessionError::NoSubmissionInFlight)
        ));
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_failed_creation_can_be_reattempted() {
        let gateway = ScriptedGateway::creating(vec![
            Err(GatewayError::Transport("connection reset".into())),
            Ok(cert("C-2")),
        ]);
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);

        let err = session.submit(&gateway).await.unwrap_err();
        assert!(matches!(err, SessionError::Create(GatewayError::Transport(_))));
        match session.state() {
            SessionState::Failed { wizard, reason } => {
                assert_eq!(wizard.step(), Step::Mode);
                assert!(reason.contains("connection reset"));
            }
            other => panic!("expected Failed, got {}", other.name()),
        }

        let id = session.submit(&gateway).await.unwrap();
        assert_eq!(id, cert("C-2"));
        assert_eq!(session.download().unwrap().state(), &DownloadState::Idle);
    }

    #[test]
    fn test_acknowledge_failure_returns_to_wizard() {
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        session.begin_submission().unwrap();
        let _ = session.complete_submission(Err(GatewayError::Rejected {
            status: 400,
            message: "bad".into(),
        }));
        session.acknowledge_failure().unwrap();
        let wizard = session.wizard_mut().unwrap();
        assert_eq!(wizard.back(), Step::Activity);
        assert!(matches!(
            session.acknowledge_failure(),
            Err(SessionError::NoSubmissionInFlight)
        ));
    }

    #[tokio::test]
    async fn test_full_flow_downloads_document() {
        let gateway = ScriptedGateway::creating(vec![Ok(cert("C-3"))])
            .fetching(vec![Ok(b"%PDF".to_vec())]);
        let mut session = CertificateSession::new();
        let mut sink = MemorySink::default();
        open_at_mode(&mut session);

        session.submit(&gateway).await.unwrap();
        session.fetch_document(&gateway, &mut sink).await.unwrap();

        assert_eq!(sink.documents.len(), 1);
        assert_eq!(sink.documents[0].file_name, "certificate.pdf");
        assert_eq!(sink.documents[0].bytes, b"%PDF");
        assert!(session.download().unwrap().is_downloaded());
    }

    #[tokio::test]
    async fn test_fetch_failure_then_language_change_and_retry() {
        let gateway = ScriptedGateway::creating(vec![Ok(cert("C-4"))]).fetching(vec![
            Err(GatewayError::Rejected {
                status: 500,
                message: "render failed".into(),
            }),
            Ok(vec![7]),
        ]);
        let mut session = CertificateSession::new();
        let mut sink = MemorySink::default();
        open_at_mode(&mut session);
        session.submit(&gateway).await.unwrap();

        let err = session.fetch_document(&gateway, &mut sink).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Download(DownloadError::FetchFailed(_))
        ));
        assert!(matches!(
            session.download().unwrap().state(),
            DownloadState::Error(_)
        ));
        assert!(sink.documents.is_empty());

        session
            .download_mut()
            .unwrap()
            .set_language(LanguageCode::En)
            .unwrap();
        session.fetch_document(&gateway, &mut sink).await.unwrap();
        assert_eq!(sink.documents.len(), 1);
        assert_eq!(
            *gateway.requested_languages.lock().unwrap(),
            vec![LanguageCode::De, LanguageCode::En]
        );
    }

    #[tokio::test]
    async fn test_sink_failure_reports_support_message() {
        let gateway = ScriptedGateway::creating(vec![Ok(cert("C-5"))])
            .fetching(vec![Ok(vec![1])]);
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        session.submit(&gateway).await.unwrap();

        let err = session
            .fetch_document(&gateway, &mut BrokenSink)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("contact Corona School support"));
    }

    #[tokio::test]
    async fn test_fetch_before_creation_refused() {
        let gateway = ScriptedGateway::default();
        let mut session = CertificateSession::new();
        open_at_mode(&mut session);
        let err = session
            .fetch_document(&gateway, &mut MemorySink::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotCreated));
    }
}
