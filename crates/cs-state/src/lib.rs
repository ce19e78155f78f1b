//! # cs-state: Certificate Workflow State Machines
//!
//! Implements the stateful part of the certificate request flow as plain
//! Rust values that any front end can drive.
//!
//! ## State Machines
//!
//! - **Wizard** (`wizard.rs`): `Introduction → Information → Activity → Mode`
//!   with guarded forward moves and lossless `back()`. Recomputes the week
//!   count and total hours as the relation, period end, or weekly hours change.
//!
//! - **Download** (`download.rs`): `Idle → Loading → Success | Error` for the
//!   rendered document, with manual retry and per-fetch delivery.
//!
//! - **Session** (`session.rs`): `Closed → Composing → Submitting →
//!   Created | Failed`, wrapping the two above and the remote calls.
//!
//! ## Seams
//!
//! `CertificateGateway` abstracts the remote create/fetch pair and
//! `DocumentSink` the place documents are saved to. Both are passed in by the
//! caller; the crate holds no global state.

pub mod download;
pub mod gateway;
pub mod request;
pub mod session;
pub mod step;
pub mod workload;
pub mod wizard;

// ─── Wizard re-exports ──────────────────────────────────────────────

pub use request::{CertificateDraft, CertificateRequest, InformationSection, ValidationError};
pub use step::Step;
pub use wizard::{Wizard, WizardContext, WizardError};

// ─── Download re-exports ────────────────────────────────────────────

pub use download::{
    CertificateDocument, DownloadError, DownloadStage, DownloadState, FetchTicket,
    CERTIFICATE_FILE_NAME,
};

// ─── Session re-exports ─────────────────────────────────────────────

pub use gateway::{CertificateGateway, DocumentSink, GatewayError, MemorySink, SinkError};
pub use session::{CertificateSession, SessionError, SessionState};
