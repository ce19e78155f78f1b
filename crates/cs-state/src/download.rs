//! # Certificate Download Stage
//!
//! Entered once the remote API has issued an identifier for the request.
//!
//! ```text
//! Idle ──begin_fetch──▶ Loading ──ok──▶ Success ─┐
//!   ▲                      │                     │ set_language / begin_fetch
//!   │                      └──err──▶ Error ──────┤
//!   └────────────────────────────────────────────┘
//! ```
//!
//! Each successful fetch yields exactly one [`CertificateDocument`]. A
//! failed fetch is never retried automatically; the caller starts another
//! fetch to retry.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use cs_core::{CertificateId, LanguageCode};

/// File name the rendered document is saved under.
pub const CERTIFICATE_FILE_NAME: &str = "certificate.pdf";

/// Progress of the document request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadState {
    Idle,
    Loading,
    Error(String),
    Success { size: usize },
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::Loading => f.write_str("LOADING"),
            Self::Error(_) => f.write_str("ERROR"),
            Self::Success { .. } => f.write_str("SUCCESS"),
        }
    }
}

/// Errors from download stage transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    #[error("a certificate download is already in progress")]
    FetchInFlight,

    #[error("no certificate download is in progress")]
    NoPendingFetch,

    #[error("the certificate could not be downloaded: {0}")]
    FetchFailed(String),
}

/// What to fetch: handed out by [`DownloadStage::begin_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub certificate: CertificateId,
    pub language: LanguageCode,
}

/// A rendered certificate, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    pub file_name: &'static str,
    pub certificate: CertificateId,
    pub language: LanguageCode,
    pub bytes: Vec<u8>,
}

/// Download state for one created certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadStage {
    certificate: CertificateId,
    language: LanguageCode,
    state: DownloadState,
    completed_fetches: u32,
}

impl DownloadStage {
    /// A stage for `certificate` in the default language.
    pub fn new(certificate: CertificateId) -> Self {
        Self {
            certificate,
            language: LanguageCode::default(),
            state: DownloadState::Idle,
            completed_fetches: 0,
        }
    }

    pub fn certificate(&self) -> &CertificateId {
        &self.certificate
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    /// Number of fetches that delivered a document.
    pub fn completed_fetches(&self) -> u32 {
        self.completed_fetches
    }

    /// Whether at least one document has been delivered.
    pub fn is_downloaded(&self) -> bool {
        self.completed_fetches > 0
    }

    /// Choose the document language. Not allowed while a fetch is running.
    pub fn set_language(&mut self, language: LanguageCode) -> Result<(), DownloadError> {
        if self.state == DownloadState::Loading {
            return Err(DownloadError::FetchInFlight);
        }
        self.language = language;
        Ok(())
    }

    /// Enter `Loading` and return what to fetch.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, DownloadError> {
        if self.state == DownloadState::Loading {
            return Err(DownloadError::FetchInFlight);
        }
        self.state = DownloadState::Loading;
        info!(
            certificate = %self.certificate,
            language = %self.language,
            "certificate download started"
        );
        Ok(FetchTicket {
            certificate: self.certificate.clone(),
            language: self.language,
        })
    }

    /// Record the outcome of the running fetch.
    ///
    /// On success the document is returned; on failure the stage moves to
    /// `Error` and `DownloadError::FetchFailed` is returned.
    pub fn complete_fetch(
        &mut self,
        outcome: Result<Vec<u8>, String>,
    ) -> Result<CertificateDocument, DownloadError> {
        if self.state != DownloadState::Loading {
            return Err(DownloadError::NoPendingFetch);
        }
        match outcome {
            Ok(bytes) => {
                self.state = DownloadState::Success { size: bytes.len() };
                self.completed_fetches += 1;
                info!(certificate = %self.certificate, size = bytes.len(), "certificate downloaded");
                Ok(CertificateDocument {
                    file_name: CERTIFICATE_FILE_NAME,
                    certificate: self.certificate.clone(),
                    language: self.language,
                    bytes,
                })
            }
            Err(reason) => {
                warn!(certificate = %self.certificate, %reason, "certificate download failed");
                self.state = DownloadState::Error(reason.clone());
                Err(DownloadError::FetchFailed(reason))
            }
        }
    }
}
