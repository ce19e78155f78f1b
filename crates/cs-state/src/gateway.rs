//! Seams to the outside world: the remote certificate API and the place
//! rendered documents are saved to.

use async_trait::async_trait;
use thiserror::Error;

use cs_core::{CertificateId, LanguageCode};

use crate::download::CertificateDocument;
use crate::request::CertificateRequest;

/// A failed remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("remote API rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The API answered, but the body could not be understood.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// The remote create/fetch pair the wizard submits to.
#[async_trait]
pub trait CertificateGateway: Send + Sync {
    /// Create a certificate and return its server-issued identifier.
    async fn create_certificate(
        &self,
        request: &CertificateRequest,
    ) -> Result<CertificateId, GatewayError>;

    /// Fetch the rendered document for `certificate` in `language`.
    async fn get_certificate(
        &self,
        certificate: &CertificateId,
        language: LanguageCode,
    ) -> Result<Vec<u8>, GatewayError>;
}

/// Failure to persist a document.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("could not write {file_name}: {source}")]
    Io {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Where delivered documents go (a file on disk, a browser save dialog).
pub trait DocumentSink {
    fn save(&mut self, document: &CertificateDocument) -> Result<(), SinkError>;
}

/// Sink that keeps every document in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub documents: Vec<CertificateDocument>,
}

impl DocumentSink for MemorySink {
    fn save(&mut self, document: &CertificateDocument) -> Result<(), SinkError> {
        self.documents.push(document.clone());
        Ok(())
    }
}
