//! Typed client for the certificate endpoints.
//!
//! - `POST {base}/certificate/create`: create a certificate, returns `{ "uuid": … }`.
//! - `GET {base}/certificate/{uuid}?lang={code}`: rendered PDF bytes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use cs_core::{CertificateId, CommunicationMedium, LanguageCode};
use cs_state::CertificateRequest;

use crate::config::ApiConfig;
use crate::error::ApiError;

// -- Wire types ---------------------------------------------------------------

/// Body of the create call, in the field layout the backend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCertificateBody {
    /// Relation (match) identifier.
    pub student: String,
    /// End of the period, Unix seconds.
    pub end_date: i64,
    pub week_count: u32,
    pub hours_per_week: f64,
    pub hours_total: f64,
    pub subjects: Vec<String>,
    pub media_type: CommunicationMedium,
    pub activities: Vec<String>,
    pub ongoing_lessons: bool,
}

impl From<&CertificateRequest> for CreateCertificateBody {
    fn from(req: &CertificateRequest) -> Self {
        Self {
            student: req.relation().as_str().to_string(),
            end_date: req.period_end().epoch_secs(),
            week_count: req.week_count(),
            hours_per_week: req.hours_per_week(),
            hours_total: req.hours_total(),
            subjects: req.subjects().to_vec(),
            media_type: req.medium(),
            activities: req.activities().to_vec(),
            ongoing_lessons: req.ongoing(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedCertificate {
    uuid: String,
}

// -- Client -------------------------------------------------------------------

/// Client for the certificate endpoints.
#[derive(Debug, Clone)]
pub struct CertificateClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl CertificateClient {
    pub(crate) fn new(http: reqwest::Client, config: ApiConfig) -> Self {
        Self { http, config }
    }

    /// Create a certificate for `request`.
    pub async fn create(&self, request: &CertificateRequest) -> Result<CertificateId, ApiError> {
        let endpoint = "POST /certificate/create";
        let url = self.config.endpoint("certificate/create");
        let body = CreateCertificateBody::from(request);
        debug!(%endpoint, student = %body.student, "creating certificate");

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let created: CreatedCertificate =
            resp.json().await.map_err(|e| ApiError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;

        CertificateId::new(created.uuid).map_err(|e| ApiError::InvalidPayload {
            endpoint: endpoint.into(),
            reason: e.to_string(),
        })
    }

    /// Fetch the rendered certificate document.
    pub async fn get(
        &self,
        certificate: &CertificateId,
        language: LanguageCode,
    ) -> Result<Vec<u8>, ApiError> {
        let endpoint = "GET /certificate/{uuid}";
        let url = self
            .config
            .endpoint(&format!("certificate/{}", certificate.as_str()));
        debug!(%endpoint, %certificate, %language, "fetching certificate document");

        let resp = self
            .http
            .get(&url)
            .query(&[("lang", language.code())])
            .send()
            .await
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| ApiError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}
