//! # cs-api-client: Typed Rust client for the Corona School backend
//!
//! Provides typed access to the endpoints the certificate workflow uses:
//! - **Certificates**: create a certificate and fetch its rendered PDF.
//! - **Users**: the authenticated user with active and dissolved matches.
//!
//! `ApiClient` implements [`cs_state::CertificateGateway`], so a
//! [`cs_state::CertificateSession`] can submit through it directly.
//!
//! Calls are never retried; a failure is reported to the caller, who
//! decides whether to try again.

pub mod certificate;
pub mod config;
pub mod error;
pub mod user;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;

use std::time::Duration;

use async_trait::async_trait;

use cs_core::{CertificateId, LanguageCode, UserId, UserProfile};
use cs_state::{CertificateGateway, CertificateRequest, GatewayError};

/// Top-level backend client. Holds sub-clients per resource.
#[derive(Debug, Clone)]
pub struct ApiClient {
    user_id: UserId,
    certificates: certificate::CertificateClient,
    users: user::UserClient,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::HeaderName::from_static("token"),
                    reqwest::header::HeaderValue::from_str(&config.api_token)
                        .map_err(|_| ApiError::Config(config::ConfigError::MissingToken))?,
                );
                headers
            })
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            user_id: config.user_id.clone(),
            certificates: certificate::CertificateClient::new(http.clone(), config.clone()),
            users: user::UserClient::new(http, config),
        })
    }

    /// Access the certificate endpoints.
    pub fn certificates(&self) -> &certificate::CertificateClient {
        &self.certificates
    }

    /// Access the user endpoint.
    pub fn users(&self) -> &user::UserClient {
        &self.users
    }

    /// The configured user with their matches.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.users.get(&self.user_id).await
    }
}

#[async_trait]
impl CertificateGateway for ApiClient {
    async fn create_certificate(
        &self,
        request: &CertificateRequest,
    ) -> Result<CertificateId, GatewayError> {
        self.certificates.create(request).await.map_err(GatewayError::from)
    }

    async fn get_certificate(
        &self,
        certificate: &CertificateId,
        language: LanguageCode,
    ) -> Result<Vec<u8>, GatewayError> {
        self.certificates
            .get(certificate, language)
            .await
            .map_err(GatewayError::from)
    }
}
