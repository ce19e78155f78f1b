//! Typed client for the user endpoint.
//!
//! `GET {base}/user/{id}` returns the user with active and dissolved
//! matches. Match start dates arrive as Unix milliseconds.

use serde::Deserialize;
use tracing::debug;

use cs_core::{Relation, RelationId, Timestamp, UserId, UserProfile};

use crate::config::ApiConfig;
use crate::error::ApiError;

// -- Wire types ---------------------------------------------------------------

/// A match as delivered by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchPayload {
    pub uuid: String,
    pub firstname: String,
    pub lastname: String,
    /// Match creation time, Unix milliseconds.
    pub date: i64,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// The user record as delivered by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub matches: Vec<MatchPayload>,
    #[serde(default)]
    pub dissolved_matches: Vec<MatchPayload>,
}

impl MatchPayload {
    fn into_relation(self, dissolved: bool) -> Result<Relation, String> {
        Ok(Relation {
            id: RelationId::new(self.uuid).map_err(|e| e.to_string())?,
            first_name: self.firstname,
            last_name: self.lastname,
            started_at: Timestamp::from_epoch_millis(self.date).map_err(|e| e.to_string())?,
            subjects: self.subjects,
            dissolved,
        })
    }
}

impl TryFrom<UserPayload> for UserProfile {
    type Error = String;

    fn try_from(payload: UserPayload) -> Result<Self, Self::Error> {
        let matches = payload
            .matches
            .into_iter()
            .map(|m| m.into_relation(false))
            .collect::<Result<Vec<_>, _>>()?;
        let dissolved_matches = payload
            .dissolved_matches
            .into_iter()
            .map(|m| m.into_relation(true))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UserProfile {
            id: UserId::new(payload.id).map_err(|e| e.to_string())?,
            first_name: payload.firstname,
            last_name: payload.lastname,
            matches,
            dissolved_matches,
        })
    }
}

// -- Client -------------------------------------------------------------------

/// Client for the user endpoint.
#[derive(Debug, Clone)]
pub struct UserClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl UserClient {
    pub(crate) fn new(http: reqwest::Client, config: ApiConfig) -> Self {
        Self { http, config }
    }

    /// Fetch a user with their matches.
    pub async fn get(&self, id: &UserId) -> Result<UserProfile, ApiError> {
        let endpoint = "GET /user/{id}";
        let url = self.config.endpoint(&format!("user/{}", id.as_str()));
        debug!(%endpoint, user = %id, "fetching user");

        let resp = self.http.get(&url).send().await.map_err(|e| ApiError::Http {
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

        let payload: UserPayload = resp.json().await.map_err(|e| ApiError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;

        UserProfile::try_from(payload).map_err(|reason| ApiError::InvalidPayload {
            endpoint: endpoint.into(),
            reason,
        })
    }
}
