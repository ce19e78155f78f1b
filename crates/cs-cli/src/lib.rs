//! # cs-cli: Corona School certificate command line
//!
//! ## Subcommands
//!
//! - `certificate`: compose, submit and download a certificate
//! - `relations`: list the matches a certificate can be issued for
//! - `participants`: sort a course participant list
//!
//! Argument parsing lives here; the wizard, session and sorting rules come
//! from `cs-state` and `cs-core`, the remote calls from `cs-api-client`.

pub mod certificate;
pub mod participants;
pub mod relations;
pub mod sink;

use anyhow::{Context, Result};

use cs_api_client::{ApiClient, ApiConfig};

/// Build the API client from the environment, optionally overriding the
/// base URL.
pub fn api_client(api_url: Option<&str>) -> Result<ApiClient> {
    let mut config = ApiConfig::from_env().context("incomplete API configuration")?;
    if let Some(raw) = api_url {
        let url = url::Url::parse(raw).with_context(|| format!("invalid --api-url {raw}"))?;
        config = config.with_base_url(url);
    }
    tracing::debug!(?config, "API client configured");
    Ok(ApiClient::new(config)?)
}
