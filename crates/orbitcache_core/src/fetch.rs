//! Catalog fetch collaborator.
//!
//! # Responsibility
//! - Retrieve raw 3LE text for one catalog group.
//!
//! # Invariants
//! - Non-success HTTP statuses are errors; the body is never handed to the
//!   parser in that case.
//! - Fetching has no side effects on the element store.

use crate::config::AppConfig;
use log::{error, info};
use reqwest::blocking::Client;
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const CATALOG_FORMAT: &str = "3LE";

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl { url: String, reason: String },
    Client(reqwest::Error),
    Transport(reqwest::Error),
    Status { url: String, status: u16 },
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { url, reason } => write!(f, "invalid catalog url `{url}`: {reason}"),
            Self::Client(err) => write!(f, "failed to build http client: {err}"),
            Self::Transport(err) => write!(f, "catalog request failed: {err}"),
            Self::Status { url, status } => {
                write!(f, "catalog `{url}` answered with http status {status}")
            }
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Client(err) | Self::Transport(err) => Some(err),
            Self::InvalidUrl { .. } | Self::Status { .. } => None,
        }
    }
}

/// Source of raw element text.
pub trait CatalogFetcher {
    /// Returns the 3LE text of `group`.
    fn fetch_catalog(&self, group: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher for CelesTrak-style `gp.php` endpoints.
pub struct HttpCatalogFetcher {
    client: Client,
    catalog_url: String,
}

impl HttpCatalogFetcher {
    /// Builds a fetcher whose requests time out after `config.fetch_timeout`.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            catalog_url: config.catalog_url.clone(),
        })
    }

    /// Request URL for `group`.
    pub fn group_url(&self, group: &str) -> Result<Url, FetchError> {
        Url::parse_with_params(
            &self.catalog_url,
            &[("GROUP", group), ("FORMAT", CATALOG_FORMAT)],
        )
        .map_err(|err| FetchError::InvalidUrl {
            url: self.catalog_url.clone(),
            reason: err.to_string(),
        })
    }
}

impl CatalogFetcher for HttpCatalogFetcher {
    fn fetch_catalog(&self, group: &str) -> Result<String, FetchError> {
        let started_at = Instant::now();
        let url = self.group_url(group)?;
        info!("event=catalog_fetch module=fetch status=start group={group}");

        let result = self
            .client
            .get(url.clone())
            .send()
            .map_err(FetchError::Transport)
            .and_then(|response| {
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                response.text().map_err(FetchError::Transport)
            });

        match &result {
            Ok(body) => info!(
                "event=catalog_fetch module=fetch status=ok group={} bytes={} duration_ms={}",
                group,
                body.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=catalog_fetch module=fetch status=error group={} duration_ms={} error={}",
                group,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
