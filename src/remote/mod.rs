//! Thin REST client for the collaboration platform.
//!
//! Every call goes through [`RemoteClient::execute`], which owns the retry
//! policy. Resources ([`groups::Groups`], [`taxonomy::Taxonomy`]) borrow the
//! client and translate entity lookups into paths and query parameters.

pub mod config;
pub mod error;
pub mod groups;
pub mod retry;
pub mod taxonomy;
pub mod types;

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use config::ClientConfig;
pub use error::RemoteError;

use types::Page;

/// Query parameters attached to a request.
pub type Query<'q> = [(&'q str, String)];

#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    config: ClientConfig,
    backoff: ExponentialBuilder,
}

impl RemoteClient {
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            config,
            backoff: retry::default_backoff(),
        })
    }

    /// Replace the retry policy (tests use a near-zero delay).
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET a single JSON document relative to the API base.
    pub(crate) async fn get<O: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<O, RemoteError> {
        let url = self.config.url(path);
        let bytes = self.execute(&url, query).await?;
        decode(&bytes)
    }

    /// GET a single document, mapping 404 to `None`.
    pub(crate) async fn get_optional<O: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<Option<O>, RemoteError> {
        match self.get(path, query).await {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.is_not_found() => {
                debug!(path, "remote entity not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// GET a collection, following `@odata.nextLink` until exhausted.
    /// Links pointing away from the API base's origin are refused.
    pub(crate) async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<Vec<T>, RemoteError> {
        let mut page: Page<T> = self.get(path, query).await?;
        let mut items = std::mem::take(&mut page.value);
        while let Some(next) = page.next_link.take() {
            if !self.config.is_same_origin(&next) {
                return Err(RemoteError::Config(format!(
                    "next link {next} is outside {}",
                    self.config.api_base()
                )));
            }
            debug!(%next, "following next link");
            let bytes = self.execute(&next, &[]).await?;
            page = decode(&bytes)?;
            items.append(&mut page.value);
        }
        Ok(items)
    }

    /// Send a GET with the configured retry policy.
    async fn execute(&self, url: &str, query: &Query<'_>) -> Result<Bytes, RemoteError> {
        let headers = self.config.headers()?;

        let send = || async {
            debug!(url, ?query, "GET");
            let response = self
                .http
                .get(url)
                .headers(headers.clone())
                .query(query)
                .send()
                .await
                .map_err(RemoteError::Reqwest)?;

            let status = response.status();
            let bytes = response.bytes().await.map_err(RemoteError::Reqwest)?;
            if status.is_success() {
                return Ok(bytes);
            }
            Err(error::api_error(status, &bytes))
        };

        send.retry(self.backoff)
            .when(RemoteError::is_retryable)
            .notify(|err: &RemoteError, delay: Duration| {
                warn!(error = %err, ?delay, "retrying remote call");
            })
            .await
    }
}

fn decode<O: DeserializeOwned>(bytes: &[u8]) -> Result<O, RemoteError> {
    serde_json::from_slice(bytes).map_err(|e| error::map_deser(&e, bytes))
}

/// `$select` parameter for the given fields, or nothing when the list is empty.
pub(crate) fn select_query<S: AsRef<str>>(fields: &[S]) -> Vec<(&'static str, String)> {
    if fields.is_empty() {
        return Vec::new();
    }
    let joined = fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    vec![("$select", joined)]
}

/// Quote a string literal for an OData `$filter` expression.
pub(crate) fn odata_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
