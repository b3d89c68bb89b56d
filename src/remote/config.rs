use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use super::error::RemoteError;
use crate::consts::DEFAULT_API_BASE;

/// Where the remote API lives and how to authenticate against it.
///
/// `Debug` output redacts the token via [`SecretString`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_base: String,
    token: Option<SecretString>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Join `path` onto the API base with exactly one slash.
    pub fn url(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Whether `link` has the same scheme, host and port as the API base.
    /// Unparsable URLs never match.
    pub fn is_same_origin(&self, link: &str) -> bool {
        match (Url::parse(&self.api_base), Url::parse(link)) {
            (Ok(base), Ok(link)) => base.origin() == link.origin(),
            _ => false,
        }
    }

    /// Bearer authorization header. Fails when no usable token is set.
    pub fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let token = self
            .token
            .as_ref()
            .map(|t| t.expose_secret().trim())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RemoteError::Config("missing access token".into()))?;

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| RemoteError::Config("invalid access token value".into()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}
