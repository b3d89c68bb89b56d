//! The authenticated connection commands borrow for one invocation.

use anyhow::{Context, Result};

use crate::auth::AuthStorage;
use crate::config::{KEY_SITE, Settings};
use crate::consts::{ENV_ACCESS_TOKEN, ENV_SITE};
use crate::remote::{ClientConfig, RemoteClient};

/// A remote client plus the site taxonomy commands run against.
#[derive(Debug, Clone)]
pub struct Session {
    client: RemoteClient,
    site: Option<String>,
}

impl Session {
    pub fn new(client: RemoteClient, site: Option<String>) -> Self {
        Self { client, site }
    }

    /// Build a session from resolved settings and stored credentials.
    pub fn connect(settings: &Settings, auth: &AuthStorage, tenant: &str) -> Result<Self> {
        let token = auth.get_token(tenant, ENV_ACCESS_TOKEN)?.with_context(|| {
            format!(
                "no access token for tenant '{tenant}'. Run `tenantctl login` or set {ENV_ACCESS_TOKEN}."
            )
        })?;
        let config = ClientConfig::new()
            .with_api_base(&settings.api_base)
            .with_token(token);
        let client = RemoteClient::new(config).context("failed to build HTTP client")?;
        Ok(Self::new(client, settings.site.clone()))
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    /// The target site. Only taxonomy commands need one.
    pub fn site(&self) -> Result<&str> {
        self.site.as_deref().with_context(|| {
            format!("no site configured. Pass --site, set {ENV_SITE}, or run `tenantctl config set {KEY_SITE} <id>`.")
        })
    }
}
