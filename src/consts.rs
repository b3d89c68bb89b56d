//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default remote API base when none is configured.
pub const DEFAULT_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Tenant key used for credentials when `--tenant` is not given.
pub const DEFAULT_TENANT: &str = "default";

/// Environment variable holding a bearer token.
pub const ENV_ACCESS_TOKEN: &str = "TENANTCTL_ACCESS_TOKEN";
/// Environment variable holding the target site id.
pub const ENV_SITE: &str = "TENANTCTL_SITE";
/// Environment variable overriding the API base URL.
pub const ENV_API_BASE: &str = "TENANTCTL_API_BASE";

/// Fields materialized for a term when the caller names none.
pub const DEFAULT_TERM_INCLUDES: &[&str] = &["Name", "Id"];

/// Owner fields requested when the caller names none.
pub const DEFAULT_OWNER_SELECT: &[&str] = &["id", "displayName", "userPrincipalName", "mail"];

/// Default database path: `~/.tenantctl/tenantctl.db`.
/// Single DB for credentials and config.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".tenantctl").join("tenantctl.db"))
}
