pub mod storage;

pub use storage::{AuthStorage, Credential};

use anyhow::{Context, Result, bail};

/// Store a bearer token for a tenant, optionally expiring after `expires_in` seconds.
///
/// Returns an error if the token is blank or cannot be saved.
pub fn login(db_path: &str, tenant: &str, token: &str, expires_in: Option<u64>) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        bail!("no access token provided");
    }
    let credential = match expires_in {
        Some(secs) => Credential::expiring_in(token, secs),
        None => Credential::new(token),
    };
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .set(tenant, &credential)
        .context("failed to save credentials")?;
    Ok(())
}

/// Remove stored credentials for a tenant.
pub fn logout(db_path: &str, tenant: &str) -> Result<()> {
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .remove(tenant)
        .context("failed to remove credentials")?;
    Ok(())
}
