use std::sync::Mutex;

use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

/// A bearer token stored per tenant.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Credential {
    pub access: String,
    /// Expiration timestamp in milliseconds since epoch. `None` never expires.
    #[serde(default)]
    pub expires: Option<u64>,
}

impl Credential {
    pub fn new(access: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            expires: None,
        }
    }

    /// Token valid for `secs` seconds from now. Saturates at `u64::MAX`.
    pub fn expiring_in(access: impl Into<String>, secs: u64) -> Self {
        Self {
            access: access.into(),
            expires: Some(now_ms().saturating_add(secs.saturating_mul(1000))),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|at| now_ms() >= at)
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Manages credential storage in SQLite.
///
/// Shares a database with [`Config`](crate::config::Config). Pass the
/// same path to both.
pub struct AuthStorage {
    conn: Mutex<Connection>,
}

impl AuthStorage {
    /// Open or create a credentials table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS credentials (
                tenant TEXT PRIMARY KEY,
                data   TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get credential for a tenant.
    pub fn get(&self, tenant: &str) -> Result<Option<Credential>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT data FROM credentials WHERE tenant = ?1")?;
        let mut rows = stmt.query([tenant])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let cred: Credential = serde_json::from_str(&json)?;
                Ok(Some(cred))
            }
            None => Ok(None),
        }
    }

    /// Store credential for a tenant (upsert).
    pub fn set(&self, tenant: &str, credential: &Credential) -> Result<()> {
        let json = serde_json::to_string(credential)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO credentials (tenant, data) VALUES (?1, ?2)
             ON CONFLICT(tenant) DO UPDATE SET data = excluded.data",
            [tenant, &json],
        )?;
        Ok(())
    }

    /// Remove credential for a tenant.
    pub fn remove(&self, tenant: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM credentials WHERE tenant = ?1", [tenant])?;
        Ok(())
    }

    /// Resolve the bearer token for a tenant.
    /// Priority: stored unexpired token → environment variable.
    pub fn get_token(&self, tenant: &str, env_var: &str) -> Result<Option<String>> {
        match self.get(tenant)? {
            Some(cred) if !cred.is_expired() => return Ok(Some(cred.access)),
            Some(_) => debug!(tenant, "stored token expired"),
            None => {}
        }

        if let Ok(token) = std::env::var(env_var)
            && !token.trim().is_empty()
        {
            return Ok(Some(token.trim().to_string()));
        }

        Ok(None)
    }
}
