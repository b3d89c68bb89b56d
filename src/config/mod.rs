//! Key-value configuration storage backed by SQLite, and the effective
//! [`Settings`] a command runs with.
//!
//! Shares a database with [`AuthStorage`](crate::auth::AuthStorage). Pass
//! the same path to both.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::consts::{DEFAULT_API_BASE, ENV_API_BASE, ENV_SITE};

/// Config key for the target site id.
pub const KEY_SITE: &str = "site";
/// Config key for the API base URL.
pub const KEY_API_BASE: &str = "api_base";

/// Keys accepted by `tenantctl config`.
pub const KNOWN_KEYS: &[&str] = &[KEY_SITE, KEY_API_BASE];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert). Only [`KNOWN_KEYS`] are accepted.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if !KNOWN_KEYS.contains(&key) {
            bail!("unknown config key: {key} (known: {})", KNOWN_KEYS.join(", "));
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a config key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Values given on the command line, if any.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub site: Option<String>,
    pub api_base: Option<String>,
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub site: Option<String>,
    pub api_base: String,
}

impl Settings {
    /// Resolve each value: command line → environment → stored config → default.
    pub fn resolve(overrides: &Overrides, config: &Config) -> Result<Self> {
        let site = pick(overrides.site.as_deref(), ENV_SITE, config, KEY_SITE)?;
        let api_base = pick(overrides.api_base.as_deref(), ENV_API_BASE, config, KEY_API_BASE)?
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(Self { site, api_base })
    }
}

fn pick(flag: Option<&str>, env_var: &str, config: &Config, key: &str) -> Result<Option<String>> {
    let non_empty = |v: &str| {
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_string())
    };

    if let Some(value) = flag.and_then(non_empty) {
        return Ok(Some(value));
    }
    if let Some(value) = std::env::var(env_var).ok().as_deref().and_then(non_empty) {
        return Ok(Some(value));
    }
    Ok(config.get(key)?.as_deref().and_then(non_empty))
}
