//! Loosely typed identity for a remote entity.
//!
//! A [`Binding`] carries exactly one of: a materialized object, a unique
//! id, or a display name. Callers build one with [`Binding::from_parts`]
//! (ordered preference handle → id → name) or [`Binding::parse`] (CLI text).

use std::fmt;

use anyhow::{Result, bail};
use uuid::Uuid;

/// Exactly one way of naming a remote entity of type `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<T> {
    /// An object already fetched from the remote service.
    Handle(T),
    /// A unique identifier.
    Id(Uuid),
    /// A display name.
    Name(String),
}

impl<T> Binding<T> {
    /// Pick the first present form in order handle → id → name.
    /// Returns `None` when all three are absent.
    pub fn from_parts(handle: Option<T>, id: Option<Uuid>, name: Option<String>) -> Option<Self> {
        if let Some(handle) = handle {
            return Some(Self::Handle(handle));
        }
        if let Some(id) = id {
            return Some(Self::Id(id));
        }
        name.map(Self::Name)
    }

    /// Parse free text: a GUID becomes `Id`, anything else `Name`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("identity must not be empty");
        }
        match Uuid::parse_str(input) {
            Ok(id) => Ok(Self::Id(id)),
            Err(_) => Ok(Self::Name(input.to_string())),
        }
    }
}

impl<T> std::str::FromStr for Binding<T> {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<T: fmt::Debug> fmt::Display for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(handle) => write!(f, "object {handle:?}"),
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::Name(name) => write!(f, "name '{name}'"),
        }
    }
}
