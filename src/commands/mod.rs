//! Verb-noun commands over the remote API.
//!
//! Each command implements [`Command`]: it carries its own typed
//! parameters, borrows the [`Session`] for one invocation, and writes zero
//! or more records to an [`Output`]. Every command follows the same three
//! steps: resolve the identity binding, fetch, project.

pub mod fields;
mod group_owners;
mod term;

pub use group_owners::GetGroupOwners;
pub use term::GetTerm;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{Instrument, debug, info_span};

use crate::output::Output;
use crate::remote::RemoteError;
use crate::session::Session;

/// A level of the taxonomy chain store → group → set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    TermStore,
    TermGroup,
    TermSet,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TermStore => "term store",
            Self::TermGroup => "term group",
            Self::TermSet => "term set",
        })
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// An intermediate taxonomy node did not resolve.
    #[error("{level} with {binding} could not be resolved")]
    Unresolved { level: Level, binding: String },

    #[error("term with {binding} not found")]
    TermNotFound { binding: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("failed to project result: {0}")]
    Projection(#[from] serde_json::Error),

    /// Session problems such as a missing site.
    #[error(transparent)]
    Session(#[from] anyhow::Error),
}

/// A single verb-noun command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Verb-noun name, e.g. `"get-term"`.
    fn name(&self) -> &str;

    /// Resolve, fetch, and emit results to `out`.
    async fn execute(&self, session: &Session, out: &mut dyn Output) -> Result<(), CommandError>;
}

/// Run a command inside a tracing span named after it.
pub async fn run(
    command: &dyn Command,
    session: &Session,
    out: &mut dyn Output,
) -> Result<(), CommandError> {
    let span = info_span!("command", name = command.name());
    async {
        debug!("executing");
        let result = command.execute(session, out).await;
        if let Err(e) = &result {
            debug!(error = %e, "command failed");
        }
        result
    }
    .instrument(span)
    .await
}
