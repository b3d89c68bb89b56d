use async_trait::async_trait;
use tracing::debug;

use super::{Command, CommandError};
use crate::binding::Binding;
use crate::consts::DEFAULT_OWNER_SELECT;
use crate::output::Output;
use crate::remote::RemoteError;
use crate::remote::groups::Groups;
use crate::remote::types::Group;
use crate::session::Session;

/// Lists the owners of a group.
///
/// A group that does not resolve produces no output and no error.
#[derive(Debug, Clone)]
pub struct GetGroupOwners {
    pub identity: Binding<Group>,
    /// Owner fields to request; `None` uses the default owner fields.
    pub select: Option<Vec<String>>,
}

impl GetGroupOwners {
    pub fn new(identity: Binding<Group>) -> Self {
        Self {
            identity,
            select: None,
        }
    }

    pub fn with_select(mut self, select: Vec<String>) -> Self {
        self.select = Some(select);
        self
    }

    /// A materialized group is used as-is; an id costs one fetch; a name
    /// costs one query and the first match wins.
    async fn resolve_group_id(&self, groups: &Groups<'_>) -> Result<Option<String>, RemoteError> {
        match &self.identity {
            Binding::Handle(group) => Ok(Some(group.id.clone())),
            Binding::Id(id) => Ok(groups.get(&id.to_string(), &["id"]).await?.map(|g| g.id)),
            Binding::Name(name) => {
                let matches = groups.find_by_name(name, &["id"]).await?;
                if matches.len() > 1 {
                    debug!(name, count = matches.len(), "several groups match, using the first");
                }
                Ok(matches.into_iter().next().map(|g| g.id))
            }
        }
    }
}

#[async_trait]
impl Command for GetGroupOwners {
    fn name(&self) -> &str {
        "get-group-owners"
    }

    async fn execute(&self, session: &Session, out: &mut dyn Output) -> Result<(), CommandError> {
        let groups = session.client().groups();

        let Some(group_id) = self.resolve_group_id(&groups).await? else {
            debug!(identity = %self.identity, "group not found, nothing to emit");
            return Ok(());
        };
        debug!(%group_id, "group resolved");

        let select: Vec<String> = match &self.select {
            Some(fields) => fields.clone(),
            None => DEFAULT_OWNER_SELECT.iter().map(|f| f.to_string()).collect(),
        };
        for owner in groups.owners(&group_id, &select).await? {
            out.emit(serde_json::to_value(owner)?);
        }
        Ok(())
    }
}
