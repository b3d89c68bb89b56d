use super::types::{DirectoryObject, Group};
use super::{RemoteClient, RemoteError, odata_literal, select_query};

/// Group directory resource (`/groups`).
pub struct Groups<'c> {
    client: &'c RemoteClient,
}

impl<'c> Groups<'c> {
    pub fn new(client: &'c RemoteClient) -> Self {
        Self { client }
    }

    /// Fetch a group by id. A 404 is `Ok(None)`.
    pub async fn get<S: AsRef<str>>(
        &self,
        id: &str,
        select: &[S],
    ) -> Result<Option<Group>, RemoteError> {
        self.client
            .get_optional(&format!("groups/{id}"), &select_query(select))
            .await
    }

    /// Groups whose display name or mail nickname equals `name`, in remote order.
    pub async fn find_by_name<S: AsRef<str>>(
        &self,
        name: &str,
        select: &[S],
    ) -> Result<Vec<Group>, RemoteError> {
        let literal = odata_literal(name);
        let mut query = vec![(
            "$filter",
            format!("displayName eq {literal} or mailNickname eq {literal}"),
        )];
        query.extend(select_query(select));
        self.client.get_all("groups", &query).await
    }

    /// Owners of the group, in remote order.
    pub async fn owners<S: AsRef<str>>(
        &self,
        id: &str,
        select: &[S],
    ) -> Result<Vec<DirectoryObject>, RemoteError> {
        self.client
            .get_all(&format!("groups/{id}/owners"), &select_query(select))
            .await
    }
}

impl RemoteClient {
    pub fn groups(&self) -> Groups<'_> {
        Groups::new(self)
    }
}
