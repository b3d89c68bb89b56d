//! Term store resource (`/sites/{site}/termStores/...`).
//!
//! Name lookups list the parent collection and match client-side using the
//! platform's normalization rules, see [`normalize_name`].

use futures::future::BoxFuture;
use tracing::debug;

use super::types::{Term, TermGroup, TermSet, TermStore};
use super::{RemoteClient, RemoteError, select_query};

/// Fields a label match needs regardless of what the caller selected.
///
/// `isAvailableForTagging` is not a selectable term property on every
/// backend, so it is never forced into `$select`. Terms that do not report
/// it count as available.
const LABEL_MATCH_FIELDS: &[&str] = &["id", "labels"];

/// Normalize a taxonomy name the way the term store stores it: trim,
/// collapse whitespace runs, and swap `&` and `"` for their fullwidth forms.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('&', "\u{FF06}")
        .replace('"', "\u{FF02}")
}

/// Case-insensitive comparison of two names after normalization.
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a).to_lowercase() == normalize_name(b).to_lowercase()
}

fn term_has_label(term: &Term, label: &str) -> bool {
    term.labels.iter().any(|l| names_match(&l.name, label))
}

fn with_fields<S: AsRef<str>>(select: &[S], required: &[&str]) -> Vec<String> {
    let mut fields: Vec<String> = select.iter().map(|s| s.as_ref().to_string()).collect();
    for field in required {
        if !fields.iter().any(|f| f == field) {
            fields.push((*field).to_string());
        }
    }
    fields
}

pub struct Taxonomy<'c> {
    client: &'c RemoteClient,
    site: String,
}

impl<'c> Taxonomy<'c> {
    pub fn new(client: &'c RemoteClient, site: impl Into<String>) -> Self {
        Self {
            client,
            site: site.into(),
        }
    }

    fn store_path(&self, store: &str) -> String {
        format!("sites/{}/termStores/{store}", self.site)
    }

    /// The site's default term store.
    pub async fn default_store(&self) -> Result<TermStore, RemoteError> {
        self.client
            .get(&format!("sites/{}/termStore", self.site), &[])
            .await
    }

    pub async fn stores(&self) -> Result<Vec<TermStore>, RemoteError> {
        self.client
            .get_all(&format!("sites/{}/termStores", self.site), &[])
            .await
    }

    pub async fn store(&self, id: &str) -> Result<Option<TermStore>, RemoteError> {
        self.client.get_optional(&self.store_path(id), &[]).await
    }

    pub async fn store_by_name(&self, name: &str) -> Result<Option<TermStore>, RemoteError> {
        let stores = self.stores().await?;
        Ok(stores
            .into_iter()
            .find(|s| s.name.as_deref().is_some_and(|n| names_match(n, name))))
    }

    pub async fn groups(&self, store: &str) -> Result<Vec<TermGroup>, RemoteError> {
        self.client
            .get_all(&format!("{}/groups", self.store_path(store)), &[])
            .await
    }

    pub async fn group(&self, store: &str, id: &str) -> Result<Option<TermGroup>, RemoteError> {
        self.client
            .get_optional(&format!("{}/groups/{id}", self.store_path(store)), &[])
            .await
    }

    pub async fn group_by_name(
        &self,
        store: &str,
        name: &str,
    ) -> Result<Option<TermGroup>, RemoteError> {
        let groups = self.groups(store).await?;
        Ok(groups.into_iter().find(|g| {
            g.display_name
                .as_deref()
                .is_some_and(|n| names_match(n, name))
        }))
    }

    pub async fn sets(&self, store: &str, group: &str) -> Result<Vec<TermSet>, RemoteError> {
        self.client
            .get_all(
                &format!("{}/groups/{group}/sets", self.store_path(store)),
                &[],
            )
            .await
    }

    pub async fn set(
        &self,
        store: &str,
        group: &str,
        id: &str,
    ) -> Result<Option<TermSet>, RemoteError> {
        self.client
            .get_optional(
                &format!("{}/groups/{group}/sets/{id}", self.store_path(store)),
                &[],
            )
            .await
    }

    /// A set matches when any of its localized names does.
    pub async fn set_by_name(
        &self,
        store: &str,
        group: &str,
        name: &str,
    ) -> Result<Option<TermSet>, RemoteError> {
        let sets = self.sets(store, group).await?;
        Ok(sets
            .into_iter()
            .find(|s| s.localized_names.iter().any(|n| names_match(&n.name, name))))
    }

    /// A term anywhere in the set, by id.
    pub async fn term<S: AsRef<str>>(
        &self,
        store: &str,
        set: &str,
        id: &str,
        select: &[S],
    ) -> Result<Option<Term>, RemoteError> {
        self.client
            .get_optional(
                &format!("{}/sets/{set}/terms/{id}", self.store_path(store)),
                &select_query(select),
            )
            .await
    }

    /// Top-level terms of the set, in remote order.
    pub async fn terms<S: AsRef<str>>(
        &self,
        store: &str,
        set: &str,
        select: &[S],
    ) -> Result<Vec<Term>, RemoteError> {
        self.client
            .get_all(
                &format!("{}/sets/{set}/children", self.store_path(store)),
                &select_query(select),
            )
            .await
    }

    /// Direct children of a term, in remote order.
    pub async fn children<S: AsRef<str>>(
        &self,
        store: &str,
        set: &str,
        term: &str,
        select: &[S],
    ) -> Result<Vec<Term>, RemoteError> {
        self.client
            .get_all(
                &format!("{}/sets/{set}/terms/{term}/children", self.store_path(store)),
                &select_query(select),
            )
            .await
    }

    /// A top-level term whose label matches `name`.
    pub async fn term_by_name<S: AsRef<str>>(
        &self,
        store: &str,
        set: &str,
        name: &str,
        select: &[S],
    ) -> Result<Option<Term>, RemoteError> {
        let select = with_fields(select, LABEL_MATCH_FIELDS);
        let terms = self.terms(store, set, &select).await?;
        Ok(terms.into_iter().find(|t| term_has_label(t, name)))
    }

    /// Every term in the set's subtree carrying `label`, depth-first in
    /// remote order. With `trim_unavailable`, terms not available for
    /// tagging are left out of the result but their children are still
    /// searched.
    pub async fn find_terms_by_label<S: AsRef<str>>(
        &self,
        store: &str,
        set: &str,
        label: &str,
        trim_unavailable: bool,
        select: &[S],
    ) -> Result<Vec<Term>, RemoteError> {
        let select = with_fields(select, LABEL_MATCH_FIELDS);
        let search = LabelSearch {
            store,
            set,
            label,
            trim_unavailable,
            first_only: false,
            select: &select,
        };
        let found = self.walk(&search, None).await?;
        debug!(label, matches = found.len(), "label match finished");
        Ok(found)
    }

    /// The first term carrying `label` in the same order as
    /// [`find_terms_by_label`](Self::find_terms_by_label). The walk stops
    /// as soon as it is found.
    pub async fn first_term_by_label<S: AsRef<str>>(
        &self,
        store: &str,
        set: &str,
        label: &str,
        trim_unavailable: bool,
        select: &[S],
    ) -> Result<Option<Term>, RemoteError> {
        let select = with_fields(select, LABEL_MATCH_FIELDS);
        let search = LabelSearch {
            store,
            set,
            label,
            trim_unavailable,
            first_only: true,
            select: &select,
        };
        let found = self.walk(&search, None).await?;
        debug!(label, found = !found.is_empty(), "label match finished");
        Ok(found.into_iter().next())
    }

    fn walk<'a>(
        &'a self,
        search: &'a LabelSearch<'a>,
        parent: Option<String>,
    ) -> BoxFuture<'a, Result<Vec<Term>, RemoteError>> {
        Box::pin(async move {
            let level = match parent {
                None => self.terms(search.store, search.set, search.select).await?,
                Some(id) => {
                    self.children(search.store, search.set, &id, search.select)
                        .await?
                }
            };

            let mut found = Vec::new();
            for term in level {
                let id = term.id.clone();
                let available = term.is_available_for_tagging || !search.trim_unavailable;
                if available && term_has_label(&term, search.label) {
                    found.push(term);
                }
                if search.first_only && !found.is_empty() {
                    break;
                }
                found.extend(self.walk(search, Some(id)).await?);
                if search.first_only && !found.is_empty() {
                    break;
                }
            }
            Ok(found)
        })
    }
}

struct LabelSearch<'a> {
    store: &'a str,
    set: &'a str,
    label: &'a str,
    trim_unavailable: bool,
    first_only: bool,
    select: &'a [String],
}

impl RemoteClient {
    pub fn taxonomy(&self, site: impl Into<String>) -> Taxonomy<'_> {
        Taxonomy::new(self, site)
    }
}
