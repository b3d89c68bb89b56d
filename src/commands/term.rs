use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use super::fields::FieldSet;
use super::{Command, CommandError, Level};
use crate::binding::Binding;
use crate::output::Output;
use crate::remote::RemoteError;
use crate::remote::taxonomy::{Taxonomy, normalize_name};
use crate::remote::types::{Term, TermGroup, TermSet, TermStore};
use crate::session::Session;

/// Looks up taxonomy terms inside one term set.
///
/// Without an identity every top-level term of the set is emitted. With
/// one, exactly one term is emitted or [`CommandError::TermNotFound`] is
/// returned.
#[derive(Debug, Clone)]
pub struct GetTerm {
    /// `None` selects the site's default term store.
    pub term_store: Option<Binding<TermStore>>,
    pub term_group: Binding<TermGroup>,
    pub term_set: Binding<TermSet>,
    pub identity: Option<Binding<Term>>,
    /// Match `identity` by label anywhere below the set, not only at the top level.
    pub recursive: bool,
    /// Attach each term's descendants under `Terms`.
    pub include_child_terms: bool,
    /// Fields to materialize; `None` means `{Name, Id}`.
    pub includes: Option<Vec<String>>,
}

/// A fully resolved store → group → set chain.
struct TermChain {
    store: TermStore,
    group: TermGroup,
    set: TermSet,
}

impl GetTerm {
    pub fn new(term_group: Binding<TermGroup>, term_set: Binding<TermSet>) -> Self {
        Self {
            term_store: None,
            term_group,
            term_set,
            identity: None,
            recursive: false,
            include_child_terms: false,
            includes: None,
        }
    }

    pub fn with_store(mut self, store: Binding<TermStore>) -> Self {
        self.term_store = Some(store);
        self
    }

    pub fn with_identity(mut self, identity: Binding<Term>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include_child_terms(mut self, include: bool) -> Self {
        self.include_child_terms = include;
        self
    }

    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.includes = Some(includes);
        self
    }

    fn fields(&self) -> FieldSet {
        self.includes
            .as_deref()
            .map_or_else(FieldSet::default, FieldSet::parse)
    }

    async fn resolve_store(&self, taxonomy: &Taxonomy<'_>) -> Result<TermStore, CommandError> {
        let found = match &self.term_store {
            None => Some(taxonomy.default_store().await?),
            Some(Binding::Handle(store)) => Some(store.clone()),
            Some(Binding::Id(id)) => taxonomy.store(&id.to_string()).await?,
            Some(Binding::Name(name)) => taxonomy.store_by_name(name).await?,
        };
        found.ok_or_else(|| CommandError::Unresolved {
            level: Level::TermStore,
            binding: self
                .term_store
                .as_ref()
                .map_or_else(|| "default".to_string(), ToString::to_string),
        })
    }

    async fn resolve_group(
        &self,
        taxonomy: &Taxonomy<'_>,
        store: &TermStore,
    ) -> Result<TermGroup, CommandError> {
        let found = match &self.term_group {
            Binding::Handle(group) => Some(group.clone()),
            Binding::Id(id) => taxonomy.group(&store.id, &id.to_string()).await?,
            Binding::Name(name) => taxonomy.group_by_name(&store.id, name).await?,
        };
        found.ok_or_else(|| CommandError::Unresolved {
            level: Level::TermGroup,
            binding: self.term_group.to_string(),
        })
    }

    async fn resolve_set(
        &self,
        taxonomy: &Taxonomy<'_>,
        store: &TermStore,
        group: &TermGroup,
    ) -> Result<TermSet, CommandError> {
        let found = match &self.term_set {
            Binding::Handle(set) => Some(set.clone()),
            Binding::Id(id) => taxonomy.set(&store.id, &group.id, &id.to_string()).await?,
            Binding::Name(name) => taxonomy.set_by_name(&store.id, &group.id, name).await?,
        };
        found.ok_or_else(|| CommandError::Unresolved {
            level: Level::TermSet,
            binding: self.term_set.to_string(),
        })
    }

    /// Each level must resolve before the next lookup is issued.
    async fn resolve_chain(&self, taxonomy: &Taxonomy<'_>) -> Result<TermChain, CommandError> {
        let store = self.resolve_store(taxonomy).await?;
        debug!(store = %store.id, "term store resolved");
        let group = self.resolve_group(taxonomy, &store).await?;
        debug!(group = %group.id, "term group resolved");
        let set = self.resolve_set(taxonomy, &store, &group).await?;
        debug!(set = %set.id, "term set resolved");
        Ok(TermChain { store, group, set })
    }

    async fn find_term(
        &self,
        taxonomy: &Taxonomy<'_>,
        chain: &TermChain,
        identity: &Binding<Term>,
        select: &[String],
    ) -> Result<Option<Term>, RemoteError> {
        let (store, set) = (chain.store.id.as_str(), chain.set.id.as_str());
        match identity {
            Binding::Handle(term) => taxonomy.term(store, set, &term.id, select).await,
            Binding::Id(id) => taxonomy.term(store, set, &id.to_string(), select).await,
            Binding::Name(name) if self.recursive => {
                debug!(label = %normalize_name(name), "searching the set for the first match");
                taxonomy
                    .first_term_by_label(store, set, name, true, select)
                    .await
            }
            Binding::Name(name) => taxonomy.term_by_name(store, set, name, select).await,
        }
    }

    async fn project(
        &self,
        taxonomy: &Taxonomy<'_>,
        chain: &TermChain,
        term: &Term,
        fields: &FieldSet,
        select: &[String],
    ) -> Result<Value, RemoteError> {
        let mut record = fields.project(term);
        if self.include_child_terms {
            let walk = ChildWalk {
                store: &chain.store.id,
                set: &chain.set.id,
                fields,
                select,
            };
            let children = load_children(taxonomy, &walk, term.id.clone()).await?;
            if let Value::Object(map) = &mut record {
                map.insert("Terms".to_string(), Value::Array(children));
            }
        }
        Ok(record)
    }
}

struct ChildWalk<'a> {
    store: &'a str,
    set: &'a str,
    fields: &'a FieldSet,
    select: &'a [String],
}

/// Projected descendants of `parent`, each carrying its own `Terms`.
fn load_children<'a, 'c: 'a>(
    taxonomy: &'a Taxonomy<'c>,
    walk: &'a ChildWalk<'a>,
    parent: String,
) -> BoxFuture<'a, Result<Vec<Value>, RemoteError>> {
    Box::pin(async move {
        let children = taxonomy
            .children(walk.store, walk.set, &parent, walk.select)
            .await?;
        let mut records = Vec::with_capacity(children.len());
        for child in children {
            let mut record = walk.fields.project(&child);
            let grandchildren = load_children(taxonomy, walk, child.id).await?;
            if let Value::Object(map) = &mut record {
                map.insert("Terms".to_string(), Value::Array(grandchildren));
            }
            records.push(record);
        }
        Ok(records)
    })
}

#[async_trait]
impl Command for GetTerm {
    fn name(&self) -> &str {
        "get-term"
    }

    async fn execute(&self, session: &Session, out: &mut dyn Output) -> Result<(), CommandError> {
        let taxonomy = session.client().taxonomy(session.site()?);
        let fields = self.fields();
        let select = fields.remote_select();

        let chain = self.resolve_chain(&taxonomy).await?;
        debug!(group = ?chain.group.display_name, "term chain resolved");

        let Some(identity) = &self.identity else {
            let terms = taxonomy
                .terms(&chain.store.id, &chain.set.id, &select)
                .await?;
            debug!(count = terms.len(), "listing every term in the set");
            for term in &terms {
                out.emit(self.project(&taxonomy, &chain, term, &fields, &select).await?);
            }
            return Ok(());
        };

        let term = self
            .find_term(&taxonomy, &chain, identity, &select)
            .await?
            .ok_or_else(|| CommandError::TermNotFound {
                binding: identity.to_string(),
            })?;
        out.emit(self.project(&taxonomy, &chain, &term, &fields, &select).await?);
        Ok(())
    }
}
