//! Caller-chosen term fields: what to `$select` remotely and how to project
//! the result back out.

use serde_json::{Map, Value};

use crate::consts::DEFAULT_TERM_INCLUDES;
use crate::remote::types::Term;

/// One projectable term field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermField {
    Id,
    Name,
    Labels,
    Description,
    CreatedDate,
    LastModifiedDate,
    IsAvailableForTagging,
    IsDeprecated,
    CustomProperties,
    /// Any other remote field, projected verbatim under the caller's name.
    Other(String),
}

impl TermField {
    /// Parse a field name case-insensitively. Unknown names become `Other`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "id" => Self::Id,
            "name" => Self::Name,
            "labels" => Self::Labels,
            "description" | "descriptions" => Self::Description,
            "createddate" | "createddatetime" => Self::CreatedDate,
            "lastmodifieddate" | "lastmodifieddatetime" => Self::LastModifiedDate,
            "isavailablefortagging" => Self::IsAvailableForTagging,
            "isdeprecated" => Self::IsDeprecated,
            "customproperties" | "properties" => Self::CustomProperties,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    /// Key in the projected record.
    pub fn label(&self) -> &str {
        match self {
            Self::Id => "Id",
            Self::Name => "Name",
            Self::Labels => "Labels",
            Self::Description => "Description",
            Self::CreatedDate => "CreatedDate",
            Self::LastModifiedDate => "LastModifiedDate",
            Self::IsAvailableForTagging => "IsAvailableForTagging",
            Self::IsDeprecated => "IsDeprecated",
            Self::CustomProperties => "CustomProperties",
            Self::Other(name) => name,
        }
    }

    /// Field name the remote API knows it by.
    pub fn remote_name(&self) -> String {
        match self {
            Self::Id => "id".into(),
            Self::Name | Self::Labels => "labels".into(),
            Self::Description => "descriptions".into(),
            Self::CreatedDate => "createdDateTime".into(),
            Self::LastModifiedDate => "lastModifiedDateTime".into(),
            Self::IsAvailableForTagging => "isAvailableForTagging".into(),
            Self::IsDeprecated => "isDeprecated".into(),
            Self::CustomProperties => "properties".into(),
            Self::Other(name) => lower_camel(name),
        }
    }

    fn value(&self, term: &Term) -> Value {
        match self {
            Self::Id => Value::String(term.id.clone()),
            Self::Name => term
                .name()
                .map_or(Value::Null, |n| Value::String(n.to_string())),
            Self::Labels => serde_json::to_value(&term.labels).unwrap_or(Value::Null),
            Self::Description => default_description(term),
            Self::IsAvailableForTagging => Value::Bool(term.is_available_for_tagging),
            Self::IsDeprecated => Value::Bool(term.is_deprecated),
            _ => term
                .field(&self.remote_name())
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `descriptions: [{"description": "...", "languageTag": "..."}]` → first description text.
fn default_description(term: &Term) -> Value {
    term.field("descriptions")
        .and_then(Value::as_array)
        .and_then(|all| all.first())
        .and_then(|d| d.get("description"))
        .cloned()
        .unwrap_or(Value::Null)
}

/// An ordered, duplicate-free list of fields to materialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<TermField>,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::parse(DEFAULT_TERM_INCLUDES)
    }
}

impl FieldSet {
    /// Parse field names, dropping blanks and repeats. An empty result
    /// falls back to the default `{Name, Id}`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Self {
        let mut fields = Vec::new();
        for name in names.iter().map(AsRef::as_ref) {
            if name.trim().is_empty() {
                continue;
            }
            let field = TermField::parse(name);
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        if fields.is_empty() {
            return Self::default();
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[TermField] {
        &self.fields
    }

    /// `$select` list. Always carries `id` so children can be walked.
    pub fn remote_select(&self) -> Vec<String> {
        let mut select = vec!["id".to_string()];
        for field in &self.fields {
            let name = field.remote_name();
            if !select.contains(&name) {
                select.push(name);
            }
        }
        select
    }

    /// Project a term onto exactly these fields.
    pub fn project(&self, term: &Term) -> Value {
        let record: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.label().to_string(), f.value(term)))
            .collect();
        Value::Object(record)
    }
}
