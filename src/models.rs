//! Records returned by the work item tracking API.
//!
//! Records are built fresh from every response by the mappers in
//! [`crate::api::mappers`] and never mutated by the library afterwards.
//! Optional attributes use [`Attr`] so callers can tell a key the service
//! left out from a key it sent as `null`.
//!
//! Every record serializes back to the JSON shape it was mapped from, which
//! makes mapped trees easy to persist or compare.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Presence of an optional attribute in the source JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Attr<T> {
    /// The key was not in the response.
    #[default]
    Absent,
    /// The key was present with a `null` value.
    Null,
    /// The key was present with a value.
    Present(T),
}

impl<T> Attr<T> {
    /// Returns the value if one was present.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Present)
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

/// A work item type such as `Bug` or `User Story`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkItemType {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
}

/// A team project.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub state: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub revision: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub visibility: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub description: Attr<String>,
    /// Raw capabilities object (version control, process template).
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub capabilities: Attr<Value>,
}

/// A link from a work item to another work item, a hyperlink or an attachment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkItemRelation {
    pub rel: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// A work item with its field bag and, when expanded, its relations.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkItem {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub rev: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub fields: Attr<Map<String, Value>>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub relations: Attr<Vec<WorkItemRelation>>,
}

impl WorkItem {
    /// Looks up a field by reference name, e.g. `System.Title`.
    pub fn field(&self, reference_name: &str) -> Option<&Value> {
        self.fields.value()?.get(reference_name)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("System.Title")?.as_str()
    }

    pub fn state(&self) -> Option<&str> {
        self.field("System.State")?.as_str()
    }
}

/// Start and finish dates of an iteration.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationAttributes {
    pub start_date: DateTime<Utc>,
    pub finish_date: DateTime<Utc>,
}

/// An iteration classification node. Children are only populated when the
/// service reported `hasChildren`, which depends on the requested depth.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Iteration {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub identifier: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub structure_type: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub path: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IterationAttributes>,
    pub has_children: bool,
    pub children: Vec<Iteration>,
}

/// An area classification node.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub identifier: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub structure_type: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub path: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
    pub has_children: bool,
    pub children: Vec<Area>,
}

/// A test plan. The service always returns both dates.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlan {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub description: Attr<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// An operator a field supports in queries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedOperation {
    #[serde(default)]
    pub reference_name: String,
    #[serde(default)]
    pub name: String,
}

/// A work item field definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub description: Attr<String>,
    #[serde(rename = "type", skip_serializing_if = "Attr::is_absent")]
    pub field_type: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub usage: Attr<String>,
    #[serde(rename = "referenceName")]
    pub ref_name: String,
    pub read_only: bool,
    pub can_sort_by: bool,
    pub is_identity: bool,
    pub is_picklist: bool,
    pub is_queryable: bool,
    pub is_picklist_suggested: bool,
    pub supported_operations: Vec<SupportedOperation>,
}

/// Payload for creating a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub reference_name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub usage: String,
    pub read_only: bool,
    pub can_sort_by: bool,
    pub is_queryable: bool,
    pub supported_operations: Vec<SupportedOperation>,
    pub is_identity: bool,
    pub is_picklist: bool,
    pub is_picklist_suggested: bool,
    pub url: Option<String>,
}

impl FieldDefinition {
    /// A queryable, sortable string field used on work items.
    pub fn new(name: impl Into<String>, reference_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            reference_name: reference_name.into(),
            field_type: "string".to_string(),
            usage: "workItem".to_string(),
            read_only: false,
            can_sort_by: true,
            is_queryable: true,
            supported_operations: Vec::new(),
            is_identity: false,
            is_picklist: false,
            is_picklist_suggested: false,
            url: None,
        }
    }
}

/// An uploaded attachment, ready to be linked to work items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Attachment {
    pub id: String,
    pub url: String,
}

/// A column of a query result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    #[serde(default)]
    pub reference_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkItemReference {
    pub id: i64,
    #[serde(default)]
    pub url: String,
}

/// A row of a link query. `source` is `None` for top-level rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkItemLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<WorkItemReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<WorkItemReference>,
}

/// Rows of a query result; which form applies depends on the query type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryRows {
    /// Neither row key was in the response.
    #[default]
    NotReturned,
    /// Flat query rows (`workItems`).
    WorkItems(Vec<WorkItemReference>),
    /// Tree and one-hop query rows (`workItemRelations`).
    Relations(Vec<WorkItemLink>),
}

impl QueryRows {
    /// Ids of every work item referenced by the rows, in row order.
    pub fn work_item_ids(&self) -> Vec<i64> {
        match self {
            Self::NotReturned => Vec::new(),
            Self::WorkItems(items) => items.iter().map(|item| item.id).collect(),
            Self::Relations(links) => links
                .iter()
                .filter_map(|link| link.target.as_ref().map(|target| target.id))
                .collect(),
        }
    }
}

/// Result of a WIQL query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub query_type: String,
    pub as_of: DateTime<Utc>,
    pub columns: Vec<FieldReference>,
    pub rows: QueryRows,
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("queryType", &self.query_type)?;
        map.serialize_entry("asOf", &self.as_of)?;
        map.serialize_entry("columns", &self.columns)?;
        match &self.rows {
            QueryRows::NotReturned => {}
            QueryRows::WorkItems(items) => map.serialize_entry("workItems", items)?,
            QueryRows::Relations(links) => map.serialize_entry("workItemRelations", links)?,
        }
        map.end()
    }
}

/// Reference to a user or group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub id: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub name: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub description: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub identity_url: Attr<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub identity: IdentityRef,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub is_team_admin: Attr<bool>,
}

/// A discussion comment on a work item.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub work_item_id: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub version: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub text: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub created_by: Attr<IdentityRef>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub created_date: Attr<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub modified_date: Attr<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub url: Attr<String>,
}

/// One page of comments on a work item.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentList {
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub total_count: Attr<i64>,
    #[serde(skip_serializing_if = "Attr::is_absent")]
    pub count: Attr<i64>,
    pub comments: Vec<Comment>,
}
