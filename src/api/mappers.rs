//! Mapping rules from decoded JSON responses to the records in [`crate::models`].
//!
//! Each record declares a static table of the JSON keys it copies and whether
//! each key is required. [`map_record`] walks that table:
//!
//! - an optional key that is absent leaves the attribute at its default,
//! - an optional key that is `null` becomes [`Attr::Null`],
//! - a required key that is absent is a [`DecodeError::MissingAttribute`].
//!
//! Nested structures (iteration dates, classification node trees, query rows)
//! are handled by each record's [`MapRecord::map_nested`] hook.

use crate::error::DecodeError;
use crate::models::{
    Area, Attachment, Attr, Comment, CommentList, Field, Iteration, IterationAttributes, Project,
    QueryResult, QueryRows, Team, TeamMember, TestPlan, WorkItem, WorkItemType,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One entry of a record's mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRule {
    pub key: &'static str,
    pub required: bool,
}

impl AttrRule {
    pub const fn optional(key: &'static str) -> Self {
        Self {
            key,
            required: false,
        }
    }

    pub const fn required(key: &'static str) -> Self {
        Self {
            key,
            required: true,
        }
    }
}

/// A record that can be built from a JSON object through a mapping table.
pub trait MapRecord: Default {
    /// Record name used in decoding errors.
    const RECORD: &'static str;

    /// Allow-listed keys in the order they are applied.
    const ATTRIBUTES: &'static [AttrRule];

    /// Writes the attribute for `key`; only called for keys that are present.
    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError>;

    /// Maps structures that are not plain attributes.
    fn map_nested(&mut self, _source: &Map<String, Value>) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Builds a new record from a decoded JSON object.
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        map_record(value)
    }
}

/// Maps a single JSON object onto a fresh record.
pub fn map_record<T: MapRecord>(value: &Value) -> Result<T, DecodeError> {
    let source = value
        .as_object()
        .ok_or(DecodeError::NotAnObject { record: T::RECORD })?;

    let mut record = T::default();
    for rule in T::ATTRIBUTES {
        match source.get(rule.key) {
            Some(value) => record.assign(rule.key, value)?,
            None if rule.required => {
                return Err(DecodeError::MissingAttribute {
                    record: T::RECORD,
                    attribute: rule.key,
                });
            }
            None => {}
        }
    }
    record.map_nested(source)?;
    Ok(record)
}

/// Maps a `{"value": [...]}` list response, preserving element order.
pub fn map_list<T: MapRecord>(value: &Value) -> Result<Vec<T>, DecodeError> {
    let items = value
        .get("value")
        .ok_or(DecodeError::MissingAttribute {
            record: T::RECORD,
            attribute: "value",
        })?
        .as_array()
        .ok_or(DecodeError::NotAnObject { record: T::RECORD })?;

    items.iter().map(map_record).collect()
}

/// Decodes an optional attribute, keeping `null` distinct.
fn optional<T: DeserializeOwned>(
    record: &'static str,
    attribute: &'static str,
    value: &Value,
) -> Result<Attr<T>, DecodeError> {
    if value.is_null() {
        return Ok(Attr::Null);
    }
    required(record, attribute, value).map(Attr::Present)
}

fn required<T: DeserializeOwned>(
    record: &'static str,
    attribute: &'static str,
    value: &Value,
) -> Result<T, DecodeError> {
    T::deserialize(value).map_err(|source| DecodeError::InvalidAttribute {
        record,
        attribute,
        source,
    })
}

fn require<'a>(
    record: &'static str,
    source: &'a Map<String, Value>,
    attribute: &'static str,
) -> Result<&'a Value, DecodeError> {
    source
        .get(attribute)
        .ok_or(DecodeError::MissingAttribute { record, attribute })
}

/// Loose truthiness for flags the service has been seen to send as non-bools.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Reads `hasChildren` and, only when it is truthy, maps `children`.
fn map_children<T: MapRecord>(
    source: &Map<String, Value>,
) -> Result<Option<(bool, Vec<T>)>, DecodeError> {
    let Some(flag) = source.get("hasChildren") else {
        return Ok(None);
    };
    if !truthy(flag) {
        return Ok(Some((false, Vec::new())));
    }

    let children = require(T::RECORD, source, "children")?
        .as_array()
        .ok_or(DecodeError::NotAnObject { record: T::RECORD })?
        .iter()
        .map(map_record)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(Some((true, children)))
}

impl MapRecord for WorkItemType {
    const RECORD: &'static str = "WorkItemType";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("name"),
        AttrRule::optional("url"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for Project {
    const RECORD: &'static str = "Project";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("name"),
        AttrRule::optional("url"),
        AttrRule::optional("state"),
        AttrRule::optional("revision"),
        AttrRule::optional("visibility"),
        AttrRule::optional("description"),
        AttrRule::optional("capabilities"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            "state" => self.state = optional(Self::RECORD, key, value)?,
            "revision" => self.revision = optional(Self::RECORD, key, value)?,
            "visibility" => self.visibility = optional(Self::RECORD, key, value)?,
            "description" => self.description = optional(Self::RECORD, key, value)?,
            "capabilities" => self.capabilities = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for WorkItem {
    const RECORD: &'static str = "WorkItem";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("rev"),
        AttrRule::optional("fields"),
        AttrRule::optional("url"),
        AttrRule::optional("relations"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "rev" => self.rev = optional(Self::RECORD, key, value)?,
            "fields" => self.fields = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            "relations" => self.relations = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for Iteration {
    const RECORD: &'static str = "Iteration";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("name"),
        AttrRule::optional("identifier"),
        AttrRule::optional("structureType"),
        AttrRule::optional("path"),
        AttrRule::optional("url"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "identifier" => self.identifier = optional(Self::RECORD, key, value)?,
            "structureType" => self.structure_type = optional(Self::RECORD, key, value)?,
            "path" => self.path = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }

    fn map_nested(&mut self, source: &Map<String, Value>) -> Result<(), DecodeError> {
        if let Some(attributes) = source.get("attributes") {
            let dates = attributes
                .as_object()
                .ok_or(DecodeError::NotAnObject {
                    record: "IterationAttributes",
                })?;
            self.attributes = Some(IterationAttributes {
                start_date: required(
                    Self::RECORD,
                    "startDate",
                    require(Self::RECORD, dates, "startDate")?,
                )?,
                finish_date: required(
                    Self::RECORD,
                    "finishDate",
                    require(Self::RECORD, dates, "finishDate")?,
                )?,
            });
        }

        if let Some((has_children, children)) = map_children(source)? {
            self.has_children = has_children;
            self.children = children;
        }
        Ok(())
    }
}

impl MapRecord for Area {
    const RECORD: &'static str = "Area";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("name"),
        AttrRule::optional("identifier"),
        AttrRule::optional("structureType"),
        AttrRule::optional("path"),
        AttrRule::optional("url"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "identifier" => self.identifier = optional(Self::RECORD, key, value)?,
            "structureType" => self.structure_type = optional(Self::RECORD, key, value)?,
            "path" => self.path = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }

    fn map_nested(&mut self, source: &Map<String, Value>) -> Result<(), DecodeError> {
        if let Some((has_children, children)) = map_children(source)? {
            self.has_children = has_children;
            self.children = children;
        }
        Ok(())
    }
}

impl MapRecord for TestPlan {
    const RECORD: &'static str = "TestPlan";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("name"),
        AttrRule::optional("description"),
        AttrRule::required("startDate"),
        AttrRule::required("endDate"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "description" => self.description = optional(Self::RECORD, key, value)?,
            "startDate" => self.start_date = required(Self::RECORD, key, value)?,
            "endDate" => self.end_date = required(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for Field {
    const RECORD: &'static str = "Field";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("name"),
        AttrRule::optional("description"),
        AttrRule::optional("type"),
        AttrRule::optional("url"),
        AttrRule::optional("usage"),
        AttrRule::required("referenceName"),
        AttrRule::required("readOnly"),
        AttrRule::required("canSortBy"),
        AttrRule::required("isIdentity"),
        AttrRule::required("isPicklist"),
        AttrRule::required("isQueryable"),
        AttrRule::required("isPicklistSuggested"),
        AttrRule::required("supportedOperations"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "description" => self.description = optional(Self::RECORD, key, value)?,
            "type" => self.field_type = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            "usage" => self.usage = optional(Self::RECORD, key, value)?,
            "referenceName" => self.ref_name = required(Self::RECORD, key, value)?,
            "readOnly" => self.read_only = required(Self::RECORD, key, value)?,
            "canSortBy" => self.can_sort_by = required(Self::RECORD, key, value)?,
            "isIdentity" => self.is_identity = required(Self::RECORD, key, value)?,
            "isPicklist" => self.is_picklist = required(Self::RECORD, key, value)?,
            "isQueryable" => self.is_queryable = required(Self::RECORD, key, value)?,
            "isPicklistSuggested" => {
                self.is_picklist_suggested = required(Self::RECORD, key, value)?;
            }
            "supportedOperations" => {
                self.supported_operations = required(Self::RECORD, key, value)?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for Attachment {
    const RECORD: &'static str = "Attachment";
    const ATTRIBUTES: &'static [AttrRule] = &[AttrRule::required("id"), AttrRule::required("url")];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = required(Self::RECORD, key, value)?,
            "url" => self.url = required(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for QueryResult {
    const RECORD: &'static str = "QueryResult";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::required("queryType"),
        AttrRule::required("asOf"),
        AttrRule::required("columns"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "queryType" => self.query_type = required(Self::RECORD, key, value)?,
            "asOf" => self.as_of = required(Self::RECORD, key, value)?,
            "columns" => self.columns = required(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }

    fn map_nested(&mut self, source: &Map<String, Value>) -> Result<(), DecodeError> {
        self.rows = match (source.get("workItems"), source.get("workItemRelations")) {
            (Some(_), Some(_)) => return Err(DecodeError::AmbiguousQueryRows),
            (Some(items), None) => {
                QueryRows::WorkItems(required(Self::RECORD, "workItems", items)?)
            }
            (None, Some(links)) => {
                QueryRows::Relations(required(Self::RECORD, "workItemRelations", links)?)
            }
            (None, None) => QueryRows::NotReturned,
        };
        Ok(())
    }
}

impl MapRecord for Team {
    const RECORD: &'static str = "Team";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("id"),
        AttrRule::optional("name"),
        AttrRule::optional("url"),
        AttrRule::optional("description"),
        AttrRule::optional("identityUrl"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = optional(Self::RECORD, key, value)?,
            "name" => self.name = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            "description" => self.description = optional(Self::RECORD, key, value)?,
            "identityUrl" => self.identity_url = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for TeamMember {
    const RECORD: &'static str = "TeamMember";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::required("identity"),
        AttrRule::optional("isTeamAdmin"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "identity" => self.identity = required(Self::RECORD, key, value)?,
            "isTeamAdmin" => self.is_team_admin = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for Comment {
    const RECORD: &'static str = "Comment";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::required("id"),
        AttrRule::optional("workItemId"),
        AttrRule::optional("version"),
        AttrRule::optional("text"),
        AttrRule::optional("createdBy"),
        AttrRule::optional("createdDate"),
        AttrRule::optional("modifiedDate"),
        AttrRule::optional("url"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "id" => self.id = required(Self::RECORD, key, value)?,
            "workItemId" => self.work_item_id = optional(Self::RECORD, key, value)?,
            "version" => self.version = optional(Self::RECORD, key, value)?,
            "text" => self.text = optional(Self::RECORD, key, value)?,
            "createdBy" => self.created_by = optional(Self::RECORD, key, value)?,
            "createdDate" => self.created_date = optional(Self::RECORD, key, value)?,
            "modifiedDate" => self.modified_date = optional(Self::RECORD, key, value)?,
            "url" => self.url = optional(Self::RECORD, key, value)?,
            _ => {}
        }
        Ok(())
    }
}

impl MapRecord for CommentList {
    const RECORD: &'static str = "CommentList";
    const ATTRIBUTES: &'static [AttrRule] = &[
        AttrRule::optional("totalCount"),
        AttrRule::optional("count"),
        AttrRule::required("comments"),
    ];

    fn assign(&mut self, key: &'static str, value: &Value) -> Result<(), DecodeError> {
        match key {
            "totalCount" => self.total_count = optional(Self::RECORD, key, value)?,
            "count" => self.count = optional(Self::RECORD, key, value)?,
            "comments" => {
                self.comments = value
                    .as_array()
                    .ok_or(DecodeError::NotAnObject {
                        record: Self::RECORD,
                    })?
                    .iter()
                    .map(map_record)
                    .collect::<Result<Vec<Comment>, _>>()?;
            }
            _ => {}
        }
        Ok(())
    }
}
