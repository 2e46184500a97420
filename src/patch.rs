//! JSON-Patch documents for work item create and update requests.
//!
//! A [`PatchDocument`] is an ordered list of [`PatchOperation`]s sent to the
//! service as a single `application/json-patch+json` body. The service applies
//! the operations in order, so a later operation on the same path wins.
//!
//! ## Example
//!
//! ```rust
//! use vsts_client::constants::system_fields;
//! use vsts_client::patch::{PatchDocument, PatchOperation};
//!
//! let mut doc = PatchDocument::new();
//! doc.add(PatchOperation::add(system_fields::TITLE, "Epic B")?)
//!     .add(PatchOperation::add(system_fields::TAGS, "migrated")?);
//!
//! assert_eq!(doc.len(), 2);
//! # Ok::<(), vsts_client::error::VstsError>(())
//! ```

use crate::error::{Result, VstsError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON-Patch operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
    Test,
    Move,
    Copy,
}

/// A single mutation: operation kind, target path and new value.
///
/// `value` is `None` only for [`PatchOp::Remove`]. An explicit JSON `null` is
/// a value like any other and is kept as `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPatchOperation")]
pub struct PatchOperation {
    op: PatchOp,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
}

/// Wire shape of an operation before its invariants are checked.
#[derive(Deserialize)]
struct RawPatchOperation {
    op: PatchOp,
    path: String,
    #[serde(default, deserialize_with = "deserialize_present")]
    value: Option<Value>,
    #[serde(default)]
    from: Option<String>,
}

impl TryFrom<RawPatchOperation> for PatchOperation {
    type Error = VstsError;

    fn try_from(raw: RawPatchOperation) -> Result<Self> {
        let operation = Self::new(raw.op, raw.path, raw.value)?;
        Ok(match raw.from {
            Some(from) => operation.with_from(from),
            None => operation,
        })
    }
}

/// Maps a present key to `Some`, including a literal `null`.
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    /// Creates an operation, enforcing that `path` is non-empty and that a
    /// value is supplied for every kind except `remove`.
    ///
    /// # Errors
    ///
    /// Returns [`VstsError::Validation`] when an invariant is violated.
    pub fn new(op: PatchOp, path: impl Into<String>, value: Option<Value>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(VstsError::validation("path"));
        }
        if value.is_none() && op != PatchOp::Remove {
            return Err(VstsError::validation("value"));
        }
        Ok(Self {
            op,
            path,
            value,
            from: None,
        })
    }

    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(PatchOp::Add, path, Some(value.into()))
    }

    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(PatchOp::Replace, path, Some(value.into()))
    }

    pub fn remove(path: impl Into<String>) -> Result<Self> {
        Self::new(PatchOp::Remove, path, None)
    }

    /// Creates a `test` operation, which makes the whole document fail unless
    /// the current value at `path` equals `value`. Useful for revision checks.
    pub fn test(path: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(PatchOp::Test, path, Some(value.into()))
    }

    /// Sets the source pointer used by `move` and `copy`.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn op(&self) -> PatchOp {
        self.op
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn from_path(&self) -> Option<&str> {
        self.from.as_deref()
    }
}

/// Ordered sequence of patch operations submitted as one request body.
///
/// Operations are never de-duplicated or reordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<PatchOperation>,
}

impl PatchDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation to the end of the document.
    pub fn add(&mut self, operation: PatchOperation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    /// Serializes the document into its wire payload.
    ///
    /// # Errors
    ///
    /// Fails only if a value cannot be represented as JSON.
    pub fn to_body(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VstsError::Decode(e.into()))
    }
}

impl FromIterator<PatchOperation> for PatchDocument {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PatchDocument {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatchDocument {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
