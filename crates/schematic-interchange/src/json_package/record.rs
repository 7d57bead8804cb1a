//! Serde records mirroring the package layout.
//!
//! Kind-specific fields are optional on every record and checked when the
//! record is converted into a graph element. Fields the records do not name
//! land in `extensions` and are written back unchanged.

use serde::{Deserialize, Serialize};

use schematic_core::{Extensions, Position};

pub(crate) const PACKAGE_FORMAT: &str = "schematic-package";
pub(crate) const PACKAGE_VERSION: u64 = 1;

/// Field names of [`NodeRecord`]; extension keys with these names are not
/// written.
pub(crate) const NODE_FIELDS: &[&str] = &[
    "id",
    "kind",
    "stage",
    "trigger",
    "task",
    "gateway",
    "members",
    "attributes",
    "label",
    "position",
];

/// Field names of [`EdgeRecord`].
pub(crate) const EDGE_FIELDS: &[&str] = &[
    "id",
    "source",
    "target",
    "kind",
    "condition",
    "sourceCardinality",
    "sourceOptional",
    "targetCardinality",
    "targetOptional",
    "identifying",
    "label",
];

/// Field names of [`AttributeRecord`].
pub(crate) const ATTRIBUTE_FIELDS: &[&str] = &[
    "name",
    "dataType",
    "size",
    "primary",
    "unique",
    "nullable",
    "default",
    "foreignKey",
];

/// Field names of [`PackageRecord`].
pub(crate) const PACKAGE_FIELDS: &[&str] = &["format", "version", "name", "nodes", "edges"];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PackageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NodeRecord {
    pub id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeRecord>>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttributeRecord {
    pub name: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRecord>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

fn nullable_by_default() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ForeignKeyRecord {
    pub entity_id: String,
    pub entity_name: String,
    pub attribute_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifying: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}
