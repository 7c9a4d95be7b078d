use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Informational header extracted from the report file. None of these fields
/// participate in answering; they only render into the context block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInfo {
    pub name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub tool_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Text,
    Field,
    Image,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportObject {
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Literal text for text objects.
    #[serde(default)]
    pub text: Option<String>,
    /// Database field or formula reference backing a field object.
    #[serde(default)]
    pub data_source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section kind as reported by the conversion tool (ReportHeader,
    /// Details, PageFooter, ...). Treated as an opaque label.
    pub kind: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub objects: Vec<ReportObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub has_current_value: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(default)]
    pub field_name: String,
    /// Formula text is absent when the conversion tool denies access to the
    /// definition. That is an expected state, not an error.
    #[serde(default)]
    pub text: Option<String>,
}

/// One parsed report snapshot. Immutable once stored; re-uploads replace the
/// whole record. Duplicate names across collections are tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_id: String,
    #[serde(default)]
    pub info: ReportInfo,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub formulas: Vec<Formula>,
}

impl ReportMetadata {
    /// Named entities in their natural enumeration order: tables, then
    /// parameters, then formulas. This order is the tie-break contract for
    /// source attribution.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.tables
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.parameters.iter().map(|p| p.name.as_str()))
            .chain(self.formulas.iter().map(|f| f.name.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
            && self.tables.is_empty()
            && self.parameters.is_empty()
            && self.formulas.is_empty()
    }
}
