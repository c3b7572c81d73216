//! Field results supplied by an upstream analysis

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::StressTensor;
use crate::sets::Id;

/// Composite result identifier `load case -> sub case -> result type`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(String);

impl ResultId {
    pub const SEPARATOR: &'static str = "->";

    pub fn from_names(load_case: &str, sub_case: &str, result: &str) -> Self {
        Self(format!(
            "{load_case}{sep}{sub_case}{sep}{result}",
            sep = Self::SEPARATOR
        ))
    }

    /// Wrap an already concatenated identifier
    pub fn parse(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Components split on the separator
    pub fn parts(&self) -> Vec<&str> {
        self.0.split(Self::SEPARATOR).collect()
    }

    pub fn load_case(&self) -> Option<&str> {
        self.0.split(Self::SEPARATOR).next()
    }

    pub fn sub_case(&self) -> Option<&str> {
        self.0.split(Self::SEPARATOR).nth(1)
    }

    pub fn result_name(&self) -> Option<&str> {
        self.0.split(Self::SEPARATOR).nth(2)
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResultId {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}

/// One row of a result table
///
/// Element-level rows have no node ID; corner rows carry both IDs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub element_id: Option<Id>,
    #[serde(default)]
    pub node_id: Option<Id>,
    /// `[XX, YY, ZZ, XY, YZ, ZX]`
    pub components: [f64; 6],
}

impl ResultRow {
    pub fn element(element_id: Id, components: [f64; 6]) -> Self {
        Self {
            element_id: Some(element_id),
            node_id: None,
            components,
        }
    }

    pub fn corner(element_id: Id, node_id: Id, components: [f64; 6]) -> Self {
        Self {
            element_id: Some(element_id),
            node_id: Some(node_id),
            components,
        }
    }

    pub fn node(node_id: Id, components: [f64; 6]) -> Self {
        Self {
            element_id: None,
            node_id: Some(node_id),
            components,
        }
    }

    pub fn tensor(&self) -> StressTensor {
        StressTensor::from_components(&self.components)
    }
}

/// Tabular result payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row for the node, whatever the element column holds
    pub fn node_row(&self, node_id: Id) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.node_id == Some(node_id))
    }

    /// Element-level (centre) row of the element
    pub fn element_row(&self, element_id: Id) -> Option<&ResultRow> {
        self.rows
            .iter()
            .find(|r| r.element_id == Some(element_id) && r.node_id.is_none())
    }

    /// Corner row of the element at the node, falling back to any row of the node
    pub fn corner_row(&self, element_id: Id, node_id: Id) -> Option<&ResultRow> {
        self.rows
            .iter()
            .find(|r| r.element_id == Some(element_id) && r.node_id == Some(node_id))
            .or_else(|| self.node_row(node_id))
    }
}

/// A named result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: ResultId,
    pub table: ResultTable,
}

impl ResultEntry {
    pub fn new(id: ResultId, table: ResultTable) -> Self {
        Self { id, table }
    }
}

/// Append-only collection of result entries, keyed by ordinal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its ordinal
    pub fn add(&mut self, entry: ResultEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, ordinal: usize) -> Option<&ResultEntry> {
        self.entries.get(ordinal)
    }

    /// First entry with the given identifier
    pub fn get_by_result_id(&self, id: &ResultId) -> Option<&ResultEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResultId> + '_ {
        self.entries.iter().map(|e| &e.id)
    }
}

impl FromIterator<ResultEntry> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
