//! Model data sources
//!
//! A [`ModelSource`] exposes raw, ID-indexed mesh and result data. Parsing of
//! native file formats lives outside this crate; [`MemorySource`] holds the
//! data in memory and can be loaded from JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::elements::{
    Element, ElementKind, ElementParams, Material, MaterialParams, Node, NodeParams, Property,
    PropertyParams,
};
use crate::error::KernelResult;
use crate::math::Vec3;
use crate::results::{ResultEntry, ResultSet};
use crate::sets::{ElementSet, Id, MaterialSet, NodeSet, PropertySet};

/// Read-only, ID-indexed access to a model's raw data
///
/// Every operation on an invalid source returns an empty result.
pub trait ModelSource {
    fn is_valid(&self) -> bool;

    fn all_node_ids(&self) -> Vec<Id>;
    fn all_element_ids(&self) -> Vec<Id>;
    fn all_material_ids(&self) -> Vec<Id>;
    fn all_property_ids(&self) -> Vec<Id>;

    fn build_nodes(&self, ids: &[Id]) -> KernelResult<NodeSet>;
    fn build_elements(&self, ids: &[Id]) -> KernelResult<ElementSet>;
    fn build_materials(&self, ids: &[Id]) -> KernelResult<MaterialSet>;
    fn build_properties(&self, ids: &[Id]) -> KernelResult<PropertySet>;

    /// Every result table the source holds
    fn build_all_results(&self) -> KernelResult<ResultSet>;
}

/// Element connectivity as stored by a source
///
/// Corner nodes default to the leading nodes of the connectivity and the
/// representative point to the mean of the corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: Id,
    pub type_name: String,
    pub property_id: Id,
    pub node_ids: Vec<Id>,
    #[serde(default)]
    pub corner_node_ids: Option<Vec<Id>>,
    #[serde(default)]
    pub coords: Option<Vec3>,
}

impl ElementRecord {
    pub fn new(id: Id, type_name: &str, property_id: Id, node_ids: Vec<Id>) -> Self {
        Self {
            id,
            type_name: type_name.to_string(),
            property_id,
            node_ids,
            corner_node_ids: None,
            coords: None,
        }
    }
}

/// In-memory model data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySource {
    #[serde(default)]
    pub nodes: Vec<NodeParams>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default)]
    pub materials: Vec<MaterialParams>,
    #[serde(default)]
    pub properties: Vec<PropertyParams>,
    #[serde(default)]
    pub results: Vec<ResultEntry>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON document
    pub fn from_json(json: &str) -> KernelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> KernelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_node(&mut self, id: Id, coords: Vec3) -> &mut Self {
        self.nodes.push(NodeParams::new(id, coords));
        self
    }

    pub fn add_element(&mut self, record: ElementRecord) -> &mut Self {
        self.elements.push(record);
        self
    }

    pub fn add_material(&mut self, params: MaterialParams) -> &mut Self {
        self.materials.push(params);
        self
    }

    pub fn add_property(&mut self, params: PropertyParams) -> &mut Self {
        self.properties.push(params);
        self
    }

    pub fn add_result(&mut self, entry: ResultEntry) -> &mut Self {
        self.results.push(entry);
        self
    }

    /// Element IDs referencing each node, in element order
    fn parents_by_node(&self) -> HashMap<Id, Vec<Id>> {
        let mut parents: HashMap<Id, Vec<Id>> = HashMap::new();
        for element in &self.elements {
            for &nid in &element.node_ids {
                let list = parents.entry(nid).or_default();
                if !list.contains(&element.id) {
                    list.push(element.id);
                }
            }
        }
        parents
    }

    fn element_params(&self, record: &ElementRecord, coords_by_node: &HashMap<Id, Vec3>) -> ElementParams {
        let corner_count = ElementKind::from_type_name(&record.type_name)
            .map(|k| k.corner_count())
            .unwrap_or(record.node_ids.len());
        let corner_node_ids = record.corner_node_ids.clone().unwrap_or_else(|| {
            record.node_ids.iter().take(corner_count).copied().collect()
        });

        let coords = record.coords.unwrap_or_else(|| {
            let corners: Vec<Vec3> = corner_node_ids
                .iter()
                .filter_map(|nid| coords_by_node.get(nid).copied())
                .collect();
            if corners.is_empty() {
                Vec3::zeros()
            } else {
                corners.iter().sum::<Vec3>() / corners.len() as f64
            }
        });

        ElementParams {
            id: record.id,
            dim: 2,
            type_name: record.type_name.clone(),
            property_id: record.property_id,
            node_ids: record.node_ids.clone(),
            corner_node_ids,
            coords,
        }
    }
}

impl ModelSource for MemorySource {
    /// A source needs at least one node and one element
    fn is_valid(&self) -> bool {
        !self.nodes.is_empty() && !self.elements.is_empty()
    }

    fn all_node_ids(&self) -> Vec<Id> {
        if !self.is_valid() {
            return Vec::new();
        }
        self.nodes.iter().map(|n| n.id).collect()
    }

    fn all_element_ids(&self) -> Vec<Id> {
        if !self.is_valid() {
            return Vec::new();
        }
        self.elements.iter().map(|e| e.id).collect()
    }

    fn all_material_ids(&self) -> Vec<Id> {
        if !self.is_valid() {
            return Vec::new();
        }
        self.materials.iter().map(|m| m.id).collect()
    }

    fn all_property_ids(&self) -> Vec<Id> {
        if !self.is_valid() {
            return Vec::new();
        }
        self.properties.iter().map(|p| p.id).collect()
    }

    fn build_nodes(&self, ids: &[Id]) -> KernelResult<NodeSet> {
        let mut set = NodeSet::with_capacity(ids.len());
        if !self.is_valid() {
            return Ok(set);
        }
        let by_id: HashMap<Id, &NodeParams> = self.nodes.iter().map(|n| (n.id, n)).collect();
        let parents = self.parents_by_node();

        for &id in ids {
            let Some(params) = by_id.get(&id) else {
                log::warn!("Node {id} requested but not present in source");
                continue;
            };
            let mut params = (*params).clone();
            if params.parent_element_ids.is_empty() {
                params.parent_element_ids = parents.get(&id).cloned().unwrap_or_default();
            }
            set.add(Node::new(params))?;
        }
        Ok(set)
    }

    fn build_elements(&self, ids: &[Id]) -> KernelResult<ElementSet> {
        let mut set = ElementSet::with_capacity(ids.len());
        if !self.is_valid() {
            return Ok(set);
        }
        let by_id: HashMap<Id, &ElementRecord> = self.elements.iter().map(|e| (e.id, e)).collect();
        let coords_by_node: HashMap<Id, Vec3> = self.nodes.iter().map(|n| (n.id, n.coords)).collect();

        for &id in ids {
            let Some(record) = by_id.get(&id) else {
                log::warn!("Element {id} requested but not present in source");
                continue;
            };
            set.add(Element::new(self.element_params(record, &coords_by_node))?)?;
        }
        Ok(set)
    }

    fn build_materials(&self, ids: &[Id]) -> KernelResult<MaterialSet> {
        let mut set = MaterialSet::with_capacity(ids.len());
        if !self.is_valid() {
            return Ok(set);
        }
        for &id in ids {
            match self.materials.iter().find(|m| m.id == id) {
                Some(params) => {
                    set.add(Material::new(params.clone())?)?;
                }
                None => log::warn!("Material {id} requested but not present in source"),
            }
        }
        Ok(set)
    }

    fn build_properties(&self, ids: &[Id]) -> KernelResult<PropertySet> {
        let mut set = PropertySet::with_capacity(ids.len());
        if !self.is_valid() {
            return Ok(set);
        }
        for &id in ids {
            match self.properties.iter().find(|p| p.id == id) {
                Some(params) => {
                    set.add(Property::new(params.clone())?)?;
                }
                None => log::warn!("Property {id} requested but not present in source"),
            }
        }
        Ok(set)
    }

    fn build_all_results(&self) -> KernelResult<ResultSet> {
        if !self.is_valid() {
            return Ok(ResultSet::new());
        }
        Ok(self.results.iter().cloned().collect())
    }
}
