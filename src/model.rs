//! FE Model - linked entity graph and field queries

use serde::{Deserialize, Serialize};

use crate::elements::{Element, LinkContext, Linkable, Material, Node, Property};
use crate::error::{KernelError, KernelResult};
use crate::geometry::{default_kernel, SharedKernel};
use crate::math::{StressTensor, Vec3, LINEAR_TOLERANCE};
use crate::results::{ResultId, ResultSet, ResultTable};
use crate::sets::{ElementSet, Id, MaterialSet, NodeSet, PropertySet};
use crate::source::ModelSource;

/// Options controlling model construction and queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Allowed round-trip error of a natural coordinate solve
    pub natural_tolerance: f64,
    /// Geometric tolerance for frame construction
    pub linear_tolerance: f64,
    /// Solve natural coordinates in the element's local frame
    pub interpolate_in_local_frame: bool,
    /// Reject interpolated tensors containing NaN
    pub check_nan: bool,
    /// Iteration cap for iterative natural coordinate inversion
    pub max_iterations: usize,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            natural_tolerance: 1e-4,
            linear_tolerance: LINEAR_TOLERANCE,
            interpolate_in_local_frame: true,
            check_nan: true,
            max_iterations: 50,
        }
    }
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that solve natural coordinates in the global frame
    pub fn global_frame() -> Self {
        Self {
            interpolate_in_local_frame: false,
            ..Self::default()
        }
    }

    pub fn with_natural_tolerance(mut self, tolerance: f64) -> Self {
        self.natural_tolerance = tolerance;
        self
    }

    pub fn with_linear_tolerance(mut self, tolerance: f64) -> Self {
        self.linear_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Accept NaN components in interpolated tensors
    pub fn without_nan_check(mut self) -> Self {
        self.check_nan = false;
        self
    }

    /// Parse options from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> KernelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Stress recovered at an arbitrary point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStress {
    /// Element containing the point
    pub element_id: Id,
    /// Natural coordinates of the point within that element
    pub natural: Vec3,
    pub tensor: StressTensor,
}

/// A linked finite element model
///
/// Construction links every element to its nodes and every node to its
/// parent elements. Once built the model is read-only and can be shared
/// between threads.
#[derive(Debug)]
pub struct Model {
    materials: MaterialSet,
    properties: PropertySet,
    nodes: NodeSet,
    elements: ElementSet,
    results: ResultSet,
    kernel: SharedKernel,
    options: ModelOptions,
}

impl Model {
    // ========================
    // Construction
    // ========================

    /// Build a model from pre-built sets with the native geometry kernel
    pub fn create_by_sets(
        materials: MaterialSet,
        properties: PropertySet,
        nodes: NodeSet,
        elements: ElementSet,
        results: ResultSet,
    ) -> KernelResult<Self> {
        Self::create_by_sets_with(
            materials,
            properties,
            nodes,
            elements,
            results,
            default_kernel(),
            ModelOptions::default(),
        )
    }

    /// Build a model from pre-built sets
    ///
    /// Fails with [`KernelError::LinkFailed`] if any entity could not be
    /// linked; every entity is attempted before the failure is reported.
    pub fn create_by_sets_with(
        materials: MaterialSet,
        properties: PropertySet,
        nodes: NodeSet,
        elements: ElementSet,
        results: ResultSet,
        kernel: SharedKernel,
        options: ModelOptions,
    ) -> KernelResult<Self> {
        let mut model = Self {
            materials,
            properties,
            nodes,
            elements,
            results,
            kernel,
            options,
        };
        model.link()?;

        log::info!(
            "Model built: {} nodes, {} elements, {} materials, {} properties, {} results",
            model.nodes.len(),
            model.elements.len(),
            model.materials.len(),
            model.properties.len(),
            model.results.len()
        );
        Ok(model)
    }

    /// Build a model from everything a data source holds
    pub fn create_by_source(
        source: &dyn ModelSource,
        kernel: SharedKernel,
        options: ModelOptions,
    ) -> KernelResult<Self> {
        if !source.is_valid() {
            return Err(KernelError::SourceUnavailable(
                "source reports itself invalid".to_string(),
            ));
        }

        let materials = source.build_materials(&source.all_material_ids())?;
        let properties = source.build_properties(&source.all_property_ids())?;
        let nodes = source.build_nodes(&source.all_node_ids())?;
        let elements = source.build_elements(&source.all_element_ids())?;
        let results = source.build_all_results()?;

        Self::create_by_sets_with(materials, properties, nodes, elements, results, kernel, options)
    }

    /// Link elements against nodes, then nodes against elements
    fn link(&mut self) -> KernelResult<()> {
        let ctx = LinkContext {
            kernel: &self.kernel,
            options: &self.options,
        };
        let total = self.elements.len() + self.nodes.len();
        let mut failures = Vec::new();

        for element in self.elements.iter_mut() {
            if let Err(e) = element.link(&self.nodes, &ctx) {
                log::warn!("Element {} failed to link: {}", element.id(), e);
                failures.push(e);
            }
        }
        for node in self.nodes.iter_mut() {
            if let Err(e) = node.link(&self.elements, &ctx) {
                log::warn!("Node {} failed to link: {}", node.id(), e);
                failures.push(e);
            }
        }

        let failed = failures.len();
        match failures.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(KernelError::LinkFailed {
                failed,
                total,
                first: Box::new(first),
            }),
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn materials(&self) -> &MaterialSet {
        &self.materials
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn elements(&self) -> &ElementSet {
        &self.elements
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn kernel(&self) -> &SharedKernel {
        &self.kernel
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: Id) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn material(&self, id: Id) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn property(&self, id: Id) -> Option<&Property> {
        self.properties.get(id)
    }

    /// Property assigned to an element
    pub fn element_property(&self, element_id: Id) -> Option<&Property> {
        self.element(element_id)
            .and_then(|e| self.properties.get(e.property_id()))
    }

    /// Material referenced by an element's property
    pub fn element_material(&self, element_id: Id) -> Option<&Material> {
        self.element_property(element_id)
            .and_then(Property::material_id)
            .and_then(|mid| self.materials.get(mid))
    }

    // ========================
    // Point location
    // ========================

    /// ID of an element containing `point`
    ///
    /// Nodes are visited nearest first and each node's parent elements are
    /// tested for containment; the first hit wins. A point contained only by
    /// an element none of whose nodes are visited before a neighbour claims
    /// it is reported against that neighbour.
    pub fn element_id_from_point(&self, point: &Vec3) -> KernelResult<Option<Id>> {
        let mut by_distance: Vec<(f64, &Node)> = self
            .nodes
            .iter()
            .map(|node| (node.distance_to(point), node))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, node) in by_distance {
            for &index in node.parent_indices()? {
                let Some(element) = self.elements.get_by_index(index) else {
                    continue;
                };
                if element.is_point_belong(point)? {
                    log::debug!(
                        "Point {:?} located in element {} via node {}",
                        point.as_slice(),
                        element.id(),
                        node.id()
                    );
                    return Ok(Some(element.id()));
                }
            }
        }
        Ok(None)
    }

    // ========================
    // Field queries
    // ========================

    fn result_table(&self, result: &ResultId) -> Option<&ResultTable> {
        self.results.get_by_result_id(result).map(|entry| &entry.table)
    }

    /// Stress at a node; the first row carrying the node ID wins
    pub fn stress_in_node(&self, result: &ResultId, node_id: Id) -> Option<StressTensor> {
        self.result_table(result)?
            .node_row(node_id)
            .map(|row| row.tensor())
    }

    /// Element-level (centre) stress of an element
    pub fn stress_in_element(&self, result: &ResultId, element_id: Id) -> Option<StressTensor> {
        self.result_table(result)?
            .element_row(element_id)
            .map(|row| row.tensor())
    }

    /// Stresses at the element's corner nodes, in corner order
    ///
    /// `None` if the element is unknown or any corner has no row.
    pub fn nodal_stresses_of_element(
        &self,
        result: &ResultId,
        element_id: Id,
    ) -> Option<Vec<StressTensor>> {
        let table = self.result_table(result)?;
        let element = self.elements.get(element_id)?;
        element
            .corner_node_ids()
            .iter()
            .map(|&nid| table.corner_row(element_id, nid).map(|row| row.tensor()))
            .collect()
    }

    /// Stress at `point` interpolated from the element's corner stresses
    ///
    /// `None` if the element is unknown, the point lies outside it or the
    /// corner stresses are incomplete.
    pub fn stress_in_element_at(
        &self,
        result: &ResultId,
        element_id: Id,
        point: &Vec3,
    ) -> KernelResult<Option<PointStress>> {
        let Some(element) = self.elements.get(element_id) else {
            return Ok(None);
        };
        let Some(nodal) = self.nodal_stresses_of_element(result, element_id) else {
            return Ok(None);
        };
        let Some(natural) =
            element.natural_coords_of_point(point, self.options.interpolate_in_local_frame)?
        else {
            return Ok(None);
        };

        let tensor = element.shape_function().interpolate_tensor(&natural, &nodal)?;
        if self.options.check_nan && tensor.contains_nan() {
            return Err(KernelError::InvalidGeometry(format!(
                "interpolated stress in element {element_id} at {:?} is NaN",
                natural.as_slice()
            )));
        }
        Ok(Some(PointStress {
            element_id,
            natural,
            tensor,
        }))
    }

    /// Stress at an arbitrary point of the mesh
    pub fn stress_in_point(
        &self,
        result: &ResultId,
        point: &Vec3,
    ) -> KernelResult<Option<PointStress>> {
        if self.result_table(result).is_none() {
            return Ok(None);
        }
        match self.element_id_from_point(point)? {
            Some(element_id) => self.stress_in_element_at(result, element_id, point),
            None => Ok(None),
        }
    }
}
