//! Node entity - a point of the mesh

use serde::{Deserialize, Serialize};

use super::{LinkContext, Linkable};
use crate::error::{KernelError, KernelResult};
use crate::math::Vec3;
use crate::sets::{ElementSet, Entity, Id};

/// Raw node attributes as supplied by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeParams {
    pub id: Id,
    /// Position in the global frame
    pub coords: Vec3,
    /// Coordinate system the position was defined in
    #[serde(default)]
    pub ref_csys_id: Id,
    /// Coordinate system of the nodal results
    #[serde(default)]
    pub analysis_csys_id: Id,
    /// Elements referencing this node
    #[serde(default)]
    pub parent_element_ids: Vec<Id>,
}

impl NodeParams {
    /// Node in the basic coordinate system with no parent elements yet
    pub fn new(id: Id, coords: Vec3) -> Self {
        Self {
            id,
            coords,
            ref_csys_id: 0,
            analysis_csys_id: 0,
            parent_element_ids: Vec::new(),
        }
    }

    pub fn with_parents(mut self, parent_element_ids: Vec<Id>) -> Self {
        self.parent_element_ids = parent_element_ids;
        self
    }
}

/// A mesh node
#[derive(Debug, Clone)]
pub struct Node {
    id: Id,
    coords: Vec3,
    ref_csys_id: Id,
    analysis_csys_id: Id,
    parent_element_ids: Vec<Id>,

    /// Ordinal indices of the parent elements, set once when linked
    parent_indices: Option<Vec<usize>>,
}

impl Entity for Node {
    const KIND: &'static str = "node";

    fn id(&self) -> Id {
        self.id
    }
}

impl Node {
    pub fn new(params: NodeParams) -> Self {
        Self {
            id: params.id,
            coords: params.coords,
            ref_csys_id: params.ref_csys_id,
            analysis_csys_id: params.analysis_csys_id,
            parent_element_ids: params.parent_element_ids,
            parent_indices: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn coords(&self) -> &Vec3 {
        &self.coords
    }

    pub fn ref_csys_id(&self) -> Id {
        self.ref_csys_id
    }

    pub fn analysis_csys_id(&self) -> Id {
        self.analysis_csys_id
    }

    pub fn parent_element_ids(&self) -> &[Id] {
        &self.parent_element_ids
    }

    /// Parent elements as ordinal indices into the model's element set
    pub fn parent_indices(&self) -> KernelResult<&[usize]> {
        self.parent_indices
            .as_deref()
            .ok_or(KernelError::NotLinked(self.id))
    }

    pub fn is_linked(&self) -> bool {
        self.parent_indices.is_some()
    }

    /// Euclidean distance to a point
    pub fn distance_to(&self, point: &Vec3) -> f64 {
        (self.coords - point).norm()
    }
}

impl Linkable for Node {
    type Target = ElementSet;

    fn link(&mut self, elements: &ElementSet, _ctx: &LinkContext<'_>) -> KernelResult<()> {
        if self.parent_indices.is_some() {
            return Ok(());
        }
        let indices = self
            .parent_element_ids
            .iter()
            .map(|&eid| elements.index_of(eid).ok_or(KernelError::ElementNotFound(eid)))
            .collect::<KernelResult<Vec<_>>>()?;

        log::debug!("Linked node {} to {} elements", self.id, indices.len());
        self.parent_indices = Some(indices);
        Ok(())
    }
}
