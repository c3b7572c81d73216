//! Mesh entities: nodes, elements, materials and properties

mod material;
mod node;
mod property;
mod quad4;
mod tria3;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::geometry::SharedKernel;
use crate::math::{BoundingBox, CoordinateSystem, Vec3};
use crate::model::ModelOptions;
use crate::sets::{Entity, Id, NodeSet};
use crate::shape::{ShapeFunction, QUAD4, TRIA3};

pub use material::{Material, MaterialKind, MaterialParams};
pub use node::{Node, NodeParams};
pub use property::{Property, PropertyKind, PropertyParams};

/// Shared state handed to every entity while a model links
pub(crate) struct LinkContext<'a> {
    pub kernel: &'a SharedKernel,
    pub options: &'a ModelOptions,
}

/// One-time resolution of ID references into the owning model's sets
///
/// Only [`Model`](crate::model::Model) construction drives this.
pub(crate) trait Linkable {
    /// The set this entity's references point into
    type Target;

    fn link(&mut self, target: &Self::Target, ctx: &LinkContext<'_>) -> KernelResult<()>;
}

/// Supported element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// 4-node quadrilateral shell
    Quad4,
    /// 3-node triangular shell
    Tria3,
}

impl ElementKind {
    /// Element type from its bulk-data card name
    pub fn from_type_name(name: &str) -> KernelResult<Self> {
        match name {
            "CQUAD4" => Ok(ElementKind::Quad4),
            "CTRIA3" => Ok(ElementKind::Tria3),
            other => Err(KernelError::UnknownElementType(other.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Quad4 => "CQUAD4",
            ElementKind::Tria3 => "CTRIA3",
        }
    }

    pub fn corner_count(&self) -> usize {
        match self {
            ElementKind::Quad4 => 4,
            ElementKind::Tria3 => 3,
        }
    }

    pub fn shape_function(&self) -> &'static dyn ShapeFunction {
        match self {
            ElementKind::Quad4 => &QUAD4,
            ElementKind::Tria3 => &TRIA3,
        }
    }
}

/// Raw element attributes as supplied by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementParams {
    pub id: Id,
    /// Topological dimension
    pub dim: usize,
    /// Card name, e.g. `CQUAD4`
    pub type_name: String,
    pub property_id: Id,
    /// All node IDs in connectivity order
    pub node_ids: Vec<Id>,
    /// Geometry-defining corner node IDs
    pub corner_node_ids: Vec<Id>,
    /// Representative point of the element
    pub coords: Vec3,
}

/// Geometry derived while linking
#[derive(Debug, Clone)]
pub struct LinkedGeometry {
    node_indices: Vec<usize>,
    corner_indices: Vec<usize>,
    corner_coords: Vec<Vec3>,
    bounding_box: BoundingBox,
    centroid: Vec3,
    local_csys: CoordinateSystem,
    kernel: SharedKernel,
    linear_tolerance: f64,
    natural_tolerance: f64,
    max_iterations: usize,
}

impl LinkedGeometry {
    /// Ordinal indices of all nodes in the model's node set
    pub fn node_indices(&self) -> &[usize] {
        &self.node_indices
    }

    /// Ordinal indices of the corner nodes in the model's node set
    pub fn corner_indices(&self) -> &[usize] {
        &self.corner_indices
    }

    pub fn corner_coords(&self) -> &[Vec3] {
        &self.corner_coords
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn centroid(&self) -> &Vec3 {
        &self.centroid
    }

    pub fn local_csys(&self) -> &CoordinateSystem {
        &self.local_csys
    }
}

/// A finite element
#[derive(Debug, Clone)]
pub struct Element {
    id: Id,
    dim: usize,
    kind: ElementKind,
    property_id: Id,
    node_ids: Vec<Id>,
    corner_node_ids: Vec<Id>,
    coords: Vec3,
    linked: Option<LinkedGeometry>,
}

impl Entity for Element {
    const KIND: &'static str = "element";

    fn id(&self) -> Id {
        self.id
    }
}

impl Element {
    /// Build an element, dispatching on the card name
    pub fn new(params: ElementParams) -> KernelResult<Self> {
        let kind = ElementKind::from_type_name(&params.type_name)?;
        Ok(Self {
            id: params.id,
            dim: params.dim,
            kind,
            property_id: params.property_id,
            node_ids: params.node_ids,
            corner_node_ids: params.corner_node_ids,
            coords: params.coords,
            linked: None,
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn property_id(&self) -> Id {
        self.property_id
    }

    pub fn node_ids(&self) -> &[Id] {
        &self.node_ids
    }

    pub fn corner_node_ids(&self) -> &[Id] {
        &self.corner_node_ids
    }

    /// Representative point supplied by the data source
    pub fn coords(&self) -> &Vec3 {
        &self.coords
    }

    /// Connectivity is consistent with the element type
    pub fn is_valid(&self) -> bool {
        self.corner_node_ids.len() == self.kind.corner_count()
            && self.node_ids.len() >= self.corner_node_ids.len()
    }

    pub fn shape_function(&self) -> &'static dyn ShapeFunction {
        self.kind.shape_function()
    }

    /// True once the owning [`Model`](crate::model::Model) has linked this element
    ///
    /// Linking is not reachable from outside the crate:
    ///
    /// ```compile_fail
    /// use fea_post::elements::Linkable;
    /// ```
    pub fn is_linked(&self) -> bool {
        self.linked.is_some()
    }

    /// Derived geometry; an error before linking
    pub fn linked(&self) -> KernelResult<&LinkedGeometry> {
        self.linked.as_ref().ok_or(KernelError::NotLinked(self.id))
    }

    pub fn bounding_box(&self) -> KernelResult<&BoundingBox> {
        Ok(&self.linked()?.bounding_box)
    }

    pub fn centroid(&self) -> KernelResult<&Vec3> {
        Ok(&self.linked()?.centroid)
    }

    pub fn local_csys(&self) -> KernelResult<&CoordinateSystem> {
        Ok(&self.linked()?.local_csys)
    }

    /// True if `point` lies on or inside the element
    ///
    /// The bounding box, grown by the linear tolerance, rejects most points
    /// before the kernel is asked.
    pub fn is_point_belong(&self, point: &Vec3) -> KernelResult<bool> {
        let geo = self.linked()?;
        if !geo.bounding_box.contains_within(point, geo.linear_tolerance) {
            return Ok(false);
        }
        let location = geo.kernel.classify_point(point, &geo.corner_coords)?;
        Ok(location.is_inside())
    }

    /// Natural coordinates of `point`, `None` if the point is outside
    ///
    /// With `use_local_frame` the point and the corners are first mapped into
    /// the element's local frame. A point accepted within tolerance of an edge
    /// is clamped onto the natural domain. The result is checked by mapping it
    /// back.
    pub fn natural_coords_of_point(
        &self,
        point: &Vec3,
        use_local_frame: bool,
    ) -> KernelResult<Option<Vec3>> {
        if !self.is_point_belong(point)? {
            return Ok(None);
        }
        let geo = self.linked()?;

        let (target, nodal) = if use_local_frame {
            let to_local = geo.local_csys.map_to_local();
            (
                to_local.transform_point(point),
                to_local.transform_points(&geo.corner_coords),
            )
        } else {
            (*point, geo.corner_coords.clone())
        };

        let shape = self.shape_function();
        let solved = shape.find_natural(&target, &nodal, geo.max_iterations)?;
        let uvw = shape.clamp_to_domain(&solved);
        let back = shape.point_at(&uvw, &nodal)?;
        let error = (back - target).norm();

        if !error.is_finite() || error > geo.natural_tolerance {
            return Err(KernelError::InvalidNaturalCoordinates {
                element: self.id,
                error,
            });
        }
        Ok(Some(uvw))
    }

    /// World coordinates at natural coordinates `uvw`
    pub fn point_by_natural_coords(&self, uvw: &Vec3) -> KernelResult<Vec3> {
        let geo = self.linked()?;
        self.shape_function().point_at(uvw, &geo.corner_coords)
    }

    fn resolve(&self, nodes: &NodeSet, ids: &[Id]) -> KernelResult<Vec<usize>> {
        ids.iter()
            .map(|&nid| nodes.index_of(nid).ok_or(KernelError::NodeNotFound(nid)))
            .collect()
    }

    fn build_centroid(&self, corners: &[Vec3], kernel: &SharedKernel) -> KernelResult<Vec3> {
        match self.kind {
            ElementKind::Quad4 => quad4::centroid(corners, kernel),
            ElementKind::Tria3 => Ok(tria3::centroid(&self.coords)),
        }
    }

    fn build_local_csys(
        &self,
        corners: &[Vec3],
        centroid: &Vec3,
        tolerance: f64,
    ) -> KernelResult<CoordinateSystem> {
        match self.kind {
            ElementKind::Quad4 => quad4::local_csys(&self.coords, corners, centroid, tolerance),
            ElementKind::Tria3 => tria3::local_csys(&self.coords, corners),
        }
    }
}

impl Linkable for Element {
    type Target = NodeSet;

    /// Resolve node references, then derive bounding box, centroid and local
    /// frame in that order
    fn link(&mut self, nodes: &NodeSet, ctx: &LinkContext<'_>) -> KernelResult<()> {
        if self.linked.is_some() {
            return Ok(());
        }
        if self.node_ids.is_empty() || self.corner_node_ids.is_empty() {
            return Err(KernelError::EmptyNodeSet(self.id));
        }
        if !self.is_valid() {
            return Err(KernelError::InvalidGeometry(format!(
                "{} {} has {} corner nodes, expected {}",
                self.kind.type_name(),
                self.id,
                self.corner_node_ids.len(),
                self.kind.corner_count()
            )));
        }

        let node_indices = self.resolve(nodes, &self.node_ids)?;
        let corner_indices = self.resolve(nodes, &self.corner_node_ids)?;
        let corner_coords: Vec<Vec3> = corner_indices
            .iter()
            .filter_map(|&i| nodes.get_by_index(i))
            .map(|n| *n.coords())
            .collect();

        let bounding_box = ctx.kernel.aabb(&corner_coords)?;
        let centroid = self.build_centroid(&corner_coords, ctx.kernel)?;
        let local_csys =
            self.build_local_csys(&corner_coords, &centroid, ctx.options.linear_tolerance)?;

        log::debug!(
            "Linked {} {}: centroid {:?}",
            self.kind.type_name(),
            self.id,
            centroid.as_slice()
        );

        self.linked = Some(LinkedGeometry {
            node_indices,
            corner_indices,
            corner_coords,
            bounding_box,
            centroid,
            local_csys,
            kernel: ctx.kernel.clone(),
            linear_tolerance: ctx.options.linear_tolerance,
            natural_tolerance: ctx.options.natural_tolerance,
            max_iterations: ctx.options.max_iterations,
        });
        Ok(())
    }
}
