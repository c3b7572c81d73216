//! FEA Post - finite element post-processing kernel
//!
//! Builds a linked entity graph from a mesh (nodes, elements, materials,
//! properties) and the field results of an upstream analysis, then answers:
//! - which element contains a 3D point
//! - the stress tensor at a node, an element centre or an arbitrary point
//!
//! Supported elements are the 4-node quadrilateral (`CQUAD4`) and the
//! 3-node triangle (`CTRIA3`) shells.
//!
//! ## Example
//! ```rust
//! use fea_post::prelude::*;
//!
//! let mut source = MemorySource::new();
//! source
//!     .add_node(1, Vec3::new(0.0, 0.0, 0.0))
//!     .add_node(2, Vec3::new(4.0, 0.0, 0.0))
//!     .add_node(3, Vec3::new(4.0, 4.0, 0.0))
//!     .add_node(4, Vec3::new(0.0, 4.0, 0.0))
//!     .add_element(ElementRecord::new(1, "CQUAD4", 1, vec![1, 2, 3, 4]));
//!
//! let model = Model::create_by_source(&source, default_kernel(), ModelOptions::default()).unwrap();
//!
//! let element = model.element_id_from_point(&Vec3::new(1.0, 3.0, 0.0)).unwrap();
//! assert_eq!(element, Some(1));
//! ```

pub mod elements;
pub mod error;
pub mod geometry;
pub mod math;
pub mod model;
pub mod results;
pub mod sets;
pub mod shape;
pub mod source;

// Re-export common types
pub mod prelude {
    pub use crate::elements::{
        Element, ElementKind, ElementParams, Material, MaterialKind, MaterialParams, Node,
        NodeParams, Property, PropertyKind, PropertyParams,
    };
    pub use crate::error::{KernelError, KernelResult};
    pub use crate::geometry::{default_kernel, GeometryKernel, LocationType, NativeKernel, SharedKernel};
    pub use crate::math::{AffineMap, BoundingBox, CoordinateSystem, StressTensor, Vec3};
    pub use crate::model::{Model, ModelOptions, PointStress};
    pub use crate::results::{ResultEntry, ResultId, ResultRow, ResultSet, ResultTable};
    pub use crate::sets::{ElementSet, Id, MaterialSet, NodeSet, PropertySet};
    pub use crate::shape::{ShapeFunction, QUAD4, TRIA3};
    pub use crate::source::{ElementRecord, MemorySource, ModelSource};
}
