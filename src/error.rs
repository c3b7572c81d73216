//! Error types for the post-processing kernel

use thiserror::Error;

use crate::sets::Id;

/// Main error type for model construction and geometric queries
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Unknown element type '{0}'")]
    UnknownElementType(String),

    #[error("Unknown material type '{0}'")]
    UnknownMaterialType(String),

    #[error("Unknown property type '{0}'")]
    UnknownPropertyType(String),

    #[error("Duplicate {kind} ID {id}")]
    DuplicateId { kind: &'static str, id: Id },

    #[error("Node {0} not found in model")]
    NodeNotFound(Id),

    #[error("Element {0} not found in model")]
    ElementNotFound(Id),

    #[error("Entity {0} is not linked to a model")]
    NotLinked(Id),

    #[error("Element {0} has an empty node set")]
    EmptyNodeSet(Id),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid natural coordinates in element {element}: round-trip error {error:e}")]
    InvalidNaturalCoordinates { element: Id, error: f64 },

    #[error("Geometry kernel failure: {0}")]
    GeometryKernelFailure(String),

    #[error("Shape function expects {expected} nodal values, got {actual}")]
    ShapeFunctionMismatch { expected: usize, actual: usize },

    #[error("Model data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Linking failed for {failed} of {total} entities (first: {first})")]
    LinkFailed {
        failed: usize,
        total: usize,
        first: Box<KernelError>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// True for errors raised by a collaborator rather than by the mesh data itself
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            KernelError::GeometryKernelFailure(_) | KernelError::SourceUnavailable(_)
        )
    }
}
