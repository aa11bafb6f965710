use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can abort a BVH build or a flat buffer decode.
///
/// A build is all-or-nothing: on error no tree is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Vertex stride {stride} is too small, a position needs 3 floats")]
    InvalidStride { stride: usize },

    #[error("Buffer of {len} floats is not a whole number of triangles with stride {stride}")]
    MisalignedBuffer { len: usize, stride: usize },

    #[error("Mesh has no triangles")]
    EmptyMesh,

    #[error("Mesh has {count} triangles, at most {max} can be addressed by the flat encoding")]
    TooManyTriangles { count: usize, max: usize },

    #[error("Leaves must hold at least one triangle")]
    InvalidLeafSize,

    #[error("Builder reached an empty triangle range [{start}, {end})")]
    EmptyRange { start: usize, end: usize },

    #[error("Failed to allocate BVH storage: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Per-triangle buffer has {len} elements, expected {expected}")]
    CompanionLengthMismatch { len: usize, expected: usize },

    #[error("Malformed flat BVH buffer: {0}")]
    MalformedFlatBuffer(String),
}
