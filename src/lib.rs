//! Median split BVH builder for triangle soups, flattened into a dense buffer
//! that a shader can traverse iteratively.

pub mod error;
pub use error::*;

pub mod params;
pub use params::*;

pub mod axis;
pub use axis::*;

pub mod triangle;
pub use triangle::*;

pub mod aabb;
pub use aabb::*;

pub mod bvh_strategy;
pub use bvh_strategy::*;

pub mod bvh_node;
pub use bvh_node::*;

pub mod bvh_implementations;
pub use bvh_implementations::*;

pub mod flatten;
pub use flatten::*;

pub mod reorder;
pub use reorder::*;
