pub mod triangle_bvh;
pub use triangle_bvh::*;
