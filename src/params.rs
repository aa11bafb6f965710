use crate::BuildError;

/// Tunables for [`TriangleBVH::build`](crate::TriangleBVH::build).
///
/// Both only change the shape of the tree, never what it bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParams {
    /// Ranges at or below this many triangles become leaves
    pub max_leaf_triangles: usize,
    /// Nodes at this depth become leaves regardless of size. `None` disables the limit.
    pub max_depth: Option<u32>,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            max_leaf_triangles: 8,
            max_depth: None,
        }
    }
}

impl BuildParams {
    #[inline]
    pub fn with_max_leaf_triangles(mut self, max_leaf_triangles: usize) -> Self {
        self.max_leaf_triangles = max_leaf_triangles;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.max_leaf_triangles == 0 {
            return Err(BuildError::InvalidLeafSize);
        }
        Ok(())
    }

    /// Whether a range of `count` triangles at `depth` must stop splitting
    #[inline]
    pub fn is_leaf(&self, count: usize, depth: u32) -> bool {
        count <= self.max_leaf_triangles || self.max_depth.is_some_and(|max| depth >= max)
    }
}
