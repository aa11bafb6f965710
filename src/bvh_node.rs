use std::ops::Range;

use crate::AABB;

/// What a node points at: two children in the same arena, or a range of the
/// triangle permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Internal { left: u32, right: u32 },
    Leaf { start: u32, end: u32 },
}

/// BVH node stored in an arena. The node id is its position in the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BVHNode {
    pub aabb: AABB,
    pub kind: NodeKind,
}

impl Default for BVHNode {
    fn default() -> Self {
        Self {
            aabb: AABB::default(),
            kind: NodeKind::Leaf { start: 0, end: 0 },
        }
    }
}

impl BVHNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    #[inline]
    pub fn left_child(&self) -> u32 {
        match self.kind {
            NodeKind::Internal { left, .. } => left,
            NodeKind::Leaf { .. } => panic!("Leaves have no children"),
        }
    }

    #[inline]
    pub fn right_child(&self) -> u32 {
        match self.kind {
            NodeKind::Internal { right, .. } => right,
            NodeKind::Leaf { .. } => panic!("Leaves have no children"),
        }
    }

    /// Range of the triangle permutation covered by this leaf
    #[inline]
    pub fn leaf_range(&self) -> Option<Range<usize>> {
        match self.kind {
            NodeKind::Leaf { start, end } => Some(start as usize..end as usize),
            NodeKind::Internal { .. } => None,
        }
    }

    #[inline]
    pub fn setup_leaf(&mut self, start: u32, end: u32) {
        self.kind = NodeKind::Leaf { start, end };
    }

    #[inline]
    pub fn setup_children(&mut self, left: u32, right: u32) {
        self.kind = NodeKind::Internal { left, right };
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn leaf_and_internal() {
        let mut node = BVHNode::default();
        node.setup_leaf(3, 7);
        assert!(node.is_leaf());
        assert_eq!(node.leaf_range(), Some(3..7));

        node.setup_children(1, 2);
        assert!(!node.is_leaf());
        assert_eq!(node.leaf_range(), None);
        assert_eq!(node.left_child(), 1);
        assert_eq!(node.right_child(), 2);
    }

    #[test]
    #[should_panic]
    fn leaf_has_no_children() {
        BVHNode::default().left_child();
    }
}
