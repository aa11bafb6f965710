//! Dense GPU layout of the node arena.
//!
//! Every node becomes one 8 float record (two RGBA32F texels):
//!
//! ```text
//! [min.x, min.y, min.z, left | -(start + 1), max.x, max.y, max.z, right | -(end + 1)]
//! ```
//!
//! Internal nodes store their child ids, which are always `>= 1` because the
//! root (id 0) is nobody's child. Leaves store their permutation range biased
//! by one and negated, so both fields are `<= -1`. A traversal only has to test
//! `field < 0.0` to tell "descend" from "iterate triangles".

use bytemuck::{Pod, Zeroable};

use glam::Vec3A;

use crate::{BVHNode, BuildError, NodeKind, AABB};

/// Floats per flattened node
pub const FLOATS_PER_NODE: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FlatNode {
    pub min: [f32; 3],
    pub left_or_start: f32,
    pub max: [f32; 3],
    pub right_or_end: f32,
}

#[inline]
pub fn encode_leaf_bound(bound: u32) -> f32 {
    -((bound + 1) as f32)
}

#[inline]
pub fn decode_leaf_bound(field: f32) -> u32 {
    (-field) as u32 - 1
}

impl From<&BVHNode> for FlatNode {
    fn from(node: &BVHNode) -> Self {
        let (left_or_start, right_or_end) = match node.kind {
            NodeKind::Internal { left, right } => (left as f32, right as f32),
            NodeKind::Leaf { start, end } => (encode_leaf_bound(start), encode_leaf_bound(end)),
        };

        Self {
            min: node.aabb.min.to_array(),
            left_or_start,
            max: node.aabb.max.to_array(),
            right_or_end,
        }
    }
}

impl FlatNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left_or_start < 0.0
    }

    #[inline]
    pub fn aabb(&self) -> AABB {
        AABB::new(Vec3A::from_array(self.min), Vec3A::from_array(self.max))
    }
}

/// Flattened BVH, indexed by node id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatBVH {
    nodes: Vec<FlatNode>,
}

impl FlatBVH {
    /// Reinterpret a float buffer produced by [`FlatBVH::as_floats`]
    pub fn from_floats(floats: &[f32]) -> Result<Self, BuildError> {
        let nodes: &[FlatNode] = bytemuck::try_cast_slice(floats).map_err(|_| {
            BuildError::MalformedFlatBuffer(format!(
                "{} floats is not a multiple of {FLOATS_PER_NODE}",
                floats.len()
            ))
        })?;

        Ok(Self {
            nodes: nodes.to_vec(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.nodes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }
}

/// Write every node of the arena into its own record.
///
/// Records are addressed by node id, so the order nodes are visited in does
/// not matter.
pub fn flatten(nodes: &[BVHNode]) -> FlatBVH {
    log::debug!("Flattening BVH with {} nodes", nodes.len());

    let mut flat = vec![FlatNode::zeroed(); nodes.len()];
    for (id, node) in nodes.iter().enumerate() {
        flat[id] = FlatNode::from(node);
    }

    FlatBVH { nodes: flat }
}

fn decode_index(field: f32, what: &str, node_id: usize) -> Result<u32, BuildError> {
    if field.fract() != 0.0 || !(0.0..16_777_216.0).contains(&field) {
        return Err(BuildError::MalformedFlatBuffer(format!(
            "node {node_id} has a non integral {what} field {field}"
        )));
    }
    Ok(field as u32)
}

/// Rebuild the node arena from its flat form, validating links and ranges.
///
/// Leaves must cover a non-empty range. When `tri_count` is given, every leaf
/// range must also end within `tri_count` triangles.
pub fn unflatten(flat: &FlatBVH, tri_count: Option<usize>) -> Result<Vec<BVHNode>, BuildError> {
    let count = flat.len();
    let mut nodes = Vec::with_capacity(count);

    for (id, record) in flat.nodes().iter().enumerate() {
        let left_leaf = record.left_or_start < 0.0;
        let right_leaf = record.right_or_end < 0.0;

        let kind = match (left_leaf, right_leaf) {
            (true, true) => {
                let start = decode_index(-record.left_or_start, "leaf start", id)?;
                let end = decode_index(-record.right_or_end, "leaf end", id)?;
                if start == 0 || end <= start {
                    return Err(BuildError::MalformedFlatBuffer(format!(
                        "node {id} has an empty or inverted leaf range"
                    )));
                }
                let (start, end) = (start - 1, end - 1);
                if let Some(tri_count) = tri_count {
                    if end as usize > tri_count {
                        return Err(BuildError::MalformedFlatBuffer(format!(
                            "node {id} leaf range [{start}, {end}) exceeds {tri_count} triangles"
                        )));
                    }
                }
                NodeKind::Leaf { start, end }
            }
            (false, false) => {
                let left = decode_index(record.left_or_start, "left child", id)?;
                let right = decode_index(record.right_or_end, "right child", id)?;
                for child in [left, right] {
                    if child as usize <= id || child as usize >= count {
                        return Err(BuildError::MalformedFlatBuffer(format!(
                            "node {id} links to invalid child {child}"
                        )));
                    }
                }
                NodeKind::Internal { left, right }
            }
            _ => {
                return Err(BuildError::MalformedFlatBuffer(format!(
                    "node {id} mixes a child link with a leaf bound"
                )))
            }
        };

        nodes.push(BVHNode {
            aabb: record.aabb(),
            kind,
        });
    }

    Ok(nodes)
}
