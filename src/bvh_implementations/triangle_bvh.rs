use std::{
    fmt::{self, Write},
    marker::PhantomData,
};

use smallvec::SmallVec;

use crate::{
    flatten, reorder_triangle_data, BVHNode, BuildError, BuildParams, FlatBVH, Grow,
    LongestExtentStrategy, SplitPlane, SplitPlaneStrategy, TriangleSoup, AABB,
};

/// Largest mesh the flat encoding can address. Node ids and biased leaf bounds
/// are stored in `f32` fields and must stay below 2^24 to be exact.
pub const MAX_TRIANGLES: usize = 1 << 23;

/// Diagnostics collected while building
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Deepest level a node was created at (root = 0)
    pub tree_depth: u32,
    pub node_count: u32,
    pub leaf_count: u32,
}

/// Pending `[start, end)` range to split for an already allocated node
#[derive(Debug, Clone, Copy)]
struct Task {
    node_id: u32,
    start: usize,
    end: usize,
    depth: u32,
}

/// Mutable state of one build invocation
struct BuildContext<'a> {
    soup: TriangleSoup<'a>,
    params: BuildParams,
    triangles_id: Vec<u32>,
    nodes: Vec<BVHNode>,
    stats: BuildStats,
}

impl<'a> BuildContext<'a> {
    fn new(soup: TriangleSoup<'a>, params: BuildParams) -> Result<Self, BuildError> {
        let tri_count = soup.len();

        let mut triangles_id = Vec::new();
        triangles_id.try_reserve_exact(tri_count)?;
        triangles_id.extend(0..tri_count as u32);

        // every split creates two non-empty children, so a tree over N triangles has at most 2N - 1 nodes
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(2 * tri_count - 1)?;

        Ok(Self {
            soup,
            params,
            triangles_id,
            nodes,
            stats: BuildStats::default(),
        })
    }

    fn compute_bounds(&self, start: usize, end: usize) -> AABB {
        let mut aabb = AABB::default();
        for i in start..end {
            aabb.grow(&self.soup.fetch(&self.triangles_id, i));
        }
        aabb
    }

    fn push_node(&mut self, aabb: AABB) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(BVHNode {
            aabb,
            ..Default::default()
        });
        id
    }

    fn build<Strat>(&mut self) -> Result<(), BuildError>
    where
        Strat: SplitPlaneStrategy,
    {
        let tri_count = self.triangles_id.len();
        let root_bounds = self.compute_bounds(0, tri_count);
        let root_id = self.push_node(root_bounds);

        // Right children are pushed first so that left subtrees are finished before
        // their siblings start, which keeps node ids in depth-first creation order.
        let mut stack: SmallVec<[Task; 64]> = SmallVec::new();
        stack.push(Task {
            node_id: root_id,
            start: 0,
            end: tri_count,
            depth: 0,
        });

        while let Some(task) = stack.pop() {
            if let Some((left, right)) = self.subdivide::<Strat>(task)? {
                stack.push(right);
                stack.push(left);
            }
        }

        self.stats.node_count = self.nodes.len() as u32;
        Ok(())
    }

    /// Turn the node into a leaf, or split its range in place and allocate both children
    fn subdivide<Strat>(&mut self, task: Task) -> Result<Option<(Task, Task)>, BuildError>
    where
        Strat: SplitPlaneStrategy,
    {
        let Task {
            node_id,
            start,
            end,
            depth,
        } = task;

        self.stats.tree_depth = self.stats.tree_depth.max(depth);

        if end <= start {
            log::error!("BVH builder got an empty triangle range [{start}, {end}) for node {node_id}");
            return Err(BuildError::EmptyRange { start, end });
        }

        if self.params.is_leaf(end - start, depth) {
            self.nodes[node_id as usize].setup_leaf(start as u32, end as u32);
            self.stats.leaf_count += 1;
            return Ok(None);
        }

        let SplitPlane {
            axis,
            split_position,
        } = Strat::get_split_plane(&self.nodes[node_id as usize].aabb);

        let mut left_box = AABB::default();
        let mut right_box = AABB::default();

        // Quick partition
        let mut li = start;
        let mut ri = end;
        while li < ri {
            let tri = self.soup.fetch(&self.triangles_id, li);
            if tri.centroid[axis] < split_position {
                left_box.grow(&tri);
                li += 1;
            } else {
                right_box.grow(&tri);
                ri -= 1;
                self.triangles_id.swap(li, ri);
            }
        }

        let mid = if li != start && li != end {
            li
        } else {
            // Every centroid landed on one side, split by count instead
            let mid = start + (end - start) / 2;
            log::debug!(
                "Degenerate split for node {node_id} over [{start}, {end}), falling back to midpoint {mid}"
            );
            left_box = self.compute_bounds(start, mid);
            right_box = self.compute_bounds(mid, end);
            mid
        };

        let left_id = self.push_node(left_box);
        let right_id = self.push_node(right_box);
        self.nodes[node_id as usize].setup_children(left_id, right_id);

        Ok(Some((
            Task {
                node_id: left_id,
                start,
                end: mid,
                depth: depth + 1,
            },
            Task {
                node_id: right_id,
                start: mid,
                end,
                depth: depth + 1,
            },
        )))
    }
}

/// Binary BVH over a borrowed triangle soup.
///
/// Nodes live in an arena indexed by their build order id, the root is node 0.
/// Leaves reference ranges of [`TriangleBVH::triangles_id`], the triangle
/// permutation produced while partitioning.
#[derive(Debug, Clone)]
pub struct TriangleBVH<Strat = LongestExtentStrategy> {
    nodes: Vec<BVHNode>,
    triangles_id: Vec<u32>,
    stats: BuildStats,
    strategy: PhantomData<Strat>,
}

impl<Strat> TriangleBVH<Strat>
where
    Strat: SplitPlaneStrategy,
{
    /// Build from an interleaved vertex buffer where every vertex record is `stride` floats
    pub fn build(vertices: &[f32], stride: usize, params: &BuildParams) -> Result<Self, BuildError> {
        let soup = TriangleSoup::new(vertices, stride)?;
        Self::build_from_soup(soup, params)
    }

    pub fn build_from_soup(soup: TriangleSoup<'_>, params: &BuildParams) -> Result<Self, BuildError> {
        params.validate()?;

        let tri_count = soup.len();
        if tri_count == 0 {
            return Err(BuildError::EmptyMesh);
        }
        if tri_count > MAX_TRIANGLES {
            return Err(BuildError::TooManyTriangles {
                count: tri_count,
                max: MAX_TRIANGLES,
            });
        }

        log::info!("Building BVH for {tri_count} triangles");

        let mut ctx = BuildContext::new(soup, *params)?;
        ctx.build::<Strat>()?;

        log::info!(
            "BVH depth = {}; nodes = {}; leaves = {}",
            ctx.stats.tree_depth,
            ctx.stats.node_count,
            ctx.stats.leaf_count
        );

        Ok(Self {
            nodes: ctx.nodes,
            triangles_id: ctx.triangles_id,
            stats: ctx.stats,
            strategy: PhantomData,
        })
    }
}

impl<Strat> TriangleBVH<Strat> {
    pub const ROOT_NODE_ID: u32 = 0;

    #[inline]
    pub fn nodes(&self) -> &[BVHNode] {
        &self.nodes
    }

    #[inline]
    pub fn root(&self) -> &BVHNode {
        &self.nodes[Self::ROOT_NODE_ID as usize]
    }

    #[inline]
    pub fn bounds(&self) -> AABB {
        self.root().aabb
    }

    /// Triangle permutation: leaf range entry `i` refers to original triangle `triangles_id[i]`
    #[inline]
    pub fn triangles_id(&self) -> &[u32] {
        &self.triangles_id
    }

    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Dense per-node records ready for upload
    pub fn flatten(&self) -> FlatBVH {
        flatten(&self.nodes)
    }

    /// Copy a per-triangle buffer into the order the leaves index
    pub fn reorder<T>(&self, data: &[T], elements_per_triangle: usize) -> Result<Vec<T>, BuildError>
    where
        T: Copy,
    {
        reorder_triangle_data(data, elements_per_triangle, &self.triangles_id)
    }

    pub fn into_parts(self) -> (Vec<BVHNode>, Vec<u32>) {
        (self.nodes, self.triangles_id)
    }

    /// Depth indented listing of every node
    pub fn dump_tree(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        let mut stack: SmallVec<[(u32, u32); 64]> = SmallVec::new();
        stack.push((Self::ROOT_NODE_ID, 0));

        while let Some((node_id, depth)) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            write!(
                out,
                "{:indent$}{node_id}({depth}) : {:?} {:?}",
                "",
                node.aabb.min,
                node.aabb.max,
                indent = 2 * depth as usize
            )?;
            match node.leaf_range() {
                Some(range) => {
                    writeln!(out, " LeafTri = {} to {}", range.start, range.end)?;
                }
                None => {
                    writeln!(out)?;
                    stack.push((node.right_child(), depth + 1));
                    stack.push((node.left_child(), depth + 1));
                }
            }
        }

        Ok(out)
    }

    /// Log [`TriangleBVH::dump_tree`] at trace level
    pub fn log_tree(&self) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }

        match self.dump_tree() {
            Ok(dump) => {
                for line in dump.lines() {
                    log::trace!("{line}");
                }
            }
            Err(err) => log::warn!("Failed to format BVH tree: {err}"),
        }
    }
}
