use std::iter;

use glam::Vec3A;

use rand::{thread_rng, Rng};

use approx::*;

use flat_bvh::*;

static TRIANGLES_NUM: usize = 512;

/// Random triangles, each vertex record padded with a fake material id
fn random_mesh(count: usize, stride: usize) -> Vec<f32> {
    let mut rng = thread_rng();
    let mut data = Vec::with_capacity(count * stride * 3);
    iter::repeat(0).take(count).for_each(|_| {
        let v0 = rng.gen::<Vec3A>() * 9.0 - Vec3A::splat(5.0);
        let v1 = v0 + rng.gen::<Vec3A>();
        let v2 = v0 + rng.gen::<Vec3A>();
        for v in [v0, v1, v2] {
            data.extend_from_slice(&[v.x, v.y, v.z]);
            data.extend(iter::repeat(7.0).take(stride - 3));
        }
    });
    data
}

fn check_tree(bvh: &TriangleBVH, soup: &TriangleSoup, params: &BuildParams) {
    let nodes = bvh.nodes();
    let tri_count = soup.len();
    let mut covered = vec![0_u32; tri_count];

    // (node id, depth)
    let mut stack = vec![(0_u32, 0_u32)];
    let mut visited = 0;
    while let Some((id, depth)) = stack.pop() {
        visited += 1;
        let node = &nodes[id as usize];
        assert!(node.aabb.is_valid());

        match node.kind {
            NodeKind::Internal { left, right } => {
                assert!(node.aabb.contains(&nodes[left as usize].aabb));
                assert!(node.aabb.contains(&nodes[right as usize].aabb));
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
            NodeKind::Leaf { start, end } => {
                assert!(start < end, "leaves are never empty");
                if let Some(max_depth) = params.max_depth {
                    assert!(depth <= max_depth);
                }
                if end - start > params.max_leaf_triangles as u32 {
                    assert_eq!(Some(depth), params.max_depth);
                }
                for i in start as usize..end as usize {
                    let tri = soup.fetch(bvh.triangles_id(), i);
                    for v in tri.vertices() {
                        assert!(node.aabb.contains_point(v));
                    }
                    covered[bvh.triangles_id()[i] as usize] += 1;
                }
            }
        }
    }

    assert_eq!(visited, nodes.len(), "every arena node is reachable from the root");
    assert!(covered.iter().all(|&c| c == 1), "every triangle is in exactly one leaf");
}

#[test]
fn random_mesh_properties() {
    let _ = env_logger::builder().is_test(true).try_init();

    let data = random_mesh(TRIANGLES_NUM, 4);
    let soup = TriangleSoup::new(&data, 4).unwrap();

    for params in [
        BuildParams::default(),
        BuildParams::default().with_max_leaf_triangles(1),
        BuildParams::default().with_max_depth(Some(4)),
    ] {
        let bvh = TriangleBVH::build_from_soup(soup, &params).unwrap();
        check_tree(&bvh, &soup, &params);

        let stats = bvh.stats();
        assert_eq!(stats.node_count as usize, bvh.nodes().len());
        assert_eq!(stats.node_count, 2 * stats.leaf_count - 1);
    }
}

#[test]
fn root_bounds_every_vertex() {
    let data = random_mesh(TRIANGLES_NUM, 3);
    let soup = TriangleSoup::new(&data, 3).unwrap();
    let bvh = TriangleBVH::<LongestExtentStrategy>::build_from_soup(soup, &BuildParams::default()).unwrap();

    let mut expected = AABB::default();
    for i in 0..soup.len() {
        expected.grow(&soup.triangle(i));
    }
    assert_relative_eq!(bvh.bounds().min, expected.min);
    assert_relative_eq!(bvh.bounds().max, expected.max);
}

#[test]
fn build_is_deterministic() {
    let data = random_mesh(TRIANGLES_NUM, 3);
    let params = BuildParams::default().with_max_leaf_triangles(2);

    let a: TriangleBVH = TriangleBVH::build(&data, 3, &params).unwrap();
    let b: TriangleBVH = TriangleBVH::build(&data, 3, &params).unwrap();

    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.triangles_id(), b.triangles_id());
    assert_eq!(a.flatten().as_floats(), b.flatten().as_floats());
}

#[test]
fn flatten_round_trip() {
    let data = random_mesh(TRIANGLES_NUM, 4);
    let bvh: TriangleBVH = TriangleBVH::build(&data, 4, &BuildParams::default()).unwrap();

    let floats = bvh.flatten().as_floats().to_vec();
    assert_eq!(floats.len(), bvh.stats().node_count as usize * FLOATS_PER_NODE);

    let decoded = unflatten(&FlatBVH::from_floats(&floats).unwrap(), Some(TRIANGLES_NUM)).unwrap();
    assert_eq!(decoded.len(), bvh.nodes().len());
    for (decoded, node) in decoded.iter().zip(bvh.nodes()) {
        assert_eq!(decoded.kind, node.kind);
        assert_eq!(decoded.aabb.min.to_array(), node.aabb.min.to_array());
        assert_eq!(decoded.aabb.max.to_array(), node.aabb.max.to_array());
    }
}

#[test]
fn reordered_buffers_line_up_with_leaves() {
    let data = random_mesh(64, 4);
    let bvh: TriangleBVH = TriangleBVH::build(&data, 4, &BuildParams::default()).unwrap();

    // one material id per triangle, equal to its original slot
    let material_ids: Vec<u32> = (0..64).collect();
    let reordered_ids = bvh.reorder(&material_ids, 1).unwrap();
    let reordered_positions = bvh.reorder(&data, 12).unwrap();

    let soup = TriangleSoup::new(&data, 4).unwrap();
    let reordered_soup = TriangleSoup::new(&reordered_positions, 4).unwrap();
    for i in 0..64 {
        assert_eq!(reordered_ids[i], bvh.triangles_id()[i]);
        assert_eq!(
            reordered_soup.triangle(i),
            soup.triangle(reordered_ids[i] as usize)
        );
    }
}
