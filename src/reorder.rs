use crate::BuildError;

/// Copy a per-triangle buffer into BVH order.
///
/// `data` holds `elements_per_triangle` consecutive values per triangle in the
/// original order (positions, normals, uvs, material ids, ...). Entry `i` of the
/// result is original triangle `triangles_id[i]`, so leaf ranges of the flattened
/// tree index every reordered buffer consistently.
pub fn reorder_triangle_data<T>(
    data: &[T],
    elements_per_triangle: usize,
    triangles_id: &[u32],
) -> Result<Vec<T>, BuildError>
where
    T: Copy,
{
    let expected = triangles_id.len() * elements_per_triangle;
    if data.len() != expected {
        return Err(BuildError::CompanionLengthMismatch {
            len: data.len(),
            expected,
        });
    }

    let mut reordered = Vec::new();
    reordered.try_reserve_exact(expected)?;
    for &src in triangles_id {
        let src = src as usize * elements_per_triangle;
        reordered.extend_from_slice(&data[src..src + elements_per_triangle]);
    }

    Ok(reordered)
}
