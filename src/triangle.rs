extern crate glam;

use glam::Vec3A;

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use crate::BuildError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertex0: Vec3A,
    pub vertex1: Vec3A,
    pub vertex2: Vec3A,
    pub centroid: Vec3A,
}

impl Triangle {
    /// Zeroed Triangle
    pub const ZERO: Self = Triangle {
        vertex0: Vec3A::ZERO,
        vertex1: Vec3A::ZERO,
        vertex2: Vec3A::ZERO,
        centroid: Vec3A::ZERO,
    };

    #[inline]
    pub fn new(vertex0: Vec3A, vertex1: Vec3A, vertex2: Vec3A) -> Triangle {
        let mut tri = Triangle {
            vertex0,
            vertex1,
            vertex2,
            centroid: Vec3A::ZERO,
        };
        tri.compute_centroid();
        tri
    }

    /// Sum and scale in double precision, rounding to `f32` once at the end.
    /// Rounding each step in `f32` can move a centroid onto a nearby split
    /// plane and flip the side it partitions to.
    #[inline]
    pub fn compute_centroid(&mut self) {
        let third = 1.0_f64 / 3.0;
        let center = |a: f32, b: f32, c: f32| ((a as f64 + b as f64 + c as f64) * third) as f32;
        self.centroid = Vec3A::new(
            center(self.vertex0.x, self.vertex1.x, self.vertex2.x),
            center(self.vertex0.y, self.vertex1.y, self.vertex2.y),
            center(self.vertex0.z, self.vertex1.z, self.vertex2.z),
        );
    }

    #[inline]
    pub fn vertices(&self) -> [Vec3A; 3] {
        [self.vertex0, self.vertex1, self.vertex2]
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Distribution<Triangle> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Triangle {
        Triangle::new(rng.gen(), rng.gen(), rng.gen())
    }
}

/// Borrowed view over an interleaved triangle buffer.
///
/// Every triangle is three consecutive vertex records of `stride` floats each.
/// Only the first three floats of a record are read as the position; the rest
/// (material ids, padding, ...) are skipped.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSoup<'a> {
    data: &'a [f32],
    stride: usize,
    tri_count: usize,
}

impl<'a> TriangleSoup<'a> {
    pub fn new(data: &'a [f32], stride: usize) -> Result<Self, BuildError> {
        if stride < 3 {
            return Err(BuildError::InvalidStride { stride });
        }

        let floats_per_triangle = 3 * stride;
        if data.len() % floats_per_triangle != 0 {
            return Err(BuildError::MisalignedBuffer {
                len: data.len(),
                stride,
            });
        }

        Ok(Self {
            data,
            stride,
            tri_count: data.len() / floats_per_triangle,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tri_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tri_count == 0
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn floats_per_triangle(&self) -> usize {
        3 * self.stride
    }

    /// Read the triangle stored at `slot` in the original buffer order
    #[inline]
    pub fn triangle(&self, slot: usize) -> Triangle {
        let pos = slot * self.floats_per_triangle();
        let vertex = |i: usize| {
            let base = pos + i * self.stride;
            Vec3A::new(self.data[base], self.data[base + 1], self.data[base + 2])
        };
        Triangle::new(vertex(0), vertex(1), vertex(2))
    }

    /// Resolve `permuted` through `triangles_id`, then read that triangle.
    ///
    /// `permuted` must be in `[0, triangles_id.len())`.
    #[inline]
    pub fn fetch(&self, triangles_id: &[u32], permuted: usize) -> Triangle {
        self.triangle(triangles_id[permuted] as usize)
    }
}
