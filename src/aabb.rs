use glam::Vec3A;

use strum::IntoEnumIterator;

use crate::{Axis, Triangle};

/// Axis aligned bounding box. The default box is empty (min = +inf, max = -inf)
/// so that any growth strictly enlarges it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Objects an [`AABB`] can be grown by
pub trait Grow<T> {
    fn grow(&mut self, value: T);
}

impl Grow<Vec3A> for AABB {
    /// Grow the box to contain a new point
    #[inline]
    fn grow(&mut self, point: Vec3A) {
        self.max = self.max.max(point);
        self.min = self.min.min(point);
    }
}

impl Grow<&Triangle> for AABB {
    /// Grow the box to contain the three vertices of a triangle
    #[inline]
    fn grow(&mut self, tri: &Triangle) {
        self.grow(tri.vertex0);
        self.grow(tri.vertex1);
        self.grow(tri.vertex2);
    }
}

impl Grow<&AABB> for AABB {
    #[inline]
    fn grow(&mut self, other: &AABB) {
        self.max = self.max.max(other.max);
        self.min = self.min.min(other.min);
    }
}

impl AABB {
    pub const EMPTY: Self = Self {
        min: Vec3A::INFINITY,
        max: Vec3A::NEG_INFINITY,
    };

    #[inline]
    pub fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    /// Reset to the empty sentinel
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    #[inline]
    pub fn set_min(&mut self, min: Vec3A) {
        self.min = min;
    }

    #[inline]
    pub fn set_max(&mut self, max: Vec3A) {
        self.max = max;
    }

    /// Set every component of `min` to the same value
    #[inline]
    pub fn set_min_splat(&mut self, value: f32) {
        self.min = Vec3A::splat(value);
    }

    /// Set every component of `max` to the same value
    #[inline]
    pub fn set_max_splat(&mut self, value: f32) {
        self.max = Vec3A::splat(value);
    }

    /// If the AABB is valid (min <= max)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3A {
        (self.max + self.min) * 0.5
    }

    pub fn extent(&self) -> Vec3A {
        self.max - self.min
    }

    /// Axis with the largest extent.
    ///
    /// X is compared against Y first; when X does not win, Y is compared against Z.
    /// Exact ties therefore resolve towards the later axis, and a cube yields Z.
    pub fn longest_axis(&self) -> Axis {
        let extent = self.extent();
        if extent.x > extent.y {
            if extent.x > extent.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if extent.y > extent.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Inclusive point containment
    pub fn contains_point(&self, point: Vec3A) -> bool {
        Axis::iter().all(|axis| self.min[axis] <= point[axis] && point[axis] <= self.max[axis])
    }

    /// Inclusive box containment. An empty box is contained by everything.
    pub fn contains(&self, other: &AABB) -> bool {
        if !other.is_valid() {
            return true;
        }
        self.contains_point(other.min) && self.contains_point(other.max)
    }
}
