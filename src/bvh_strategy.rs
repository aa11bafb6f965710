use crate::{Axis, AABB};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPlane {
    pub axis: Axis,
    pub split_position: f32,
}

pub trait SplitPlaneStrategy {
    /// Get the split plane for a node from its bounds.
    fn get_split_plane(bounds: &AABB) -> SplitPlane;
}

/// Splits at the center of the longest extent of the node box
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestExtentStrategy {}

impl SplitPlaneStrategy for LongestExtentStrategy {
    #[inline(always)]
    fn get_split_plane(bounds: &AABB) -> SplitPlane {
        let axis = bounds.longest_axis();
        SplitPlane {
            axis,
            split_position: bounds.center()[axis],
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3A;

    use crate::*;

    #[test]
    fn longest_extent_center() {
        let bounds = AABB::new(Vec3A::new(-1.0, -1.0, -1.0), Vec3A::new(11.0, 1.0, 1.0));
        let plane = LongestExtentStrategy::get_split_plane(&bounds);
        assert_eq!(plane.axis, Axis::X);
        assert_eq!(plane.split_position, 5.0);
    }

    #[test]
    fn flat_box_splits_on_z() {
        let bounds = AABB::new(Vec3A::new(2.0, 2.0, 2.0), Vec3A::new(2.0, 2.0, 2.0));
        let plane = LongestExtentStrategy::get_split_plane(&bounds);
        assert_eq!(plane.axis, Axis::Z);
        assert_eq!(plane.split_position, 2.0);
    }
}
