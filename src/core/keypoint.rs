// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Keypoints of one frame, organized by pyramid level.

use crate::misc::helper;
use crate::misc::type_aliases::{Float, Levels, Point2, Point3, Vec4};

/// Depth related data of a detected keypoint.
#[derive(Clone, Debug)]
pub struct Keypoint {
    /// Rectified sub-pixel position `(u, v)` in the full resolution image.
    pub rect_base_uv: Point2,
    /// Disparity at the nearest pixel, NaN if unknown.
    pub disparity: Float,
    /// Position in camera space, NaN if unknown.
    pub xyz: Point3,
    /// Homogeneous position in camera space, NaN if unknown.
    pub xyzw: Vec4,
    /// Whether `xyz` and `xyzw` hold a valid depth.
    pub has_depth: bool,
}

impl Keypoint {
    /// Keypoint at a rectified position, without any depth yet.
    pub fn new(rect_base_uv: Point2) -> Self {
        let (xyz, xyzw) = helper::nan_point();
        Self {
            rect_base_uv,
            disparity: Float::NAN,
            xyz,
            xyzw,
            has_depth: false,
        }
    }

    /// Set a valid position in camera space.
    pub fn set_xyz(&mut self, xyz: Point3) {
        self.xyz = xyz;
        self.xyzw = helper::homogeneous(&xyz);
        self.has_depth = true;
    }

    /// Mark the keypoint as without depth.
    pub fn clear_depth(&mut self) {
        let (xyz, xyzw) = helper::nan_point();
        self.disparity = Float::NAN;
        self.xyz = xyz;
        self.xyzw = xyzw;
        self.has_depth = false;
    }
}

/// Keypoints detected at one resolution level.
#[derive(Clone, Debug, Default)]
pub struct PyramidLevel {
    /// Keypoints of this level.
    pub keypoints: Vec<Keypoint>,
}

/// Multi-resolution keypoints of one frame.
#[derive(Clone, Debug, Default)]
pub struct OdometryFrame {
    /// Levels, from the highest resolution to the lowest.
    pub levels: Levels<PyramidLevel>,
}

impl OdometryFrame {
    /// Frame with the given levels.
    pub fn new(levels: Levels<PyramidLevel>) -> Self {
        Self { levels }
    }

    /// Number of pyramid levels.
    pub fn nb_levels(&self) -> usize {
        self.levels.len()
    }

    /// Total number of keypoints over all levels.
    pub fn nb_keypoints(&self) -> usize {
        self.levels.iter().map(|l| l.keypoints.len()).sum()
    }

    /// Iterate over all keypoints, level by level.
    pub fn keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        self.levels.iter().flat_map(|l| l.keypoints.iter())
    }
}
