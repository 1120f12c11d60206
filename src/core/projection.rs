// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Projection of (pixel, disparity) samples into 3D camera space.

use crate::core::calibration::StereoCalibration;
use crate::misc::type_aliases::{Float, Mat4, Point3, Vec4};

/// Apply the fixed `(u, v, disparity, 1) -> (x, y, z, w)` transform
/// followed by the perspective division.
#[derive(PartialEq, Debug, Clone)]
pub struct PointProjector {
    uvd1_to_xyz: Mat4,
}

impl PointProjector {
    /// Projector using the calibration transform, immutable afterwards.
    pub fn new(calibration: &StereoCalibration) -> Self {
        Self::from_matrix(*calibration.uvd1_to_xyz())
    }

    /// Projector with an arbitrary homogeneous transform.
    pub fn from_matrix(uvd1_to_xyz: Mat4) -> Self {
        Self { uvd1_to_xyz }
    }

    /// The homogeneous transform.
    pub fn matrix(&self) -> &Mat4 {
        &self.uvd1_to_xyz
    }

    /// 3D point of a pixel with a given disparity.
    ///
    /// When the resulting w is zero (or close to it) the coordinates are
    /// non finite. This is not checked, non finite values propagate.
    pub fn project(&self, u: Float, v: Float, disparity: Float) -> Point3 {
        let xyzw = self.uvd1_to_xyz * Vec4::new(u, v, disparity, 1.0);
        Point3::from(xyzw.xyz() / xyzw.w)
    }
}

// TESTS #############################################################
