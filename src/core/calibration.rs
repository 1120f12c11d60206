// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration of a rectified stereo pair, as seen by the depth recovery stage.

use crate::core::error::{Error, Result};
use crate::misc::type_aliases::{Float, Mat4};

/// Image dimensions and the homogeneous transform
/// mapping `(u, v, disparity, 1)` to `(x, y, z, w)`.
#[derive(PartialEq, Debug, Clone)]
pub struct StereoCalibration {
    width: usize,
    height: usize,
    uvd1_to_xyz: Mat4,
}

impl StereoCalibration {
    /// Use an externally computed reprojection matrix as is.
    pub fn new(width: usize, height: usize, uvd1_to_xyz: Mat4) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidCalibration(format!(
                "image dimensions must be non zero, got {}x{}",
                width, height
            )));
        }
        if uvd1_to_xyz.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidCalibration(
                "reprojection matrix has non finite coefficients".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            uvd1_to_xyz,
        })
    }

    /// Build the reprojection matrix of a rectified pair.
    ///
    /// `principal_point` is the one of the left (reference) camera,
    /// `right_cx` the horizontal principal point of the right camera,
    /// and `baseline` the distance between both optical centers.
    /// With identical principal points, a disparity `d` gives `z = focal * baseline / d`.
    pub fn from_rectified(
        width: usize,
        height: usize,
        focal: Float,
        principal_point: (Float, Float),
        right_cx: Float,
        baseline: Float,
    ) -> Result<Self> {
        if !(baseline.is_finite() && baseline > 0.0) {
            return Err(Error::InvalidCalibration(format!(
                "baseline must be positive, got {}",
                baseline
            )));
        }
        if !(focal.is_finite() && focal > 0.0) {
            return Err(Error::InvalidCalibration(format!(
                "focal length must be positive, got {}",
                focal
            )));
        }
        let (cx, cy) = principal_point;
        #[rustfmt::skip]
        let uvd1_to_xyz = Mat4::new(
            1.0, 0.0, 0.0,            -cx,
            0.0, 1.0, 0.0,            -cy,
            0.0, 0.0, 0.0,            focal,
            0.0, 0.0, 1.0 / baseline, (right_cx - cx) / baseline,
        );
        Self::new(width, height, uvd1_to_xyz)
    }

    /// Number of columns of the disparity grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows of the disparity grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The `(u, v, disparity, 1) -> (x, y, z, w)` transform.
    pub fn uvd1_to_xyz(&self) -> &Mat4 {
        &self.uvd1_to_xyz
    }
}

// TESTS #############################################################
