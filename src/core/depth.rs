// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Assign depth to every keypoint of a frame from the disparity at its nearest pixel.

use log::debug;
use rayon::prelude::*;
use std::ops::Add;

use crate::core::{
    disparity::DisparityStore,
    error::Result,
    keypoint::{Keypoint, OdometryFrame},
    projection::PointProjector,
};
use crate::misc::type_aliases::Float;

/// Number of keypoints with and without depth after an assignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DepthReport {
    /// Keypoints where a disparity was available.
    pub with_depth: usize,
    /// Keypoints without disparity.
    pub without_depth: usize,
}

impl Add for DepthReport {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            with_depth: self.with_depth + other.with_depth,
            without_depth: self.without_depth + other.without_depth,
        }
    }
}

/// Assign depth to all keypoints of all levels of a frame.
///
/// Nearest pixels of all keypoints are checked first.
/// If one is outside of the grid, the error is returned and no keypoint is modified.
pub fn assign_depth(
    store: &DisparityStore,
    projector: &PointProjector,
    frame: &mut OdometryFrame,
) -> Result<DepthReport> {
    frame.keypoints().try_for_each(|kp| {
        store
            .nearest_pixel(kp.rect_base_uv.x, kp.rect_base_uv.y)
            .map(|_| ())
    })?;
    let mut report = DepthReport::default();
    for level in frame.levels.iter_mut() {
        report = report
            + level
                .keypoints
                .par_iter_mut()
                .map(|kp| assign_keypoint(store, projector, kp))
                .try_reduce(DepthReport::default, |a, b| Ok(a + b))?;
    }
    debug!(
        "assign_depth: {} keypoints with depth, {} without",
        report.with_depth, report.without_depth
    );
    Ok(report)
}

/// Assign depth to one keypoint from the disparity at its nearest pixel.
///
/// The 3D point is the projection of the integer pixel itself.
#[allow(clippy::cast_precision_loss)]
pub fn assign_keypoint(
    store: &DisparityStore,
    projector: &PointProjector,
    keypoint: &mut Keypoint,
) -> Result<DepthReport> {
    let (u, v) = store.nearest_pixel(keypoint.rect_base_uv.x, keypoint.rect_base_uv.y)?;
    match store.query(u, v)? {
        None => {
            keypoint.clear_depth();
            Ok(DepthReport {
                with_depth: 0,
                without_depth: 1,
            })
        }
        Some(disparity) => {
            keypoint.disparity = disparity;
            keypoint.set_xyz(projector.project(u as Float, v as Float, disparity));
            Ok(DepthReport {
                with_depth: 1,
                without_depth: 0,
            })
        }
    }
}

// TESTS #############################################################
