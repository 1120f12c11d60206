// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Depth source of a stereo odometry front end fed with precomputed disparities.
//!
//! Typical use for each frame:
//!
//! 1. `set_disparity_data` with the new disparity grid,
//! 2. `get_xyz` on the frame keypoints,
//! 3. after feature matching, `refine_xyz` on the matches.
//!
//! Ingestion requires `&mut self` while every query only needs `&self`,
//! so no query can overlap with the ingestion of the next grid.

use log::debug;

use crate::core::{
    calibration::StereoCalibration,
    depth::{self, DepthReport},
    disparity::DisparityStore,
    error::Result,
    interpolation,
    keypoint::{Keypoint, OdometryFrame},
    matches::{FeatureMatch, MatchBuffer},
    options::Options,
    projection::PointProjector,
    refine::{self, RefineReport},
};
use crate::misc::type_aliases::{Float, Point3};

/// Recover 3D points of keypoints from a disparity map.
/// Can only be constructed from a valid calibration and `Options`.
pub struct StereoDisparity {
    calibration: StereoCalibration,
    options: Options,
    projector: PointProjector,
    store: DisparityStore,
    matches: MatchBuffer,
}

impl StereoDisparity {
    /// Allocate the disparity grid and the match buffer once for all frames.
    pub fn new(calibration: StereoCalibration, options: Options) -> Result<Self> {
        options.validate()?;
        let (width, height) = (calibration.width(), calibration.height());
        debug!(
            "StereoDisparity::new {}x{} grid, {} match slots",
            width, height, options.matches_capacity
        );
        Ok(Self {
            projector: PointProjector::new(&calibration),
            store: DisparityStore::new(width, height),
            matches: MatchBuffer::with_capacity(options.matches_capacity),
            calibration,
            options,
        })
    }

    /// Replace the disparity grid with the one of a new frame.
    ///
    /// `disparity_data` is row-major, with 0.0 meaning "no disparity".
    pub fn set_disparity_data(
        &mut self,
        disparity_data: &[Float],
        width: usize,
        height: usize,
    ) -> Result<()> {
        self.store.ingest(disparity_data, width, height)
    }

    /// Whether the pixel `(u, v)` has a disparity.
    pub fn have_xyz(&self, u: usize, v: usize) -> Result<bool> {
        self.store.have_xyz(u, v)
    }

    /// 3D point of a pixel with a given disparity.
    pub fn xyz_values(&self, u: Float, v: Float, disparity: Float) -> Point3 {
        self.projector.project(u, v, disparity)
    }

    /// Assign depth to every keypoint of every level of a frame.
    pub fn get_xyz(&self, frame: &mut OdometryFrame) -> Result<DepthReport> {
        depth::assign_depth(&self.store, &self.projector, frame)
    }

    /// Interpolated depth of a keypoint at its sub-pixel location.
    /// Returns false if no neighbor has a disparity.
    pub fn get_xyz_interp(&self, keypoint: &mut Keypoint) -> Result<bool> {
        interpolation::interpolate_keypoint(&self.store, &self.projector, keypoint)
    }

    /// Refine the depth of matches needing it and update their status.
    pub fn refine_xyz(&self, matches: &mut [FeatureMatch]) -> Result<RefineReport> {
        refine::refine_matches(&self.store, &self.projector, matches)
    }

    /// Refine the matches held in the owned buffer.
    pub fn refine_owned_matches(&mut self) -> Result<RefineReport> {
        refine::refine_matches(&self.store, &self.projector, &mut self.matches)
    }

    /// Matches held by this instance.
    pub fn matches(&self) -> &MatchBuffer {
        &self.matches
    }

    /// Mutable access to the matches held by this instance.
    pub fn matches_mut(&mut self) -> &mut MatchBuffer {
        &mut self.matches
    }

    /// Calibration given at construction.
    pub fn calibration(&self) -> &StereoCalibration {
        &self.calibration
    }

    /// Options given at construction.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Width of the disparity grid.
    pub fn width(&self) -> usize {
        self.calibration.width()
    }

    /// Height of the disparity grid.
    pub fn height(&self) -> usize {
        self.calibration.height()
    }
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use crate::core::error::Error;
    use crate::core::keypoint::PyramidLevel;
    use crate::core::matches::MatchStatus;
    use crate::misc::type_aliases::Point2;
    use approx;

    const EPSILON: Float = 1e-5;

    fn stereo(options: Options) -> StereoDisparity {
        let calib =
            StereoCalibration::from_rectified(5, 4, 400.0, (2.0, 1.5), 2.0, 0.12).unwrap();
        StereoDisparity::new(calib, options).unwrap()
    }

    /// Only the 2x2 block with top left corner (1, 1) has a disparity of 10.
    fn block_grid() -> Vec<Float> {
        let mut raw = vec![0.0; 5 * 4];
        for &(u, v) in &[(1, 1), (2, 1), (1, 2), (2, 2)] {
            raw[v * 5 + u] = 10.0;
        }
        raw
    }

    #[test]
    fn invalid_options_rejected() {
        let calib = StereoCalibration::from_rectified(5, 4, 400.0, (2.0, 1.5), 2.0, 0.12).unwrap();
        let options = Options {
            max_pyramid_level: 0,
            ..Options::default()
        };
        assert!(StereoDisparity::new(calib, options).is_err());
    }

    #[test]
    fn interpolation_inside_a_block() {
        let mut stereo = stereo(Options::default());
        stereo.set_disparity_data(&block_grid(), 5, 4).unwrap();
        let mut keypoint = Keypoint::new(Point2::new(1.5, 1.5));
        assert_eq!(Ok(true), stereo.get_xyz_interp(&mut keypoint));
        let expected = stereo.xyz_values(1.5, 1.5, 10.0);
        assert!(approx::relative_eq!(keypoint.xyz, expected, epsilon = EPSILON));
    }

    #[test]
    fn frame_then_matches() {
        let mut stereo = stereo(Options::default());
        assert!(stereo.set_disparity_data(&block_grid(), 4, 5).is_err());
        stereo.set_disparity_data(&block_grid(), 5, 4).unwrap();
        assert_eq!(Ok(true), stereo.have_xyz(2, 2));
        assert_eq!(Ok(false), stereo.have_xyz(0, 0));

        let mut frame = OdometryFrame::new(vec![
            PyramidLevel {
                keypoints: vec![
                    Keypoint::new(Point2::new(1.2, 0.9)),
                    Keypoint::new(Point2::new(3.4, 3.0)),
                ],
            },
            PyramidLevel {
                keypoints: vec![Keypoint::new(Point2::new(0.8, 1.6))],
            },
        ]);
        let report = stereo.get_xyz(&mut frame).unwrap();
        assert_eq!(2, report.with_depth);
        assert_eq!(1, report.without_depth);

        let reference = frame.levels[0].keypoints[0].clone();
        let mut target = reference.clone();
        target.rect_base_uv = Point2::new(1.7, 1.25);
        let mut matched = FeatureMatch::new(reference.clone(), target);
        matched.status = MatchStatus::NeedsDepthRefinement;
        stereo.matches_mut().push(matched).unwrap();

        let mut lost = FeatureMatch::new(reference.clone(), reference);
        lost.target.rect_base_uv = Point2::new(3.0, 0.0);
        lost.status = MatchStatus::NeedsDepthRefinement;
        stereo.matches_mut().push(lost).unwrap();

        let report = stereo.refine_owned_matches().unwrap();
        assert_eq!(
            RefineReport {
                refined: 1,
                failed: 1
            },
            report
        );
        let statuses: Vec<_> = stereo.matches().iter().map(|m| m.status).collect();
        assert_eq!(
            vec![MatchStatus::Ok, MatchStatus::RefinementFailed],
            statuses
        );
        assert!(!stereo.matches()[1].inlier);
    }

    #[test]
    fn owned_buffer_respects_capacity() {
        let mut stereo = stereo(Options {
            matches_capacity: 1,
            ..Options::default()
        });
        let kp = Keypoint::new(Point2::new(1.0, 1.0));
        let m = FeatureMatch::new(kp.clone(), kp);
        assert!(stereo.matches_mut().push(m.clone()).is_ok());
        assert_eq!(
            Err(Error::CapacityExceeded { capacity: 1 }),
            stereo.matches_mut().push(m)
        );
    }
}
