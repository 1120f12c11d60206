// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Options of the stereo odometry front end, fixed at construction.
//!
//! Only `matches_capacity` drives allocations in this crate.
//! The other parameters are shared with the feature detection and
//! stereo matching collaborators and are carried here so that
//! a single validated value configures the whole front end.

use serde::Deserialize;

use crate::core::error::{Error, Result};

/// Lower bound of the adaptive FAST threshold.
pub const FAST_THRESHOLD_MIN: u32 = 5;
/// Upper bound of the adaptive FAST threshold.
pub const FAST_THRESHOLD_MAX: u32 = 70;

/// Strongly typed front end configuration.
///
/// Missing fields take their default value when deserialized.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Side of the square window used to describe features (pixels). Default: 9.
    pub feature_window_size: usize,
    /// Number of pyramid levels used for feature tracking. Default: 3.
    pub max_pyramid_level: usize,
    /// Initial FAST detector threshold. Default: 20.
    pub fast_threshold: u32,
    /// Adapt the FAST threshold to reach `target_pixels_per_feature`. Default: true.
    pub use_adaptive_threshold: bool,
    /// Maximum displacement (pixels) allowed when refining a stereo match. Default: 1.0.
    ///
    /// Keeps refined locations away from the borders required by
    /// the sub-pixel interpolation.
    pub max_refinement_displacement: f64,
    /// Only keep stereo matches that are mutually the best. Default: true.
    pub require_mutual_match: bool,
    /// Maximum disparity searched by stereo matching (pixels). Default: 128.
    pub max_disparity: u32,
    /// Maximum distance to the epipolar line of a stereo match (pixels). Default: 1.5.
    pub max_dist_epipolar_line: f64,
    /// Desired image area per detected feature (pixels). Default: 250.
    pub target_pixels_per_feature: u32,
    /// Gain of the adaptive FAST threshold controller. Default: 0.005.
    pub fast_threshold_adaptive_gain: f64,
    /// Number of preallocated feature match slots. Default: 200.
    pub matches_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            feature_window_size: 9,
            max_pyramid_level: 3,
            fast_threshold: 20,
            use_adaptive_threshold: true,
            max_refinement_displacement: 1.0,
            require_mutual_match: true,
            max_disparity: 128,
            max_dist_epipolar_line: 1.5,
            target_pixels_per_feature: 250,
            fast_threshold_adaptive_gain: 0.005,
            matches_capacity: 200,
        }
    }
}

impl Options {
    /// Check that every parameter is within its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.feature_window_size == 0 {
            return invalid("feature_window_size must be positive");
        }
        if self.max_pyramid_level == 0 {
            return invalid("max_pyramid_level must be positive");
        }
        if self.matches_capacity == 0 {
            return invalid("matches_capacity must be positive");
        }
        if self.fast_threshold < FAST_THRESHOLD_MIN || self.fast_threshold > FAST_THRESHOLD_MAX {
            return Err(Error::InvalidOptions(format!(
                "fast_threshold must be in [{}, {}], got {}",
                FAST_THRESHOLD_MIN, FAST_THRESHOLD_MAX, self.fast_threshold
            )));
        }
        if !non_negative(self.max_refinement_displacement) {
            return invalid("max_refinement_displacement must be finite and non negative");
        }
        if !non_negative(self.max_dist_epipolar_line) {
            return invalid("max_dist_epipolar_line must be finite and non negative");
        }
        if !non_negative(self.fast_threshold_adaptive_gain) {
            return invalid("fast_threshold_adaptive_gain must be finite and non negative");
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> Result<()> {
    Err(Error::InvalidOptions(reason.to_string()))
}

fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

// TESTS #############################################################
