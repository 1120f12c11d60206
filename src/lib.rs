// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Depth recovery stage of a stereo visual odometry pipeline.
//!
//! Disparities computed upstream by block matching on a rectified stereo pair
//! are turned into 3D points in camera space, both for the keypoints of every
//! pyramid level of a frame and for individually refined feature matches.
//!
//! The entry point is `core::stereo_disparity::StereoDisparity`.

#![warn(missing_docs)]

pub mod core;
pub mod misc;
