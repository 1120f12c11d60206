// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Core functionalities of depth recovery from disparities.

pub mod calibration;
pub mod depth;
pub mod disparity;
pub mod error;
pub mod interpolation;
pub mod keypoint;
pub mod matches;
pub mod options;
pub mod projection;
pub mod refine;
pub mod stereo_disparity;
