// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors reported by the depth recovery stage.
//!
//! Missing depth is not an error: it is a data condition reported through
//! `has_depth` flags and match statuses. Only caller contract breaches
//! and invalid setups end up here.

use thiserror::Error;

use crate::misc::type_aliases::Float;

/// Errors that can occur while recovering depth from disparities.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Disparity grid dimensions differ from the calibrated ones.
    #[error("disparity grid is {got:?} (width, height) but calibration expects {expected:?}")]
    DimensionMismatch {
        /// (width, height) fixed by the calibration.
        expected: (usize, usize),
        /// (width, height) actually provided.
        got: (usize, usize),
    },
    /// Disparity buffer length does not match the announced dimensions.
    #[error("disparity buffer holds {got} values but {expected} were announced")]
    BufferLength {
        /// width * height.
        expected: usize,
        /// Length of the provided buffer.
        got: usize,
    },
    /// Pixel query outside of the disparity grid.
    #[error("pixel ({u}, {v}) is outside of the {width}x{height} disparity grid")]
    OutOfBounds {
        /// Column.
        u: Float,
        /// Row.
        v: Float,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// Sub-pixel location too close to the border for a 2x2 neighborhood.
    #[error("location ({u}, {v}) leaves no one pixel margin in the {width}x{height} grid")]
    InsufficientMargin {
        /// Sub-pixel column.
        u: Float,
        /// Sub-pixel row.
        v: Float,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// The fixed capacity match buffer is full.
    #[error("match buffer is full (capacity {capacity})")]
    CapacityExceeded {
        /// Capacity of the buffer.
        capacity: usize,
    },
    /// Calibration parameters cannot be used.
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),
    /// Options are out of their valid range.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Result type used all over the crate.
pub type Result<T> = std::result::Result<T, Error>;
