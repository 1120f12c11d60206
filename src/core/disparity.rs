// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Storage of the per-frame disparity grid.
//!
//! Disparities come from block matching as a row-major buffer of `f32`
//! where 0.0 means "no measurement". That sentinel only exists at the
//! ingestion boundary: the stored grid holds explicit `Disparity` values.

use log::debug;
use nalgebra::DMatrix;

use crate::core::error::{Error, Result};
use crate::misc::helper;
use crate::misc::type_aliases::Float;

/// Raw disparity value meaning that block matching found no correspondence.
pub const SENTINEL: Float = 0.0;

/// A disparity is either unknown or a measured value.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Disparity {
    /// No measurement for this pixel.
    Unknown,
    /// Measured disparity, in pixels.
    Known(Float),
}

impl Disparity {
    /// Convert the measured value into an `Option`.
    pub fn value(self) -> Option<Float> {
        match self {
            Disparity::Known(d) => Some(d),
            Disparity::Unknown => None,
        }
    }
}

/// Transform a raw disparity from a block matcher into a `Disparity`.
///
/// The sentinel (and any non-finite value) means that it is unknown.
/// A sentinel is never read as a zero disparity, i.e. a point at infinity.
pub fn from_raw(raw: Float) -> Disparity {
    if raw == SENTINEL || !raw.is_finite() {
        Disparity::Unknown
    } else {
        Disparity::Known(raw)
    }
}

/// Disparity grid with dimensions fixed by the calibration.
///
/// Allocated once and fully overwritten at each ingestion.
/// Indexed by `(row, column)`, so `(v, u)`.
#[derive(Clone, Debug)]
pub struct DisparityStore {
    width: usize,
    height: usize,
    grid: DMatrix<Disparity>,
}

impl DisparityStore {
    /// Allocate a grid where every disparity is unknown.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grid: DMatrix::repeat(height, width, Disparity::Unknown),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Replace the whole grid by a new row-major raw disparity buffer.
    ///
    /// Dimensions must be exactly the calibrated ones.
    /// The stored grid is left untouched if they are not.
    pub fn ingest(&mut self, raw: &[Float], width: usize, height: usize) -> Result<()> {
        if (width, height) != (self.width, self.height) {
            debug!(
                "DisparityStore::ingest rejected a {}x{} grid, expected {}x{}",
                width, height, self.width, self.height
            );
            return Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                got: (width, height),
            });
        }
        if raw.len() != width * height {
            debug!(
                "DisparityStore::ingest rejected a buffer of {} values",
                raw.len()
            );
            return Err(Error::BufferLength {
                expected: width * height,
                got: raw.len(),
            });
        }
        let mut nb_known = 0_usize;
        for (index, &value) in raw.iter().enumerate() {
            let (v, u) = helper::div_rem(index, width);
            let disparity = from_raw(value);
            if let Disparity::Known(_) = disparity {
                nb_known += 1;
            }
            self.grid[(v, u)] = disparity;
        }
        debug!(
            "DisparityStore::ingest {} known disparities out of {}",
            nb_known,
            raw.len()
        );
        Ok(())
    }

    /// Disparity at an integer pixel, `None` if there is no measurement.
    pub fn query(&self, u: usize, v: usize) -> Result<Option<Float>> {
        if u >= self.width || v >= self.height {
            debug!("DisparityStore::query out of bounds at ({}, {})", u, v);
            return Err(self.out_of_bounds(u as Float, v as Float));
        }
        Ok(self.grid[(v, u)].value())
    }

    /// Whether a measurement exists at an integer pixel.
    pub fn have_xyz(&self, u: usize, v: usize) -> Result<bool> {
        self.query(u, v).map(|d| d.is_some())
    }

    /// Nearest integer pixel of a sub-pixel location, checked to lie in the grid.
    ///
    /// Coordinates are rounded with `helper::round_to_pixel`.
    pub fn nearest_pixel(&self, u: Float, v: Float) -> Result<(usize, usize)> {
        let inside = |x: i64, size: usize| x >= 0 && (x as usize) < size;
        match (helper::round_to_pixel(u), helper::round_to_pixel(v)) {
            (Some(ui), Some(vi)) if inside(ui, self.width) && inside(vi, self.height) => {
                Ok((ui as usize, vi as usize))
            }
            _ => {
                debug!("DisparityStore::nearest_pixel out of bounds at ({}, {})", u, v);
                Err(self.out_of_bounds(u, v))
            }
        }
    }

    fn out_of_bounds(&self, u: Float, v: Float) -> Error {
        Error::OutOfBounds {
            u,
            v,
            width: self.width,
            height: self.height,
        }
    }
}

// TESTS #############################################################
