// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sub-pixel depth by bilinear interpolation of the 4 surrounding pixels.
//!
//! Each available corner is projected in 3D first,
//! and the 3D points are blended with the bilinear weights.
//! If some corners miss a disparity, blending would be biased toward
//! whichever corners are present, so the projection of the available corner
//! with the highest weight is used instead.

use itertools::izip;
use log::{debug, trace};

use crate::core::{
    disparity::DisparityStore,
    error::{Error, Result},
    keypoint::Keypoint,
    projection::PointProjector,
};
use crate::misc::type_aliases::{Float, Point3};

/// Integer top left corner of a 2x2 neighborhood with its bilinear weights.
///
/// Corners are ordered `(u0, v0)`, `(u0+1, v0)`, `(u0, v0+1)`, `(u0+1, v0+1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighborhood {
    /// Column of the top left corner.
    pub u0: usize,
    /// Row of the top left corner.
    pub v0: usize,
    /// Bilinear weights of the 4 corners, summing to 1.
    pub weights: [Float; 4],
}

impl Neighborhood {
    /// Neighborhood of a sub-pixel location.
    ///
    /// Requires `u >= 0` and `v >= 0`, as enforced by `check_margin`:
    /// negative coordinates would saturate to 0 and give negative weights.
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(u: Float, v: Float) -> Self {
        let u0 = u.floor() as usize;
        let v0 = v.floor() as usize;
        let fu = u - u0 as Float;
        let fv = v - v0 as Float;
        Self {
            u0,
            v0,
            weights: [
                (1.0 - fu) * (1.0 - fv),
                fu * (1.0 - fv),
                (1.0 - fu) * fv,
                fu * fv,
            ],
        }
    }

    /// Integer coordinates of the 4 corners.
    pub fn corners(&self) -> [(usize, usize); 4] {
        let (u, v) = (self.u0, self.v0);
        [(u, v), (u + 1, v), (u, v + 1), (u + 1, v + 1)]
    }
}

/// Check that a location leaves a one pixel margin for the 2x2 neighborhood:
/// `0 <= u <= width - 2` and `0 <= v <= height - 2`.
#[allow(clippy::cast_precision_loss)]
pub fn check_margin(store: &DisparityStore, u: Float, v: Float) -> Result<()> {
    let u_max = store.width() as Float - 2.0;
    let v_max = store.height() as Float - 2.0;
    // Written so that NaN coordinates fail.
    if u >= 0.0 && v >= 0.0 && u <= u_max && v <= v_max {
        Ok(())
    } else {
        debug!("check_margin: no room for interpolation at ({}, {})", u, v);
        Err(Error::InsufficientMargin {
            u,
            v,
            width: store.width(),
            height: store.height(),
        })
    }
}

/// 3D point at a sub-pixel location, `None` if none of the 4 neighbors has a disparity.
#[allow(clippy::cast_precision_loss)]
pub fn interpolate(
    store: &DisparityStore,
    projector: &PointProjector,
    u: Float,
    v: Float,
) -> Result<Option<Point3>> {
    check_margin(store, u, v)?;
    let neighborhood = Neighborhood::new(u, v);
    let corners = neighborhood.corners();
    let mut disparities = [None; 4];
    for (d, &(cu, cv)) in disparities.iter_mut().zip(corners.iter()) {
        *d = store.query(cu, cv)?;
    }
    let project =
        |(cu, cv): (usize, usize), d: Float| projector.project(cu as Float, cv as Float, d);

    let nb_missing = disparities.iter().filter(|d| d.is_none()).count();
    if nb_missing == 4 {
        trace!("interpolate: all neighbors missing at ({}, {})", u, v);
        return Ok(None);
    }

    if nb_missing > 0 {
        // Available corner with the highest weight, first one on ties.
        let mut nearest: Option<(Float, (usize, usize), Float)> = None;
        for (&w, &corner, d) in izip!(&neighborhood.weights, &corners, &disparities) {
            if let Some(d) = *d {
                match nearest {
                    Some((w_max, _, _)) if w <= w_max => (),
                    _ => nearest = Some((w, corner, d)),
                }
            }
        }
        trace!(
            "interpolate: {} neighbors missing at ({}, {}), nearest available used",
            nb_missing,
            u,
            v
        );
        return Ok(nearest.map(|(_, corner, d)| project(corner, d)));
    }

    let mut xyz = Point3::origin();
    for (&w, &corner, d) in izip!(&neighborhood.weights, &corners, &disparities) {
        if let Some(d) = *d {
            xyz.coords += w * project(corner, d).coords;
        }
    }
    Ok(Some(xyz))
}

/// Refine the 3D point of a keypoint at its sub-pixel rectified location.
///
/// Returns whether a point was found. The keypoint is only modified on success.
pub fn interpolate_keypoint(
    store: &DisparityStore,
    projector: &PointProjector,
    keypoint: &mut Keypoint,
) -> Result<bool> {
    let uv = keypoint.rect_base_uv;
    match interpolate(store, projector, uv.x, uv.y)? {
        Some(xyz) => {
            keypoint.set_xyz(xyz);
            Ok(true)
        }
        None => Ok(false),
    }
}

// TESTS #############################################################
