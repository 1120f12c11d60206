// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Feature matches between a reference and a target frame,
//! stored in a buffer of fixed capacity.

use log::debug;
use std::ops::{Deref, DerefMut};

use crate::core::error::{Error, Result};
use crate::core::keypoint::Keypoint;

/// Status of a feature match in the odometry pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    /// Not processed yet by the motion estimation.
    Pending,
    /// Match usable for motion estimation.
    Ok,
    /// The target keypoint moved to a sub-pixel location and needs a new depth.
    NeedsDepthRefinement,
    /// No depth could be found at the refined location.
    RefinementFailed,
}

/// A keypoint of the reference frame matched to one of the target frame.
#[derive(Clone, Debug)]
pub struct FeatureMatch {
    /// Keypoint in the reference frame.
    pub reference: Keypoint,
    /// Keypoint in the target frame, possibly at a refined sub-pixel location.
    pub target: Keypoint,
    /// Status of this match.
    pub status: MatchStatus,
    /// Whether the match is an inlier of the motion estimation.
    pub inlier: bool,
}

impl FeatureMatch {
    /// New pending inlier match.
    pub fn new(reference: Keypoint, target: Keypoint) -> Self {
        Self {
            reference,
            target,
            status: MatchStatus::Pending,
            inlier: true,
        }
    }
}

/// Preallocated buffer of matches that never grows.
///
/// Pushing into a full buffer is reported, never silently dropped.
#[derive(Clone, Debug)]
pub struct MatchBuffer {
    capacity: usize,
    matches: Vec<FeatureMatch>,
}

impl MatchBuffer {
    /// Allocate room for exactly `capacity` matches.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            matches: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of matches.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of free slots.
    pub fn remaining(&self) -> usize {
        self.capacity - self.matches.len()
    }

    /// Append a match if there is room left.
    pub fn push(&mut self, feature_match: FeatureMatch) -> Result<()> {
        if self.matches.len() >= self.capacity {
            debug!("MatchBuffer::push: capacity of {} reached", self.capacity);
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.matches.push(feature_match);
        Ok(())
    }

    /// Remove all matches, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.matches.clear();
    }
}

impl Deref for MatchBuffer {
    type Target = [FeatureMatch];
    fn deref(&self) -> &[FeatureMatch] {
        &self.matches
    }
}

impl DerefMut for MatchBuffer {
    fn deref_mut(&mut self) -> &mut [FeatureMatch] {
        &mut self.matches
    }
}

// TESTS #############################################################
