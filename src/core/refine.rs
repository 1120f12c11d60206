// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Depth refinement of feature matches at their sub-pixel target location.
//!
//! Only matches in `NeedsDepthRefinement` change:
//!
//! * interpolation succeeds: `Ok`, with the target keypoint depth updated,
//! * interpolation fails: `RefinementFailed` and no longer an inlier.

use log::debug;
use rayon::prelude::*;
use std::ops::Add;

use crate::core::{
    disparity::DisparityStore,
    error::Result,
    interpolation,
    matches::{FeatureMatch, MatchStatus},
    projection::PointProjector,
};

/// Outcome counts of a refinement sweep.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RefineReport {
    /// Matches that went to `Ok`.
    pub refined: usize,
    /// Matches that went to `RefinementFailed`.
    pub failed: usize,
}

impl Add for RefineReport {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            refined: self.refined + other.refined,
            failed: self.failed + other.failed,
        }
    }
}

/// Refine all matches needing it. Matches are independent of each other.
///
/// Margins of all targets are checked first: on error, no match is modified.
pub fn refine_matches(
    store: &DisparityStore,
    projector: &PointProjector,
    matches: &mut [FeatureMatch],
) -> Result<RefineReport> {
    matches
        .iter()
        .filter(|m| m.status == MatchStatus::NeedsDepthRefinement)
        .try_for_each(|m| {
            let uv = m.target.rect_base_uv;
            interpolation::check_margin(store, uv.x, uv.y)
        })?;
    let report = matches
        .par_iter_mut()
        .map(|m| refine_match(store, projector, m))
        .try_reduce(RefineReport::default, |a, b| Ok(a + b))?;
    debug!(
        "refine_matches: {} refined, {} failed over {} matches",
        report.refined,
        report.failed,
        matches.len()
    );
    Ok(report)
}

/// Refine a single match.
pub fn refine_match(
    store: &DisparityStore,
    projector: &PointProjector,
    feature_match: &mut FeatureMatch,
) -> Result<RefineReport> {
    if feature_match.status != MatchStatus::NeedsDepthRefinement {
        return Ok(RefineReport::default());
    }
    if interpolation::interpolate_keypoint(store, projector, &mut feature_match.target)? {
        feature_match.status = MatchStatus::Ok;
        Ok(RefineReport {
            refined: 1,
            failed: 0,
        })
    } else {
        feature_match.status = MatchStatus::RefinementFailed;
        feature_match.inlier = false;
        Ok(RefineReport {
            refined: 0,
            failed: 1,
        })
    }
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use crate::core::calibration::StereoCalibration;
    use crate::core::error::Error;
    use crate::core::keypoint::Keypoint;
    use crate::misc::type_aliases::{Float, Point2};
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros;

    impl Arbitrary for MatchStatus {
        fn arbitrary(g: &mut Gen) -> Self {
            *g.choose(&[
                MatchStatus::Pending,
                MatchStatus::Ok,
                MatchStatus::NeedsDepthRefinement,
                MatchStatus::RefinementFailed,
            ])
            .unwrap()
        }
    }

    fn setup() -> (DisparityStore, PointProjector) {
        let calib = StereoCalibration::from_rectified(4, 4, 200.0, (1.5, 1.5), 1.5, 0.2).unwrap();
        let mut store = DisparityStore::new(4, 4);
        // Left half has disparities, right half does not.
        #[rustfmt::skip]
        let raw = [
            5.0, 5.0, 0.0, 0.0,
            5.0, 5.0, 0.0, 0.0,
            5.0, 5.0, 0.0, 0.0,
            5.0, 5.0, 0.0, 0.0,
        ];
        store.ingest(&raw, 4, 4).unwrap();
        (store, PointProjector::new(&calib))
    }

    fn summary(m: &FeatureMatch) -> (MatchStatus, bool, bool, Vec<u32>) {
        let bits = m.target.xyz.iter().map(|x| x.to_bits()).collect();
        (m.status, m.inlier, m.target.has_depth, bits)
    }

    fn match_at(u: Float, v: Float, status: MatchStatus) -> FeatureMatch {
        let mut m = FeatureMatch::new(
            Keypoint::new(Point2::new(u, v)),
            Keypoint::new(Point2::new(u, v)),
        );
        m.status = status;
        m
    }

    #[test]
    fn state_transitions() {
        let (store, projector) = setup();
        let mut matches = vec![
            match_at(0.5, 0.5, MatchStatus::NeedsDepthRefinement),
            match_at(2.0, 1.0, MatchStatus::NeedsDepthRefinement),
            match_at(2.0, 1.0, MatchStatus::Pending),
            match_at(0.5, 0.5, MatchStatus::Ok),
        ];
        let report = refine_matches(&store, &projector, &mut matches).unwrap();
        assert_eq!(
            RefineReport {
                refined: 1,
                failed: 1
            },
            report
        );

        assert_eq!(MatchStatus::Ok, matches[0].status);
        assert!(matches[0].inlier);
        assert!(matches[0].target.has_depth);

        assert_eq!(MatchStatus::RefinementFailed, matches[1].status);
        assert!(!matches[1].inlier);
        assert!(!matches[1].target.has_depth);

        // Other statuses pass through untouched.
        assert_eq!(
            summary(&match_at(2.0, 1.0, MatchStatus::Pending)),
            summary(&matches[2])
        );
        assert_eq!(
            summary(&match_at(0.5, 0.5, MatchStatus::Ok)),
            summary(&matches[3])
        );
    }

    #[test]
    fn precondition_breach_is_reported() {
        let (store, projector) = setup();
        let mut matches = vec![match_at(2.5, 1.0, MatchStatus::NeedsDepthRefinement)];
        assert!(refine_matches(&store, &projector, &mut matches).is_err());
    }

    #[test]
    fn breach_leaves_every_match_unchanged() {
        let (store, projector) = setup();
        let mut matches: Vec<_> = (0..1000)
            .map(|i| match_at((i % 3) as Float, 1.0, MatchStatus::NeedsDepthRefinement))
            .collect();
        matches[500] = match_at(3.5, 1.0, MatchStatus::NeedsDepthRefinement);
        let before: Vec<_> = matches.iter().map(summary).collect();
        match refine_matches(&store, &projector, &mut matches) {
            Err(Error::InsufficientMargin { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
        let after: Vec<_> = matches.iter().map(summary).collect();
        assert_eq!(before, after);
        assert!(matches
            .iter()
            .all(|m| m.status == MatchStatus::NeedsDepthRefinement));
    }

    #[test]
    fn second_sweep_changes_nothing() {
        let (store, projector) = setup();
        let mut matches = vec![
            match_at(0.5, 0.5, MatchStatus::NeedsDepthRefinement),
            match_at(2.0, 2.0, MatchStatus::NeedsDepthRefinement),
        ];
        refine_matches(&store, &projector, &mut matches).unwrap();
        let after_first: Vec<_> = matches.iter().map(summary).collect();
        let report = refine_matches(&store, &projector, &mut matches).unwrap();
        assert_eq!(RefineReport::default(), report);
        let after_second: Vec<_> = matches.iter().map(summary).collect();
        assert_eq!(after_first, after_second);
    }

    // PROPERTY TESTS ################################################

    #[quickcheck_macros::quickcheck]
    fn never_back_to_needs_refinement(statuses: Vec<MatchStatus>) -> bool {
        let (store, projector) = setup();
        let mut matches: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| match_at((i % 3) as Float, 1.0, *s))
            .collect();
        if refine_matches(&store, &projector, &mut matches).is_err() {
            return false;
        }
        statuses.iter().zip(matches.iter()).all(|(before, m)| {
            m.status != MatchStatus::NeedsDepthRefinement
                && (*before == MatchStatus::NeedsDepthRefinement || m.status == *before)
        })
    }
}
