//! Adaptive thresholds and timepoint trimming.
//!
//! Both thresholds are derived from the raw samples of the very first spine of a
//! recording, which is expected to be captured before the tracked object appears and
//! thus to describe the background level of the volume:
//!
//! ```text
//! starting  = min(samples) · 2 + 0.002
//! local_max = max(samples) · 0.2
//! ```
use crate::{
    constants::{Timepoint, LOCAL_MAX_FACTOR, STARTING_MIN_FACTOR, STARTING_OFFSET, ZERO_TIMEPOINT},
    spines::TimepointGroup,
};

/// Thresholds of one analysis run.
///
/// * `starting` – a raw sample above it marks the start of the window of interest, and
///   the initial vertex of the path must exceed it.
/// * `local_max` – candidates at or below it are never chained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub starting: f32,
    pub local_max: f32,
}

impl Thresholds {
    /// Derive the thresholds from one raw sample sequence, `None` if it is empty.
    pub fn from_samples(samples: &[f32]) -> Option<Self> {
        let min = samples.iter().copied().reduce(f32::min)?;
        let max = samples.iter().copied().reduce(f32::max)?;
        Some(Thresholds {
            starting: min * STARTING_MIN_FACTOR + STARTING_OFFSET,
            local_max: max * LOCAL_MAX_FACTOR,
        })
    }

    /// Derive the thresholds from the first spine of the first timepoint of `group`.
    pub fn from_group(group: &TimepointGroup) -> Option<Self> {
        Self::from_samples(group.first_spine()?.samples())
    }
}

/// First timepoint, in iteration order, where some spine has a raw sample above
/// `starting`.
pub fn find_starting_timepoint(group: &TimepointGroup, starting: f32) -> Option<Timepoint> {
    group.iter().find_map(|(tp, spines)| {
        spines
            .iter()
            .any(|s| s.samples().iter().any(|v| *v > starting))
            .then_some(tp)
    })
}

/// Keep the timepoints whose key is lower than or equal to `start`.
pub fn trim_to_start(group: &mut TimepointGroup, start: Timepoint) {
    group.retain(|tp| tp <= start);
}

/// Drop every timepoint after the first zero timepoint, which is kept.
///
/// A group without a zero timepoint is left untouched.
pub fn trim_at_zero(group: &mut TimepointGroup) {
    group.truncate_after(|tp| tp == ZERO_TIMEPOINT);
}

#[cfg(test)]
mod thresholds_test {
    use super::*;
    use crate::spines::Spine;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_samples() {
        let t = Thresholds::from_samples(&[0.0, 0.5, 0.1]).unwrap();
        assert_relative_eq!(t.starting, 0.002);
        assert_relative_eq!(t.local_max, 0.1);

        let t = Thresholds::from_samples(&[0.3, 0.6]).unwrap();
        assert_relative_eq!(t.starting, 0.602);
        assert_relative_eq!(t.local_max, 0.12);

        assert_eq!(Thresholds::from_samples(&[]), None);
    }

    #[test]
    fn test_from_group_uses_first_spine() {
        let group = TimepointGroup::from_spines(vec![
            Spine::minimal(5, 1.0, vec![0.0, 0.5, 0.1]),
            Spine::minimal(5, 1.0, vec![10.0, 20.0]),
            Spine::minimal(4, 1.0, vec![10.0]),
        ]);
        let t = Thresholds::from_group(&group).unwrap();
        assert_relative_eq!(t.local_max, 0.1);

        assert_eq!(Thresholds::from_group(&TimepointGroup::new()), None);

        let group = TimepointGroup::from_spines(vec![
            Spine::minimal(5, 1.0, vec![]),
            Spine::minimal(5, 1.0, vec![1.0]),
        ]);
        assert_eq!(Thresholds::from_group(&group), None);
    }

    #[test]
    fn test_find_starting_timepoint() {
        let group = TimepointGroup::from_spines(vec![
            Spine::minimal(9, 1.0, vec![0.0, 0.001]),
            Spine::minimal(8, 1.0, vec![]),
            Spine::minimal(7, 1.0, vec![0.0, 0.002]),
            Spine::minimal(6, 1.0, vec![0.0]),
            Spine::minimal(6, 1.0, vec![0.01]),
            Spine::minimal(5, 1.0, vec![0.5]),
        ]);
        assert_eq!(find_starting_timepoint(&group, 0.002), Some(6));
        assert_eq!(find_starting_timepoint(&group, 1.0), None);
    }

    #[test]
    fn test_trimming() {
        let spines = [3, 2, 1, 0, -1]
            .iter()
            .map(|tp| Spine::minimal(*tp, 1.0, vec![]));
        let mut group = TimepointGroup::from_spines(spines);

        trim_at_zero(&mut group);
        assert_eq!(group.timepoints().collect::<Vec<_>>(), vec![3, 2, 1, 0]);

        trim_to_start(&mut group, 1);
        assert_eq!(group.timepoints().collect::<Vec<_>>(), vec![1, 0]);

        let mut group = TimepointGroup::from_spines(
            [4, 5, 6].iter().map(|tp| Spine::minimal(*tp, 1.0, vec![])),
        );
        trim_at_zero(&mut group);
        assert_eq!(group.len(), 3);
    }
}
