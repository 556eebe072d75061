//! # Spines and timepoint grouping
//!
//! A **spine** is one gaze ray cast through the volume at one timepoint, together with
//! the intensities sampled along it. The full set of spines recorded during a tracking
//! session is called a **hedgehog**.
//!
//! ## Overview
//! -----------------
//! This module provides:
//! - [`Spine`]: the per-ray record (samples, sample positions, ray geometry, observer pose,
//!   tracker confidence).
//! - [`TimepointGroup`]: spines grouped by timepoint, preserving the first-seen order of
//!   timepoints and the recording order of spines inside each timepoint.
//! - [`csv_reader`]: the CSV ingestion paths (minimal and full schemas).
//! - [`writer`]: the hedgehog dump and track listing exports.
//!
//! ## Invariants
//! -----------------
//! * `samples.len() == sample_positions.len()` for every [`Spine`].
//! * A spine without samples is legal; it simply yields no candidate vertex.
//!
//! ## See also
//! ------------
//! * [`HedgehogAnalysis`](crate::analysis::HedgehogAnalysis) – Consumes a list of spines.
pub mod csv_reader;
pub mod writer;

use std::{collections::HashMap, sync::Arc};

use nalgebra::Quaternion;

use crate::{
    constants::{Quat, Timepoint, Vec3},
    hedgehog_errors::HedgehogError,
};

/// One gaze ray and the intensities sampled along it.
///
/// # Fields
///
/// * `timepoint` - The volume timepoint at capture time
/// * `origin`, `direction` - The ray in world/device space
/// * `distance` - Distance along the ray to the volume intersection
/// * `local_entry`, `local_exit`, `local_direction` - The ray intersection with the volume, in volume space
/// * `head_position`, `head_orientation`, `position` - Observer pose at capture time
/// * `confidence` - Trust score of the upstream gaze tracker, in `[0, 1]`
/// * `samples` - Intensities along the ray, index = distance along the ray
/// * `sample_positions` - Volume-space position of each sample
#[derive(Debug, Clone, PartialEq)]
pub struct Spine {
    pub timepoint: Timepoint,
    pub origin: Vec3,
    pub direction: Vec3,
    pub distance: f32,
    pub local_entry: Vec3,
    pub local_exit: Vec3,
    pub local_direction: Vec3,
    pub head_position: Vec3,
    pub head_orientation: Quat,
    pub position: Vec3,
    pub confidence: f32,
    samples: Vec<f32>,
    sample_positions: Vec<Vec3>,
}

impl Spine {
    /// Create a spine carrying only a timepoint, a confidence and samples.
    ///
    /// Every pose and ray field is the zero vector, the head orientation is the identity
    /// and all sample positions are therefore the origin.
    pub fn minimal(timepoint: Timepoint, confidence: f32, samples: Vec<f32>) -> Self {
        let sample_positions = vec![Vec3::zeros(); samples.len()];
        Spine {
            timepoint,
            origin: Vec3::zeros(),
            direction: Vec3::zeros(),
            distance: 0.0,
            local_entry: Vec3::zeros(),
            local_exit: Vec3::zeros(),
            local_direction: Vec3::zeros(),
            head_position: Vec3::zeros(),
            head_orientation: Quaternion::identity(),
            position: Vec3::zeros(),
            confidence,
            samples,
            sample_positions,
        }
    }

    /// Replace the samples and their positions.
    ///
    /// Return
    /// ----------
    /// * The updated spine, or [`HedgehogError::SamplePositionMismatch`] when the two
    ///   sequences do not have the same length.
    pub fn with_samples(
        mut self,
        samples: Vec<f32>,
        sample_positions: Vec<Vec3>,
    ) -> Result<Self, HedgehogError> {
        if samples.len() != sample_positions.len() {
            return Err(HedgehogError::SamplePositionMismatch {
                samples: samples.len(),
                positions: sample_positions.len(),
            });
        }
        self.samples = samples;
        self.sample_positions = sample_positions;
        Ok(self)
    }

    /// Replace the samples, deriving each position by marching along the local ray:
    /// `local_entry + local_direction * i`.
    ///
    /// This is how spines read from a CSV file, which does not store positions, are placed
    /// in volume space.
    pub fn with_marched_samples(mut self, samples: Vec<f32>) -> Self {
        self.sample_positions = (0..samples.len())
            .map(|i| self.local_entry + self.local_direction * i as f32)
            .collect();
        self.samples = samples;
        self
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_positions(&self) -> &[Vec3] {
        &self.sample_positions
    }
}

/// Spines grouped by timepoint.
///
/// Timepoints are iterated in the order they were first seen, spines of a timepoint
/// in the order they were added. This is the recording order, which the trimming
/// rules of the analysis rely on. Spines are shared ([`Arc`]) so that trimmed copies
/// of a group and the vertices extracted from it can refer to them without copying
/// the samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimepointGroup {
    entries: Vec<(Timepoint, Vec<Arc<Spine>>)>,
}

impl TimepointGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a list of spines, keeping the recording order.
    pub fn from_spines<I>(spines: I) -> Self
    where
        I: IntoIterator<Item = Spine>,
    {
        let mut index: HashMap<Timepoint, usize> = HashMap::new();
        let mut group = TimepointGroup::new();

        for spine in spines {
            match index.get(&spine.timepoint) {
                Some(&slot) => group.entries[slot].1.push(Arc::new(spine)),
                None => {
                    index.insert(spine.timepoint, group.entries.len());
                    group
                        .entries
                        .push((spine.timepoint, vec![Arc::new(spine)]));
                }
            }
        }
        group
    }

    /// Build a group from already grouped entries, in the given order.
    pub fn from_entries(entries: Vec<(Timepoint, Vec<Arc<Spine>>)>) -> Self {
        TimepointGroup { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timepoints in iteration order.
    pub fn timepoints(&self) -> impl Iterator<Item = Timepoint> + '_ {
        self.entries.iter().map(|(tp, _)| *tp)
    }

    pub fn get(&self, timepoint: Timepoint) -> Option<&[Arc<Spine>]> {
        self.entries
            .iter()
            .find(|(tp, _)| *tp == timepoint)
            .map(|(_, spines)| spines.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timepoint, &[Arc<Spine>])> + '_ {
        self.entries
            .iter()
            .map(|(tp, spines)| (*tp, spines.as_slice()))
    }

    /// The first spine of the first timepoint, if any.
    pub fn first_spine(&self) -> Option<&Arc<Spine>> {
        self.entries.first().and_then(|(_, spines)| spines.first())
    }

    /// Keep only the timepoints accepted by `keep`, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Timepoint) -> bool,
    {
        self.entries.retain(|(tp, _)| keep(*tp));
    }

    /// Keep the entries up to and including the first one accepted by `stop`.
    pub fn truncate_after<F>(&mut self, mut stop: F)
    where
        F: FnMut(Timepoint) -> bool,
    {
        if let Some(pos) = self.entries.iter().position(|(tp, _)| stop(*tp)) {
            self.entries.truncate(pos + 1);
        }
    }
}
