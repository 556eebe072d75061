//! Spine conditioning: from raw samples to candidate vertices.
//!
//! Each spine is smoothed, its strict local maxima are located, and every maximum is
//! turned into a [`SpineGraphVertex`] placed in world space with the local-to-world
//! transform. Spines are independent of each other, so the work can be spread over the
//! rayon thread pool when the crate is built with the `parallel` feature.
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    analysis::graph::{SpineGraph, SpineGraphVertex, VertexId},
    constants::{Timepoint, Transform, SMOOTHING_ITERATIONS},
    math::transform_point,
    signal::{gauss_smoothing, local_maxima},
    spines::{Spine, TimepointGroup},
};

/// Candidate vertices of one spine, in sample order.
///
/// Arguments
/// -----------------
/// * `timepoint`: the timepoint the spine is grouped under.
/// * `spine`: the spine to condition.
/// * `local_to_world`: transform applied to the sample positions.
///
/// Return
/// ----------
/// * One unlinked vertex per strict local maximum of the smoothed samples.
pub fn condition_spine(
    timepoint: Timepoint,
    spine: &Arc<Spine>,
    local_to_world: &Transform,
) -> Vec<SpineGraphVertex> {
    let smoothed = gauss_smoothing(spine.samples(), SMOOTHING_ITERATIONS);

    local_maxima(&smoothed)
        .into_iter()
        .filter_map(|(index, value)| {
            let local_position = *spine.sample_positions().get(index)?;
            Some(SpineGraphVertex {
                timepoint,
                local_position,
                world_position: transform_point(local_to_world, &local_position),
                sample_index: index,
                value,
                source: Arc::clone(spine),
                previous: None,
                next: None,
            })
        })
        .collect()
}

fn condition_timepoint(
    timepoint: Timepoint,
    spines: &[Arc<Spine>],
    local_to_world: &Transform,
) -> Vec<SpineGraphVertex> {
    spines
        .iter()
        .flat_map(|spine| condition_spine(timepoint, spine, local_to_world))
        .collect()
}

#[cfg(feature = "parallel")]
fn condition_all(
    group: &TimepointGroup,
    local_to_world: &Transform,
    parallel: bool,
) -> Vec<(Timepoint, Vec<SpineGraphVertex>)> {
    if !parallel {
        return condition_all_sequential(group, local_to_world);
    }
    let entries: Vec<(Timepoint, &[Arc<Spine>])> = group.iter().collect();
    entries
        .par_iter()
        .map(|(tp, spines)| (*tp, condition_timepoint(*tp, spines, local_to_world)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn condition_all(
    group: &TimepointGroup,
    local_to_world: &Transform,
    _parallel: bool,
) -> Vec<(Timepoint, Vec<SpineGraphVertex>)> {
    condition_all_sequential(group, local_to_world)
}

fn condition_all_sequential(
    group: &TimepointGroup,
    local_to_world: &Transform,
) -> Vec<(Timepoint, Vec<SpineGraphVertex>)> {
    group
        .iter()
        .map(|(tp, spines)| (tp, condition_timepoint(tp, spines, local_to_world)))
        .collect()
}

/// Condition every spine of `group` and move the resulting vertices into `graph`.
///
/// Arguments
/// -----------------
/// * `group`: the trimmed timepoint group.
/// * `local_to_world`: transform applied to the sample positions.
/// * `parallel`: condition on the rayon thread pool (only with the `parallel` feature).
/// * `graph`: the arena receiving the vertices.
///
/// Return
/// ----------
/// * One entry per timepoint of `group`, in iteration order, listing the ids of its
///   candidates in spine order then maximum order. Timepoints without any candidate
///   keep an empty entry. The result does not depend on `parallel`.
pub fn extract_candidates(
    group: &TimepointGroup,
    local_to_world: &Transform,
    parallel: bool,
    graph: &mut SpineGraph,
) -> Vec<(Timepoint, Vec<VertexId>)> {
    condition_all(group, local_to_world, parallel)
        .into_iter()
        .map(|(tp, vertices)| {
            let ids = vertices.into_iter().map(|v| graph.push(v)).collect();
            (tp, ids)
        })
        .collect()
}
