//! # Track: the reconstructed trajectory
//!
//! A [`Track`] is the result of a successful [`HedgehogAnalysis`](crate::analysis::HedgehogAnalysis)
//! run: an ordered list of points, one per retained timepoint, each paired with the
//! vertex it was taken from, plus the mean tracker confidence of the whole recording.
//!
//! ## Finalization
//! -----------------
//! [`finalize`] reduces a chained path to the track:
//!
//! 1. vertices are grouped by timepoint, in order of first appearance;
//! 2. each group keeps the vertex whose source spine has the highest confidence, the
//!    first one winning ties;
//! 3. a vertex is kept only if the gaze direction of its spine agrees with the one of its
//!    predecessor along the path (`dot > 0.5`). A vertex without predecessor is dropped.
//!
//! The track owns the vertex arena, so every point can still be followed along the
//! `previous`/`next` links after the analysis is gone.
use std::{collections::HashMap, fmt};

use crate::{
    analysis::graph::{SpineGraph, SpineGraphVertex, VertexId},
    constants::{Timepoint, Vec3, DIRECTION_CONSISTENCY},
};

/// Reconstructed trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<(Vec3, VertexId)>,
    pub confidence: f32,
    graph: SpineGraph,
}

impl Track {
    pub(crate) fn new(
        points: Vec<(Vec3, VertexId)>,
        confidence: f32,
        graph: SpineGraph,
    ) -> Self {
        Track {
            points,
            confidence,
            graph,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of the track with their vertex, in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Vec3, &SpineGraphVertex)> + '_ {
        self.points
            .iter()
            .map(|(p, id)| (p, self.graph.vertex(*id)))
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().map(|(p, _)| *p).collect()
    }

    /// The vertex arena the points refer to.
    pub fn graph(&self) -> &SpineGraph {
        &self.graph
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Track with {} points, confidence={}",
            self.len(),
            self.confidence
        )?;
        for (position, vertex) in self.iter() {
            writeln!(
                f,
                "  t={} ({} {} {})",
                vertex.timepoint, position.x, position.y, position.z
            )?;
        }
        Ok(())
    }
}

/// Build the track from a chained (and possibly pruned) path.
///
/// Arguments
/// -----------------
/// * `graph`: the vertex arena, moved into the track.
/// * `path`: the path vertices in order, initial vertex excluded.
/// * `confidence`: the aggregate confidence reported by the track.
///
/// Return
/// ----------
/// * The finalized [`Track`], possibly empty.
pub fn finalize(graph: SpineGraph, path: &[VertexId], confidence: f32) -> Track {
    let mut index: HashMap<Timepoint, usize> = HashMap::new();
    let mut by_timepoint: Vec<Vec<VertexId>> = Vec::new();
    for id in path {
        let tp = graph.vertex(*id).timepoint;
        match index.get(&tp) {
            Some(&slot) => by_timepoint[slot].push(*id),
            None => {
                index.insert(tp, by_timepoint.len());
                by_timepoint.push(vec![*id]);
            }
        }
    }

    let points = by_timepoint
        .iter()
        .filter_map(|ids| highest_confidence(&graph, ids))
        .filter(|id| direction_agreement(&graph, *id) > DIRECTION_CONSISTENCY)
        .map(|id| (graph.vertex(id).local_position, id))
        .collect();

    Track::new(points, confidence, graph)
}

/// First vertex with the highest source confidence.
fn highest_confidence(graph: &SpineGraph, ids: &[VertexId]) -> Option<VertexId> {
    ids.iter().copied().reduce(|best, id| {
        if graph.vertex(id).source.confidence > graph.vertex(best).source.confidence {
            id
        } else {
            best
        }
    })
}

/// Dot product between the gaze direction of `id` and of its predecessor, `0.0`
/// without predecessor.
fn direction_agreement(graph: &SpineGraph, id: VertexId) -> f32 {
    graph
        .previous(id)
        .map(|p| {
            graph
                .vertex(id)
                .source
                .direction
                .dot(&p.source.direction)
        })
        .unwrap_or(0.0)
}
