//! # Spine graph: candidate vertices and greedy chaining
//!
//! Every local maximum found along a spine becomes a [`SpineGraphVertex`]. Vertices are
//! stored in a flat arena ([`SpineGraph`]) and refer to each other through
//! [`VertexId`] indices, so the doubly-linked path built by the chaining step can be
//! rewired (see [`SpineGraph::detach`]) without any shared mutable reference.
//!
//! ## Chaining
//! -----------------
//! [`SpineGraph::chain`] walks the timepoints in order:
//!
//! 1. The **initial vertex** is the first candidate of the first timepoint whose value
//!    exceeds the starting threshold.
//! 2. For each following timepoint, candidates above the local-maximum threshold are
//!    ranked by world-space distance to the **current** vertex; the closest one (first
//!    seen on ties) is linked after `current` and becomes the new `current`.
//! 3. A timepoint without candidates, or whose closest candidate sits exactly on
//!    `current`, is skipped.
//!
//! ## Pruning
//! -----------------
//! [`SpineGraph::prune_outliers`] is an opt-in post-processing of the chained path that
//! removes vertices with unusually long edges. It is never run unless requested through
//! [`AnalysisParams::prune_outliers`](crate::analysis::params::AnalysisParams::prune_outliers).
use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    analysis::thresholds::Thresholds,
    constants::{Timepoint, Vec3},
    math::{distance, mean, std_dev, z_score},
    spines::Spine,
};

/// Index of a vertex inside its [`SpineGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// One local intensity maximum along one spine.
///
/// # Fields
///
/// * `timepoint` - Timepoint of the owning spine
/// * `local_position` - Sample position at the maximum, in volume space
/// * `world_position` - `local_position` mapped by the local-to-world transform
/// * `sample_index` - Index of the maximum in the spine's samples
/// * `value` - Smoothed intensity at the maximum
/// * `source` - The owning spine
/// * `previous`, `next` - Links set by the chaining step
#[derive(Debug, Clone, PartialEq)]
pub struct SpineGraphVertex {
    pub timepoint: Timepoint,
    pub local_position: Vec3,
    pub world_position: Vec3,
    pub sample_index: usize,
    pub value: f32,
    pub source: Arc<Spine>,
    pub previous: Option<VertexId>,
    pub next: Option<VertexId>,
}

impl fmt::Display for SpineGraphVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.local_position;
        let w = &self.world_position;
        write!(
            f,
            "SpineGraphVertex for t={}, pos=({} {} {}), index={}, worldPos=({} {} {}), value={}",
            self.timepoint, p.x, p.y, p.z, self.sample_index, w.x, w.y, w.z, self.value
        )
    }
}

/// Result of [`SpineGraph::chain`].
///
/// `path` lists the vertices linked after `initial`, in timepoint order; `initial`
/// itself is not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedPath {
    pub initial: VertexId,
    pub path: Vec<VertexId>,
}

/// Mean and population standard deviation of the edge lengths along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStatistics {
    pub avg_path_length: f32,
    pub std_dev_path_length: f32,
}

/// Arena of candidate vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpineGraph {
    vertices: Vec<SpineGraphVertex>,
}

impl SpineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Move a vertex into the arena. Its links are reset.
    pub fn push(&mut self, mut vertex: SpineGraphVertex) -> VertexId {
        vertex.previous = None;
        vertex.next = None;
        self.vertices.push(vertex);
        VertexId(self.vertices.len() - 1)
    }

    pub fn vertex(&self, id: VertexId) -> &SpineGraphVertex {
        &self.vertices[id.0]
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &SpineGraphVertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i), v))
    }

    /// The vertex linked before `id`, if any.
    pub fn previous(&self, id: VertexId) -> Option<&SpineGraphVertex> {
        self.vertex(id).previous.map(|p| self.vertex(p))
    }

    /// The vertex linked after `id`, if any.
    pub fn next(&self, id: VertexId) -> Option<&SpineGraphVertex> {
        self.vertex(id).next.map(|n| self.vertex(n))
    }

    /// Link `to` after `from`.
    pub fn link(&mut self, from: VertexId, to: VertexId) {
        self.vertices[from.0].next = Some(to);
        self.vertices[to.0].previous = Some(from);
    }

    /// World-space length of the edge leaving `id`, `0.0` at the end of a chain.
    pub fn distance(&self, id: VertexId) -> f32 {
        let v = self.vertex(id);
        v.next
            .map(|n| distance(&v.world_position, &self.vertex(n).world_position))
            .unwrap_or(0.0)
    }

    /// Remove `id` from its chain, linking its neighbours to each other.
    ///
    /// The detached vertex keeps no link.
    pub fn detach(&mut self, id: VertexId) {
        let (previous, next) = {
            let v = &self.vertices[id.0];
            (v.previous, v.next)
        };
        if let Some(p) = previous {
            self.vertices[p.0].next = next;
        }
        if let Some(n) = next {
            self.vertices[n.0].previous = previous;
        }
        let v = &mut self.vertices[id.0];
        v.previous = None;
        v.next = None;
    }

    /// Greedy nearest-neighbour chaining over per-timepoint candidate lists.
    ///
    /// Arguments
    /// -----------------
    /// * `candidates`: one entry per timepoint, in iteration order, listing the ids of the
    ///   vertices extracted at that timepoint.
    /// * `thresholds`: the thresholds derived for this run.
    ///
    /// Return
    /// ----------
    /// * The chained path, or `None` when no candidate of the first timepoint exceeds the
    ///   starting threshold.
    pub fn chain(
        &mut self,
        candidates: &[(Timepoint, Vec<VertexId>)],
        thresholds: &Thresholds,
    ) -> Option<ChainedPath> {
        let (_, first) = candidates.first()?;
        let initial = *first
            .iter()
            .find(|id| self.vertex(**id).value > thresholds.starting)?;

        let mut current = initial;
        let mut path = Vec::new();

        for (timepoint, ids) in &candidates[1..] {
            let origin = self.vertex(current).world_position;
            let closest = ids
                .iter()
                .filter(|id| self.vertex(**id).value > thresholds.local_max)
                .map(|id| (*id, distance(&origin, &self.vertex(*id).world_position)))
                .min_by(|a, b| a.1.total_cmp(&b.1));

            match closest {
                Some((id, d)) if d > 0.0 => {
                    self.link(current, id);
                    current = id;
                    path.push(id);
                }
                _ => debug!("No vertex chained at t={timepoint}"),
            }
        }

        Some(ChainedPath { initial, path })
    }

    /// Edge-length statistics over `path`.
    pub fn path_statistics(&self, path: &[VertexId]) -> PathStatistics {
        let lengths: Vec<f32> = path.iter().map(|id| self.distance(*id)).collect();
        PathStatistics {
            avg_path_length: mean(&lengths),
            std_dev_path_length: std_dev(&lengths),
        }
    }

    /// Remove vertices with unusually long edges from `path`, rewiring the chain.
    ///
    /// Two passes, both using statistics computed once at the start of the pass:
    ///
    /// 1. while some vertex has an edge at least `too_far_factor × mean`, drop all such
    ///    vertices. Skipped when all edges have zero length;
    /// 2. while some vertex has an edge-length z-score above `zscore_threshold`, drop those
    ///    vertices together with their neighbours along the path. Skipped when all edges
    ///    have the same length.
    ///
    /// Return
    /// ----------
    /// * The surviving path, in order.
    pub fn prune_outliers(
        &mut self,
        path: &[VertexId],
        too_far_factor: f32,
        zscore_threshold: f32,
    ) -> Vec<VertexId> {
        let mut path = path.to_vec();

        let limit = too_far_factor * self.path_statistics(&path).avg_path_length;
        if limit > 0.0 {
            loop {
                let too_far: Vec<VertexId> = path
                    .iter()
                    .copied()
                    .filter(|id| self.distance(*id) >= limit)
                    .collect();
                if too_far.is_empty() {
                    break;
                }
                for id in &too_far {
                    self.detach(*id);
                }
                path.retain(|id| !too_far.contains(id));
            }
        }

        let stats = self.path_statistics(&path);
        if stats.std_dev_path_length == 0.0 {
            return path;
        }
        loop {
            let outlier_positions: Vec<usize> = path
                .iter()
                .enumerate()
                .filter(|(_, id)| {
                    z_score(
                        self.distance(**id),
                        stats.avg_path_length,
                        stats.std_dev_path_length,
                    ) > zscore_threshold
                })
                .map(|(i, _)| i)
                .collect();
            if outlier_positions.is_empty() {
                break;
            }

            let mut removed = vec![false; path.len()];
            for i in outlier_positions {
                for j in i.saturating_sub(1)..=(i + 1).min(path.len() - 1) {
                    removed[j] = true;
                }
            }
            for (id, _) in path.iter().zip(&removed).filter(|(_, r)| **r) {
                self.detach(*id);
            }
            path = path
                .into_iter()
                .zip(removed)
                .filter(|(_, r)| !r)
                .map(|(id, _)| id)
                .collect();
        }
        path
    }
}
