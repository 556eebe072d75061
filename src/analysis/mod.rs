//! # Hedgehog analysis: trajectory reconstruction from gaze spines
//!
//! This module defines [`HedgehogAnalysis`], the engine turning a recorded hedgehog (a
//! batch of [`Spine`]s) into the [`Track`] of the object the user was following with
//! their eyes.
//!
//! ## Pipeline
//!
//! 1. **Grouping** – spines are grouped by timepoint at construction, in recording order
//!    ([`TimepointGroup`]).
//! 2. **Thresholds** – derived from the raw samples of the first spine
//!    ([`Thresholds`](crate::analysis::thresholds::Thresholds)).
//! 3. **Trimming** – timepoints after the first one with a sample above the starting
//!    threshold are dropped, then everything after the zero timepoint.
//! 4. **Conditioning** – each spine is smoothed and its local maxima become candidate
//!    vertices ([`conditioning`]).
//! 5. **Chaining** – one vertex per timepoint is linked to the previous one, greedily, by
//!    nearest world-space distance ([`SpineGraph::chain`](crate::analysis::graph::SpineGraph::chain)).
//! 6. **Pruning** (opt-in) – long edges are removed from the path
//!    ([`AnalysisParams::prune_outliers`]).
//! 7. **Finalization** – one vertex per timepoint, filtered by gaze-direction
//!    consistency ([`track::finalize`]).
//!
//! A run never fails: when the input does not allow a reconstruction, [`HedgehogAnalysis::run`]
//! returns `None`. Only loading a hedgehog from a file can fail.
//!
//! ## Logging
//!
//! Each engine owns a [`tracing::Span`], created with the engine and entered for the
//! whole duration of [`HedgehogAnalysis::run`], so all events of a run are attributed
//! to the instance that produced them.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use hedgehog::analysis::HedgehogAnalysis;
//!
//! let analysis = HedgehogAnalysis::from_minimal_csv(Utf8Path::new("hedgehog.csv")).unwrap();
//! match analysis.run() {
//!     Some(track) => println!("{track}"),
//!     None => println!("no track"),
//! }
//! ```
//!
//! ## See also
//! ------------
//! * [`read_spines`](crate::spines::csv_reader::read_spines) – CSV ingestion.
//! * [`write_track_listing`](crate::spines::writer::write_track_listing) – Track export.
pub mod conditioning;
pub mod graph;
pub mod params;
pub mod thresholds;
pub mod track;

use camino::Utf8Path;
use tracing::{info, info_span, Span};

use crate::{
    analysis::{
        conditioning::extract_candidates,
        graph::SpineGraph,
        params::AnalysisParams,
        thresholds::{find_starting_timepoint, trim_at_zero, trim_to_start, Thresholds},
        track::{finalize, Track},
    },
    constants::Transform,
    hedgehog_errors::HedgehogError,
    spines::{
        csv_reader::{read_spines, SpineCsvFormat},
        Spine, TimepointGroup,
    },
};

/// Trajectory reconstruction engine over one recorded hedgehog.
///
/// The engine keeps the untrimmed timepoint group; every call to [`run`](Self::run)
/// works on its own copy, so a run can be repeated and gives the same result.
#[derive(Debug, Clone)]
pub struct HedgehogAnalysis {
    group: TimepointGroup,
    local_to_world: Transform,
    params: AnalysisParams,
    avg_confidence: f32,
    total_sample_count: usize,
    span: Span,
}

impl HedgehogAnalysis {
    /// Create an engine over `spines`.
    ///
    /// Arguments
    /// -----------------
    /// * `spines`: the recorded spines, in recording order.
    /// * `local_to_world`: transform from volume space to world space, applied to the
    ///   candidate positions before chaining.
    ///
    /// Return
    /// ----------
    /// * An engine with default [`AnalysisParams`].
    pub fn new(spines: Vec<Spine>, local_to_world: Transform) -> Self {
        let total_sample_count = spines.len();
        let avg_confidence = if spines.is_empty() {
            0.0
        } else {
            spines.iter().map(|s| s.confidence).sum::<f32>() / total_sample_count as f32
        };

        HedgehogAnalysis {
            group: TimepointGroup::from_spines(spines),
            local_to_world,
            params: AnalysisParams::default(),
            avg_confidence,
            total_sample_count,
            span: info_span!("hedgehog_analysis", spines = total_sample_count),
        }
    }

    pub fn with_params(mut self, params: AnalysisParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the span the runs of this engine are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Load a hedgehog from a minimal (`timepoint, confidence, samples…`) CSV file,
    /// comma separated. The transform is the identity.
    pub fn from_minimal_csv(path: &Utf8Path) -> Result<Self, HedgehogError> {
        Self::from_csv_format(path, &SpineCsvFormat::minimal(), Transform::identity())
    }

    /// Load a hedgehog from a full-schema CSV file, semicolon separated. The transform
    /// is the identity.
    pub fn from_csv(path: &Utf8Path) -> Result<Self, HedgehogError> {
        Self::from_csv_format(path, &SpineCsvFormat::full(), Transform::identity())
    }

    /// Load a hedgehog from a full-schema CSV file, semicolon separated, with an
    /// explicit local-to-world transform.
    pub fn from_csv_with_matrix(
        path: &Utf8Path,
        local_to_world: Transform,
    ) -> Result<Self, HedgehogError> {
        Self::from_csv_format(path, &SpineCsvFormat::full(), local_to_world)
    }

    /// Load a hedgehog with any schema and separator.
    pub fn from_csv_format(
        path: &Utf8Path,
        format: &SpineCsvFormat,
        local_to_world: Transform,
    ) -> Result<Self, HedgehogError> {
        info!("Loading spines from CSV at {path}");
        let spines = read_spines(path, format)?;
        Ok(Self::new(spines, local_to_world))
    }

    /// Mean confidence over all spines, `0.0` without spine.
    pub fn avg_confidence(&self) -> f32 {
        self.avg_confidence
    }

    /// Number of spines the engine was built with.
    pub fn total_sample_count(&self) -> usize {
        self.total_sample_count
    }

    /// The untrimmed timepoint group.
    pub fn timepoints(&self) -> &TimepointGroup {
        &self.group
    }

    pub fn local_to_world(&self) -> &Transform {
        &self.local_to_world
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Reconstruct the track.
    ///
    /// Return
    /// ----------
    /// * `Some(track)` once a path could be started, the track possibly being empty after
    ///   finalization.
    /// * `None` when the first spine has no sample, when no sample ever exceeds the
    ///   starting threshold, or when no candidate of the first retained timepoint does.
    pub fn run(&self) -> Option<Track> {
        let _entered = self.span.enter();
        info!("Starting analysis with {} spines", self.total_sample_count);

        let mut group = self.group.clone();

        let Some(thresholds) = Thresholds::from_group(&group) else {
            info!("First spine has no samples, no track returned");
            return None;
        };
        let Some(start) = find_starting_timepoint(&group, thresholds.starting) else {
            info!(
                "No sample above the starting threshold {}, no track returned",
                thresholds.starting
            );
            return None;
        };
        info!(
            "Starting timepoint is {start}, starting threshold={}, local max threshold={}",
            thresholds.starting, thresholds.local_max
        );

        trim_to_start(&mut group, start);
        trim_at_zero(&mut group);
        info!("{} timepoints left", group.len());

        let mut graph = SpineGraph::new();
        let candidates = extract_candidates(
            &group,
            &self.local_to_world,
            self.params.parallel_conditioning,
            &mut graph,
        );
        info!("Extracted {} candidate vertices", graph.len());

        let Some(chained) = graph.chain(&candidates, &thresholds) else {
            info!("No initial vertex above the starting threshold, no track returned");
            return None;
        };

        let stats = graph.path_statistics(&chained.path);
        info!(
            "Average path length={}, stddev={}",
            stats.avg_path_length, stats.std_dev_path_length
        );

        let path = if self.params.prune_outliers {
            let pruned = graph.prune_outliers(
                &chained.path,
                self.params.too_far_factor,
                self.params.zscore_threshold,
            );
            info!(
                "Pruned {} vertices due to path length",
                chained.path.len() - pruned.len()
            );
            pruned
        } else {
            chained.path
        };

        let track = finalize(graph, &path, self.avg_confidence);
        info!("Returning {} points", track.len());
        Some(track)
    }
}

#[cfg(test)]
mod analysis_test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::constants::Vec3;

    fn spine(timepoint: i32, samples: Vec<f32>, positions: Vec<Vec3>) -> Spine {
        let mut spine = Spine::minimal(timepoint, 1.0, vec![]);
        spine.direction = Vector3::new(0.0, 0.0, 1.0);
        spine.with_samples(samples, positions).unwrap()
    }

    fn two_timepoints() -> Vec<Spine> {
        let p: Vec<Vec3> = (0..3).map(|i| Vector3::new(i as f32, 0.0, 0.0)).collect();
        let q: Vec<Vec3> = (0..3).map(|i| Vector3::new(i as f32, 1.0, 0.0)).collect();
        vec![
            spine(1, vec![0.0, 0.6, 0.0], p),
            spine(0, vec![0.0, 0.5, 0.0], q),
        ]
    }

    #[test]
    fn test_end_to_end() {
        let mut transform = Transform::identity();
        transform[(2, 3)] = 5.0;
        let analysis = HedgehogAnalysis::new(two_timepoints(), transform);

        let track = analysis.run().unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track.positions(), vec![Vector3::new(1.0, 1.0, 0.0)]);
        assert_eq!(track.confidence, 1.0);

        let (_, vertex) = track.iter().next().unwrap();
        assert_eq!(vertex.timepoint, 0);
        assert_eq!(vertex.world_position, Vector3::new(1.0, 1.0, 5.0));
        assert_relative_eq!(vertex.value, 0.16796875, epsilon = 1e-6);

        let initial = track.graph().vertex(vertex.previous.unwrap());
        assert_eq!(initial.timepoint, 1);
        assert_relative_eq!(initial.value, 0.2015625, epsilon = 1e-6);
    }

    #[test]
    fn test_increasing_timepoints_are_trimmed() {
        let p: Vec<Vec3> = (0..3).map(|i| Vector3::new(i as f32, 0.0, 0.0)).collect();
        let q: Vec<Vec3> = (0..3).map(|i| Vector3::new(i as f32, 1.0, 0.0)).collect();
        let spines = vec![
            spine(0, vec![0.0, 0.6, 0.0], p),
            spine(1, vec![0.0, 0.5, 0.0], q),
        ];
        let analysis = HedgehogAnalysis::new(spines, Transform::identity());

        // timepoint 1 comes after the starting timepoint 0, so only the initial vertex is left
        let track = analysis.run().unwrap();
        assert!(track.is_empty());
        assert_eq!(track.graph().len(), 1);
    }

    #[test]
    fn test_run_is_repeatable() {
        let analysis = HedgehogAnalysis::new(two_timepoints(), Transform::identity());
        assert_eq!(analysis.run(), analysis.run());
        assert_eq!(analysis.timepoints().len(), 2);
    }

    #[test]
    fn test_aggregates() {
        let spines = vec![
            Spine::minimal(1, 0.2, vec![0.0]),
            Spine::minimal(1, 0.4, vec![0.0]),
            Spine::minimal(0, 0.9, vec![0.0]),
        ];
        let analysis = HedgehogAnalysis::new(spines, Transform::identity());
        assert_eq!(analysis.total_sample_count(), 3);
        assert_relative_eq!(analysis.avg_confidence(), 0.5);
        assert_eq!(analysis.timepoints().len(), 2);

        let empty = HedgehogAnalysis::new(vec![], Transform::identity());
        assert_eq!(empty.total_sample_count(), 0);
        assert_eq!(empty.avg_confidence(), 0.0);
    }

    #[test]
    fn test_no_track() {
        assert_eq!(
            HedgehogAnalysis::new(vec![], Transform::identity()).run(),
            None
        );

        let empty_first = vec![
            Spine::minimal(1, 1.0, vec![]),
            Spine::minimal(0, 1.0, vec![0.0, 1.0, 0.0]),
        ];
        assert_eq!(
            HedgehogAnalysis::new(empty_first, Transform::identity()).run(),
            None
        );

        let flat = vec![
            Spine::minimal(1, 1.0, vec![0.0, 0.0, 0.0]),
            Spine::minimal(0, 1.0, vec![0.0, 0.001, 0.0]),
        ];
        assert_eq!(
            HedgehogAnalysis::new(flat, Transform::identity()).run(),
            None
        );
    }

    #[test]
    fn test_single_timepoint_gives_empty_track() {
        let analysis = HedgehogAnalysis::new(
            vec![Spine::minimal(0, 1.0, vec![0.0, 0.6, 0.0])],
            Transform::identity(),
        );
        let track = analysis.run().unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn test_with_params_and_span() {
        let params = AnalysisParams::builder().prune_outliers(true).build().unwrap();
        let analysis = HedgehogAnalysis::new(two_timepoints(), Transform::identity())
            .with_params(params.clone())
            .with_span(tracing::info_span!("custom"));
        assert_eq!(analysis.params(), &params);
        // a single edge has no outlier
        assert_eq!(analysis.run().map(|t| t.len()), Some(1));
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HedgehogAnalysis>();
        assert_send_sync::<Track>();
    }
}
