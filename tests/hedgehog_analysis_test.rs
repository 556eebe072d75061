mod common;

use approx::assert_relative_eq;
use nalgebra::Vector3;

use common::{assert_track_positions, data_path, ray_spine, FULL_HEDGEHOG, MINIMAL_HEDGEHOG};
use hedgehog::{
    constants::Transform,
    spines::{csv_reader::SpineCsvFormat, writer::dump_hedgehog},
    AnalysisParams, HedgehogAnalysis, Spine,
};

fn full_track_positions() -> Vec<Vector3<f32>> {
    vec![
        Vector3::new(0.1, 0.0, 0.3),
        Vector3::new(0.2, 0.0, 0.3),
        Vector3::new(0.5, 0.0, 0.3),
    ]
}

#[test]
fn test_minimal_hedgehog_has_no_motion() {
    let analysis = HedgehogAnalysis::from_minimal_csv(data_path(MINIMAL_HEDGEHOG)).unwrap();
    assert_eq!(analysis.total_sample_count(), 6);
    assert_relative_eq!(analysis.avg_confidence(), 4.0 / 6.0, epsilon = 1e-6);

    // every sample sits at the origin, so no edge can be chained
    let track = analysis.run().unwrap();
    assert!(track.is_empty());
}

#[test]
fn test_full_hedgehog() {
    let analysis = HedgehogAnalysis::from_csv(data_path(FULL_HEDGEHOG)).unwrap();
    assert_eq!(analysis.total_sample_count(), 15);

    let track = analysis.run().unwrap();
    assert_relative_eq!(track.confidence, 10.6 / 15.0, epsilon = 1e-6);
    // t=2 looks sideways, which drops t=2 and t=1
    let timepoints: Vec<i32> = track.iter().map(|(_, v)| v.timepoint).collect();
    assert_eq!(timepoints, vec![4, 3, 0]);
    assert_track_positions(&track, &full_track_positions(), 1e-6);

    // the distractor spines are never picked
    assert!(track.iter().all(|(_, v)| v.source.confidence == 0.9));
}

#[test]
fn test_world_transform_keeps_local_positions() {
    let mut transform = Transform::new_scaling(2.0);
    transform[(0, 3)] = -3.0;
    let analysis =
        HedgehogAnalysis::from_csv_with_matrix(data_path(FULL_HEDGEHOG), transform).unwrap();

    let track = analysis.run().unwrap();
    assert_track_positions(&track, &full_track_positions(), 1e-6);

    let (_, first) = track.iter().next().unwrap();
    assert_relative_eq!(first.world_position.x, -2.8, epsilon = 1e-6);
    assert_relative_eq!(first.world_position.z, 0.6, epsilon = 1e-6);
}

#[test]
fn test_pruning_keeps_a_regular_path() {
    let params = AnalysisParams::builder().prune_outliers(true).build().unwrap();
    let analysis = HedgehogAnalysis::from_csv(data_path(FULL_HEDGEHOG))
        .unwrap()
        .with_params(params);

    let track = analysis.run().unwrap();
    assert_track_positions(&track, &full_track_positions(), 1e-6);
}

#[test]
fn test_pruning_removes_a_jump() {
    let peak = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    // the gaze slips away at one timepoint and comes back
    let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 58.0, 8.0, 9.0, 10.0, 11.0];
    let count = xs.len() as i32;
    let spines: Vec<Spine> = xs
        .iter()
        .enumerate()
        .map(|(i, x)| {
            ray_spine(
                count - 1 - i as i32,
                1.0,
                Vector3::new(*x - 3.0, 0.0, 0.0),
                peak.clone(),
            )
        })
        .collect();

    let plain = HedgehogAnalysis::new(spines.clone(), Transform::identity());
    let track = plain.run().unwrap();
    assert_eq!(track.len(), xs.len() - 1);
    assert!(track.positions().iter().any(|p| p.x == 58.0));

    let params = AnalysisParams::builder().prune_outliers(true).build().unwrap();
    let pruned = HedgehogAnalysis::new(spines, Transform::identity()).with_params(params);
    let track = pruned.run().unwrap();
    // both ends of the jump go
    assert_eq!(track.len(), xs.len() - 3);
    assert!(track.positions().iter().all(|p| p.x != 58.0));
    assert_eq!(track.positions().iter().filter(|p| p.x == 8.0).count(), 1);
}

#[test]
fn test_parallel_conditioning_gives_the_same_track() {
    let sequential = HedgehogAnalysis::from_csv(data_path(FULL_HEDGEHOG)).unwrap();
    let params = AnalysisParams::builder()
        .parallel_conditioning(true)
        .build()
        .unwrap();
    let parallel = sequential.clone().with_params(params);
    assert_eq!(sequential.run(), parallel.run());
}

#[test]
fn test_dump_and_reload() {
    let analysis = HedgehogAnalysis::from_csv(data_path(FULL_HEDGEHOG)).unwrap();
    let spines: Vec<Spine> = hedgehog::spines::csv_reader::read_spines(
        data_path(FULL_HEDGEHOG),
        &SpineCsvFormat::full(),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("Hedgehog_1.csv")).unwrap();
    dump_hedgehog(&path, &spines).unwrap();

    let reloaded = HedgehogAnalysis::from_csv(&path).unwrap();
    assert_eq!(reloaded.total_sample_count(), analysis.total_sample_count());
    assert_eq!(reloaded.run(), analysis.run());
}
