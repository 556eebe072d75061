#![allow(dead_code)]

use approx::assert_relative_eq;
use camino::Utf8Path;
use nalgebra::Vector3;

use hedgehog::{constants::Vec3, Spine, Track};

pub const MINIMAL_HEDGEHOG: &str = "tests/data/minimal_hedgehog.csv";
pub const FULL_HEDGEHOG: &str = "tests/data/full_hedgehog.csv";
pub const MALFORMED_HEDGEHOG: &str = "tests/data/malformed_hedgehog.csv";

pub fn data_path(path: &str) -> &Utf8Path {
    Utf8Path::new(path)
}

/// A spine looking along +z whose samples are laid out along x from `entry`.
pub fn ray_spine(timepoint: i32, confidence: f32, entry: Vec3, samples: Vec<f32>) -> Spine {
    let mut spine = Spine::minimal(timepoint, confidence, vec![]);
    spine.direction = Vector3::new(0.0, 0.0, 1.0);
    spine.local_entry = entry;
    spine.local_direction = Vector3::new(1.0, 0.0, 0.0);
    spine.with_marched_samples(samples)
}

pub fn assert_track_positions(track: &Track, expected: &[Vec3], epsilon: f32) {
    let positions = track.positions();
    assert_eq!(positions.len(), expected.len(), "track: {track}");
    for (actual, expected) in positions.iter().zip(expected) {
        assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
        assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
        assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
    }
}
