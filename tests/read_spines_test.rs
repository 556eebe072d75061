mod common;

use approx::assert_relative_eq;
use nalgebra::Vector3;

use common::{data_path, FULL_HEDGEHOG, MALFORMED_HEDGEHOG, MINIMAL_HEDGEHOG};
use hedgehog::{
    spines::csv_reader::{read_spines, ParseSpineError, SpineCsvFormat},
    HedgehogError,
};

#[test]
fn test_read_minimal_hedgehog() {
    let spines = read_spines(data_path(MINIMAL_HEDGEHOG), &SpineCsvFormat::minimal()).unwrap();
    assert_eq!(spines.len(), 6);

    let timepoints: Vec<i32> = spines.iter().map(|s| s.timepoint).collect();
    assert_eq!(timepoints, vec![3, 2, 2, 1, 0, -1]);

    // the trailing separator does not produce a sample
    assert_eq!(spines[1].samples(), &[0.0, 0.1, 0.9, 0.1, 0.0]);
    assert_eq!(spines[1].confidence, 0.7);
    assert!(spines
        .iter()
        .all(|s| s.sample_positions().iter().all(|p| *p == Vector3::zeros())));
}

#[test]
fn test_read_full_hedgehog() {
    let spines = read_spines(data_path(FULL_HEDGEHOG), &SpineCsvFormat::full()).unwrap();
    assert_eq!(spines.len(), 15);

    let background = &spines[0];
    assert_eq!(background.timepoint, 6);
    assert_eq!(background.origin, Vector3::new(0.0, 1.5, 0.0));
    assert_eq!(background.head_position, Vector3::new(0.0, 1.7, 0.2));
    assert_eq!(background.samples().len(), 7);

    let distractor = &spines[2];
    assert_eq!(distractor.origin, Vector3::zeros());
    assert_eq!(distractor.position, Vector3::zeros());
    assert_eq!(distractor.local_entry, Vector3::new(5.0, 0.0, 0.0));
    assert_eq!(distractor.confidence, 0.5);

    let marched = spines[1].sample_positions()[3];
    assert_relative_eq!(marched.z, 0.3, epsilon = 1e-6);

    // row ending with a separator
    assert_eq!(spines[5].timepoint, 3);
    assert_eq!(spines[5].samples().len(), 7);
}

#[test]
fn test_read_with_wrong_schema() {
    let err = read_spines(data_path(FULL_HEDGEHOG), &SpineCsvFormat::minimal()).unwrap_err();
    // no comma in a full-schema row: one single field
    assert_eq!(
        err,
        HedgehogError::SpineParse {
            line: 2,
            source: ParseSpineError::MissingColumn {
                expected: 2,
                found: 1
            }
        }
    );
}

#[test]
fn test_read_malformed_hedgehog() {
    let err = read_spines(data_path(MALFORMED_HEDGEHOG), &SpineCsvFormat::minimal()).unwrap_err();
    assert_eq!(
        err,
        HedgehogError::SpineParse {
            line: 3,
            source: ParseSpineError::InvalidSample {
                index: 1,
                value: "abc".into()
            }
        }
    );
}

#[test]
fn test_read_missing_file() {
    let err = read_spines(data_path("tests/data/nope.csv"), &SpineCsvFormat::minimal()).unwrap_err();
    assert!(matches!(err, HedgehogError::IoError(_)));
}
