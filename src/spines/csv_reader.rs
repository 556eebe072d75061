//! # Spine CSV reader
//!
//! Parse a delimited text table into an ordered list of [`Spine`]s.
//!
//! ## Overview
//! -----------------
//! The hedgehog recorder produces two layouts, described here by a single
//! [`SpineCsvFormat`] descriptor (schema + separator) and read by one parser:
//!
//! **Minimal schema** ([`SpineSchema::Minimal`], default separator `,`)
//! ```text
//! timepoint, confidence, sample_0, …, sample_n
//! ```
//! Pose and ray fields are unavailable; they default to zero vectors and an identity
//! head orientation.
//!
//! **Full schema** ([`SpineSchema::Full`], default separator `;`)
//! ```text
//! timepoint, origin, direction, localEntry, localExit, localDirection,
//! headPosition, headOrientation, position, confidence, sample_0, …, sample_n
//! ```
//! Vector columns hold whitespace-separated components in parentheses, `(x y z)`;
//! the head orientation is a quaternion `(x y z w)`. A vector whose first component
//! is the literal `+Inf` or `-Inf` decodes to the zero vector (rays that missed the
//! volume are recorded that way).
//!
//! Sample positions are not stored in either layout: they are derived by marching
//! along the local ray (see [`Spine::with_marched_samples`]).
//!
//! ## Contract
//! -----------------
//! * The first line is a header and is skipped, whatever its content.
//! * `N` data lines yield exactly `N` spines, in file order.
//! * A single trailing empty field (trailing separator) is ignored.
//! * Any malformed field aborts the whole read with
//!   [`HedgehogError::SpineParse`], carrying the 1-based line number and a
//!   [`ParseSpineError`]. No partial result is returned.
//!
//! ## See also
//! ------------
//! * [`HedgehogAnalysis::from_csv`](crate::analysis::HedgehogAnalysis::from_csv) and siblings – Load and analyze in one call.
//! * [`write_hedgehog_csv`](crate::spines::writer::write_hedgehog_csv) – Writes the full schema.
use std::{fs::File, io::Read};

use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord};
use nalgebra::Quaternion;
use thiserror::Error;

use crate::{
    constants::{Quat, Timepoint, Vec3, FULL_SEPARATOR, MINIMAL_SEPARATOR},
    hedgehog_errors::HedgehogError,
    spines::Spine,
};

/// Field-level parsing errors for one spine line.
///
/// Variants
/// -----------------
/// * `MissingColumn` – The line holds fewer fields than the schema's fixed columns.
/// * `InvalidTimepoint` – The timepoint field is not an integer.
/// * `InvalidConfidence` – The confidence field is not a float.
/// * `InvalidSample` – A sample field is not a float; carries the sample index.
/// * `InvalidVector` – A vector field is neither `±Inf` nor three floats.
/// * `InvalidQuaternion` – The head orientation is not four floats.
#[derive(Error, Debug, PartialEq)]
pub enum ParseSpineError {
    #[error("Expected at least {expected} columns, found {found}")]
    MissingColumn { expected: usize, found: usize },
    #[error("Invalid timepoint: {0}")]
    InvalidTimepoint(String),
    #[error("Invalid confidence: {0}")]
    InvalidConfidence(String),
    #[error("Invalid sample #{index}: {value}")]
    InvalidSample { index: usize, value: String },
    #[error("Invalid vector: {0}")]
    InvalidVector(String),
    #[error("Invalid quaternion: {0}")]
    InvalidQuaternion(String),
}

/// Column layout of a spine CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpineSchema {
    /// `timepoint, confidence, samples…`
    Minimal,
    /// `timepoint, 8 pose/ray columns, confidence, samples…`
    Full,
}

impl SpineSchema {
    /// Number of columns in front of the samples.
    pub fn fixed_columns(&self) -> usize {
        match self {
            SpineSchema::Minimal => 2,
            SpineSchema::Full => 10,
        }
    }

    /// Separator used by the recorder for this layout.
    pub fn default_separator(&self) -> u8 {
        match self {
            SpineSchema::Minimal => MINIMAL_SEPARATOR,
            SpineSchema::Full => FULL_SEPARATOR,
        }
    }
}

/// Schema descriptor handed to the parser: which layout, which separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpineCsvFormat {
    pub schema: SpineSchema,
    pub separator: u8,
}

impl SpineCsvFormat {
    pub fn new(schema: SpineSchema) -> Self {
        SpineCsvFormat {
            schema,
            separator: schema.default_separator(),
        }
    }

    pub fn minimal() -> Self {
        Self::new(SpineSchema::Minimal)
    }

    pub fn full() -> Self {
        Self::new(SpineSchema::Full)
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }
}

/// Decode a `(x y z)` vector token.
///
/// A first component equal to `+Inf` or `-Inf` gives the zero vector.
pub(crate) fn parse_vector(token: &str) -> Result<Vec3, ParseSpineError> {
    let components = split_components(token);

    if matches!(components.first(), Some(&"+Inf") | Some(&"-Inf")) {
        return Ok(Vec3::zeros());
    }

    let invalid = || ParseSpineError::InvalidVector(token.trim().to_string());
    if components.len() != 3 {
        return Err(invalid());
    }

    let mut xyz = [0.0f32; 3];
    for (slot, c) in xyz.iter_mut().zip(&components) {
        *slot = c.parse().map_err(|_| invalid())?;
    }
    Ok(Vec3::new(xyz[0], xyz[1], xyz[2]))
}

/// Decode a `(x y z w)` quaternion token.
pub(crate) fn parse_quaternion(token: &str) -> Result<Quat, ParseSpineError> {
    let components = split_components(token);
    let invalid = || ParseSpineError::InvalidQuaternion(token.trim().to_string());
    if components.len() != 4 {
        return Err(invalid());
    }

    let mut xyzw = [0.0f32; 4];
    for (slot, c) in xyzw.iter_mut().zip(&components) {
        *slot = c.parse().map_err(|_| invalid())?;
    }
    Ok(Quaternion::new(xyzw[3], xyzw[0], xyzw[1], xyzw[2]))
}

fn split_components(token: &str) -> Vec<&str> {
    token
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split_whitespace()
        .collect()
}

fn parse_samples(fields: &[&str]) -> Result<Vec<f32>, ParseSpineError> {
    let fields = match fields.split_last() {
        Some((last, rest)) if last.trim().is_empty() => rest,
        _ => fields,
    };

    fields
        .iter()
        .enumerate()
        .map(|(index, f)| {
            f.trim()
                .parse::<f32>()
                .map_err(|_| ParseSpineError::InvalidSample {
                    index,
                    value: f.to_string(),
                })
        })
        .collect()
}

/// Parse one data record according to `schema`.
fn parse_record(record: &StringRecord, schema: SpineSchema) -> Result<Spine, ParseSpineError> {
    let fields: Vec<&str> = record.iter().collect();
    let expected = schema.fixed_columns();
    if fields.len() < expected {
        return Err(ParseSpineError::MissingColumn {
            expected,
            found: fields.len(),
        });
    }

    let timepoint: Timepoint = fields[0]
        .trim()
        .parse()
        .map_err(|_| ParseSpineError::InvalidTimepoint(fields[0].to_string()))?;

    let confidence_field = fields[expected - 1];
    let confidence: f32 = confidence_field
        .trim()
        .parse()
        .map_err(|_| ParseSpineError::InvalidConfidence(confidence_field.to_string()))?;

    let samples = parse_samples(&fields[expected..])?;

    match schema {
        SpineSchema::Minimal => Ok(Spine::minimal(timepoint, confidence, samples)),
        SpineSchema::Full => {
            let mut spine = Spine::minimal(timepoint, confidence, Vec::new());
            spine.origin = parse_vector(fields[1])?;
            spine.direction = parse_vector(fields[2])?;
            spine.local_entry = parse_vector(fields[3])?;
            spine.local_exit = parse_vector(fields[4])?;
            spine.local_direction = parse_vector(fields[5])?;
            spine.head_position = parse_vector(fields[6])?;
            spine.head_orientation = parse_quaternion(fields[7])?;
            spine.position = parse_vector(fields[8])?;
            Ok(spine.with_marched_samples(samples))
        }
    }
}

/// Read spines from any byte source.
///
/// Arguments
/// -----------------
/// * `reader`: the CSV content, header line included.
/// * `format`: the schema and separator to apply.
///
/// Return
/// ----------
/// * The spines in input order, or the first error met.
pub fn read_spines_from_reader<R: Read>(
    reader: R,
    format: &SpineCsvFormat,
) -> Result<Vec<Spine>, HedgehogError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(format.separator)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut spines = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let spine = parse_record(&record, format.schema)
            .map_err(|source| HedgehogError::SpineParse { line, source })?;
        spines.push(spine);
    }
    Ok(spines)
}

/// Read spines from a CSV file.
///
/// See [`read_spines_from_reader`] for the parsing contract.
pub fn read_spines(path: &Utf8Path, format: &SpineCsvFormat) -> Result<Vec<Spine>, HedgehogError> {
    let file = File::open(path)?;
    read_spines_from_reader(file, format)
}
