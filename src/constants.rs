//! # Constants and type definitions for Hedgehog
//!
//! This module centralizes the **fixed algorithm constants** and the **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Smoothing kernel and iteration count used by signal conditioning
//! - Threshold derivation factors applied to the first recorded spine
//! - Directional-consistency cut-off used during finalization
//! - Default separators of the spine CSV schemas
//! - Core type aliases (timepoints, vectors, transforms)
//!
//! These values are deliberately not runtime-tunable: the only opt-in behaviour
//! lives in [`AnalysisParams`](crate::analysis::params::AnalysisParams).

use nalgebra::{Matrix4, Quaternion, Vector3};

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Integer grouping key of a spine (the volume timepoint at capture time).
pub type Timepoint = i32;

/// Single-precision 3D vector, used for every position and direction.
pub type Vec3 = Vector3<f32>;

/// Single-precision rotation (head orientation).
pub type Quat = Quaternion<f32>;

/// Homogeneous local-to-world transform.
pub type Transform = Matrix4<f32>;

// -------------------------------------------------------------------------------------------------
// Signal conditioning
// -------------------------------------------------------------------------------------------------

/// 3-tap smoothing kernel applied to interior samples.
pub const SMOOTHING_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

/// Number of smoothing passes applied before local-maximum extraction.
pub const SMOOTHING_ITERATIONS: usize = 4;

/// Weight of the boundary sample itself in the asymmetric edge rule.
pub const EDGE_SELF_WEIGHT: f32 = 0.75;

/// Weight of the single inner neighbour in the asymmetric edge rule.
pub const EDGE_NEIGHBOUR_WEIGHT: f32 = 0.25;

/// Fraction of the smoothed ray maximum a peak must exceed to count as a spot.
pub const PROMINENT_PEAK_FRACTION: f32 = 0.2;

// -------------------------------------------------------------------------------------------------
// Thresholds
// -------------------------------------------------------------------------------------------------

/// `starting_threshold = min(samples) * STARTING_MIN_FACTOR + STARTING_OFFSET`
pub const STARTING_MIN_FACTOR: f32 = 2.0;

/// Additive noise floor of the starting threshold.
pub const STARTING_OFFSET: f32 = 0.002;

/// `local_max_threshold = max(samples) * LOCAL_MAX_FACTOR`
pub const LOCAL_MAX_FACTOR: f32 = 0.2;

/// Minimal dot product between the directions of two consecutive track vertices.
pub const DIRECTION_CONSISTENCY: f32 = 0.5;

/// Timepoint at which the recording's countdown marker ends the window of interest.
pub const ZERO_TIMEPOINT: Timepoint = 0;

// -------------------------------------------------------------------------------------------------
// Ingestion
// -------------------------------------------------------------------------------------------------

/// Default column separator of the minimal (pose-less) schema.
pub const MINIMAL_SEPARATOR: u8 = b',';

/// Default column separator of the full schemas.
pub const FULL_SEPARATOR: u8 = b';';

/// Header written in front of a hedgehog dump.
pub const HEDGEHOG_HEADER: &str = "Timepoint,Origin,Direction,LocalEntry,LocalExit,LocalDirection,HeadPosition,HeadOrientation,Position,Confidence,Samples";
