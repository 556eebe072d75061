//! # Signal conditioning along a spine
//!
//! Pure helpers turning the raw intensities sampled along a gaze ray into a short list
//! of peaks, i.e. the places along the ray where the user may have been looking at
//! something.
//!
//! ## Smoothing
//! -----------------
//! [`gauss_smoothing`] applies the 3-tap kernel `[0.25, 0.5, 0.25]` to every interior
//! sample. The two boundary samples use an asymmetric rule instead of a reflection:
//!
//! ```text
//! s'[0]   = 0.75·s[0]   + 0.25·s[1]
//! s'[n-1] = 0.25·s[n-2] + 0.75·s[n-1]
//! ```
//!
//! The rule changes which points qualify as local maxima near the ends of the ray, so
//! it must not be replaced by a generic edge policy.
//!
//! ## Peaks
//! -----------------
//! [`local_maxima`] reports the centre of every 3-sample window that is strictly larger
//! than both of its neighbours. Plateaus and monotonic runs produce nothing.
//!
//! [`first_prominent_maximum`] combines both steps to pick a single spot along one ray.
use itertools::Itertools;

use crate::constants::{
    Vec3, EDGE_NEIGHBOUR_WEIGHT, EDGE_SELF_WEIGHT, PROMINENT_PEAK_FRACTION, SMOOTHING_ITERATIONS,
    SMOOTHING_KERNEL,
};

/// Smooth `samples` with the fixed 3-tap kernel, `iterations` times.
///
/// Arguments
/// -----------------
/// * `samples`: the raw intensities.
/// * `iterations`: number of smoothing passes.
///
/// Return
/// ----------
/// * A new vector of the same length. Sequences with fewer than two samples are
///   returned unchanged, the boundary rule needing two values.
pub fn gauss_smoothing(samples: &[f32], iterations: usize) -> Vec<f32> {
    let mut smoothed = samples.to_vec();
    let n = smoothed.len();
    if n < 2 {
        return smoothed;
    }

    let [k0, k1, k2] = SMOOTHING_KERNEL;
    for _ in 0..iterations {
        let mut next = Vec::with_capacity(n);
        next.push(smoothed[0] * EDGE_SELF_WEIGHT + smoothed[1] * EDGE_NEIGHBOUR_WEIGHT);
        next.extend(
            smoothed
                .iter()
                .tuple_windows()
                .map(|(l, c, r)| k0 * l + k1 * c + k2 * r),
        );
        next.push(smoothed[n - 2] * EDGE_NEIGHBOUR_WEIGHT + smoothed[n - 1] * EDGE_SELF_WEIGHT);
        smoothed = next;
    }
    smoothed
}

/// Indices and values of the strict local maxima of `values`, in order.
pub fn local_maxima(values: &[f32]) -> Vec<(usize, f32)> {
    values
        .iter()
        .tuple_windows()
        .enumerate()
        .filter_map(|(i, (&left, &center, &right))| {
            (left < center && center > right).then_some((i + 1, center))
        })
        .collect()
}

/// First peak of the smoothed ray that stands out of the noise.
///
/// The samples are smoothed with the default number of passes; the first local maximum
/// whose value exceeds a fixed fraction of the smoothed maximum is returned together
/// with its position.
///
/// Arguments
/// -----------------
/// * `samples`: raw intensities along the ray.
/// * `positions`: position of each sample, same length as `samples`.
///
/// Return
/// ----------
/// * `Some((index, position))` of the selected peak, `None` if no peak qualifies.
pub fn first_prominent_maximum(samples: &[f32], positions: &[Vec3]) -> Option<(usize, Vec3)> {
    let smoothed = gauss_smoothing(samples, SMOOTHING_ITERATIONS);
    let ray_max = smoothed.iter().copied().reduce(f32::max)?;

    local_maxima(&smoothed)
        .into_iter()
        .find(|(_, v)| *v > PROMINENT_PEAK_FRACTION * ray_max)
        .and_then(|(index, _)| positions.get(index).map(|p| (index, *p)))
}
