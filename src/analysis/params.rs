//! # Analysis parameters
//!
//! [`AnalysisParams`] gathers the **opt-in** behaviour of a
//! [`HedgehogAnalysis`](crate::analysis::HedgehogAnalysis) run. Thresholds, smoothing
//! kernel and directional cut-off are fixed (see [`constants`](crate::constants)); only
//! the following can be changed:
//!
//! - **Outlier pruning** of the chained path, by absolute edge length and by edge-length
//!   z-score. Disabled by default: its interaction with the directional filter of the
//!   finalization has not been validated on recorded sessions.
//! - **Parallel conditioning** of the spines (requires the `parallel` feature).
//!
//! ## Example
//!
//! ```rust
//! use hedgehog::analysis::params::AnalysisParams;
//!
//! let params = AnalysisParams::builder()
//!     .prune_outliers(true)
//!     .too_far_factor(4.0)
//!     .zscore_threshold(2.5)
//!     .build()
//!     .unwrap();
//! assert!(params.prune_outliers);
//! ```
use std::cmp::Ordering::Greater;

use crate::hedgehog_errors::HedgehogError;

/// Opt-in configuration of a hedgehog analysis.
///
/// Fields
/// -----------------
/// * `prune_outliers` – run the pruning stage after chaining.
/// * `too_far_factor` – a path vertex whose edge is at least `too_far_factor × mean edge length`
///   is dropped (pruning stage, first pass).
/// * `zscore_threshold` – a path vertex whose edge-length z-score exceeds this value is dropped
///   together with its path neighbours (pruning stage, second pass).
/// * `parallel_conditioning` – condition spines on the rayon thread pool. Ignored when the crate
///   is built without the `parallel` feature. The result does not depend on this flag.
///
/// Defaults
/// -----------------
/// * `prune_outliers`: false
/// * `too_far_factor`: 5.0
/// * `zscore_threshold`: 2.0
/// * `parallel_conditioning`: false
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub prune_outliers: bool,
    pub too_far_factor: f32,
    pub zscore_threshold: f32,
    pub parallel_conditioning: bool,
}

impl AnalysisParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AnalysisParamsBuilder {
        AnalysisParamsBuilder::new()
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            prune_outliers: false,
            too_far_factor: 5.0,
            zscore_threshold: 2.0,
            parallel_conditioning: false,
        }
    }
}

/// Builder for [`AnalysisParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct AnalysisParamsBuilder {
    params: AnalysisParams,
}

impl AnalysisParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: AnalysisParams::default(),
        }
    }

    pub fn prune_outliers(mut self, v: bool) -> Self {
        self.params.prune_outliers = v;
        self
    }
    pub fn too_far_factor(mut self, v: f32) -> Self {
        self.params.too_far_factor = v;
        self
    }
    pub fn zscore_threshold(mut self, v: f32) -> Self {
        self.params.zscore_threshold = v;
        self
    }
    pub fn parallel_conditioning(mut self, v: bool) -> Self {
        self.params.parallel_conditioning = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f32) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `too_far_factor > 0.0` (NaN rejected)
    /// * `zscore_threshold > 0.0` (NaN rejected)
    ///
    /// Returns
    /// -----------------
    /// * `Ok(AnalysisParams)` or [`HedgehogError::InvalidAnalysisParams`].
    pub fn build(self) -> Result<AnalysisParams, HedgehogError> {
        let p = &self.params;
        if !Self::gt0(p.too_far_factor) {
            return Err(HedgehogError::InvalidAnalysisParams(format!(
                "too_far_factor must be > 0 (got {})",
                p.too_far_factor
            )));
        }
        if !Self::gt0(p.zscore_threshold) {
            return Err(HedgehogError::InvalidAnalysisParams(format!(
                "zscore_threshold must be > 0 (got {})",
                p.zscore_threshold
            )));
        }
        Ok(self.params)
    }
}
