//! Configuration types for mapsift runs.
//!
//! This module provides configuration structures that control overlap
//! detection and visibility resolution. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining both sections.
//! - [`OverlapConfig`] - Threshold, parallelism and broad phase of the detector.
//! - [`VisibilityConfig`] - Hide mode and symbol exemption bands of the resolver.
//!
//! # Example
//!
//! ```
//! # use mapsift::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.overlap().min_overlap_area(), 100.0);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use crate::{filter::HideMode, visibility::ExemptionBands};

/// Default report threshold for the overlap metric, in map units squared.
pub const DEFAULT_MIN_OVERLAP_AREA: f64 = 100.0;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Overlap detection section.
    #[serde(default)]
    overlap: OverlapConfig,

    /// Visibility resolution section.
    #[serde(default)]
    visibility: VisibilityConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its two sections.
    pub fn new(overlap: OverlapConfig, visibility: VisibilityConfig) -> Self {
        Self {
            overlap,
            visibility,
        }
    }

    /// Returns the overlap detection configuration.
    pub fn overlap(&self) -> &OverlapConfig {
        &self.overlap
    }

    /// Returns the visibility configuration.
    pub fn visibility(&self) -> &VisibilityConfig {
        &self.visibility
    }

    /// Checks values that deserialize fine but make no sense.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        self.overlap.validate()?;
        self.visibility.validate()
    }
}

/// Overlap detector settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlapConfig {
    /// Pairs are reported when their metric is strictly greater than this.
    #[serde(default = "default_min_overlap_area")]
    min_overlap_area: f64,

    /// Run the narrow phase on the rayon thread pool.
    #[serde(default = "default_parallel")]
    parallel: bool,

    /// Edge length of the uniform-grid broad phase; all-pairs when unset.
    #[serde(default)]
    grid_cell_size: Option<f64>,
}

fn default_min_overlap_area() -> f64 {
    DEFAULT_MIN_OVERLAP_AREA
}

fn default_parallel() -> bool {
    true
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            min_overlap_area: DEFAULT_MIN_OVERLAP_AREA,
            parallel: true,
            grid_cell_size: None,
        }
    }
}

impl OverlapConfig {
    /// Returns the report threshold.
    pub fn min_overlap_area(&self) -> f64 {
        self.min_overlap_area
    }

    /// Returns whether the narrow phase runs in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the grid cell size, if the grid broad phase is enabled.
    pub fn grid_cell_size(&self) -> Option<f64> {
        self.grid_cell_size
    }

    /// Sets the report threshold.
    pub fn with_min_overlap_area(mut self, min_overlap_area: f64) -> Self {
        self.min_overlap_area = min_overlap_area;
        self
    }

    /// Enables or disables the parallel narrow phase.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables the grid broad phase with the given cell size.
    pub fn with_grid_cell_size(mut self, cell_size: f64) -> Self {
        self.grid_cell_size = Some(cell_size);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if !self.min_overlap_area.is_finite() || self.min_overlap_area < 0.0 {
            return Err(format!(
                "overlap.min_overlap_area must be a non-negative number, got {}",
                self.min_overlap_area
            ));
        }
        if let Some(cell_size) = self
            .grid_cell_size
            .filter(|size| !(size.is_finite() && *size > 0.0))
        {
            return Err(format!(
                "overlap.grid_cell_size must be a positive number, got {cell_size}"
            ));
        }
        Ok(())
    }
}

/// Visibility resolver settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisibilityConfig {
    /// What happens to objects selected for hiding.
    #[serde(default)]
    hide_mode: HideMode,

    /// Symbol id bands, exclusive on both ends, whose objects are never hidden.
    #[serde(default = "default_exempt_symbol_ranges")]
    exempt_symbol_ranges: Vec<[i32; 2]>,
}

fn default_exempt_symbol_ranges() -> Vec<[i32; 2]> {
    ExemptionBands::default().bands().to_vec()
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            hide_mode: HideMode::default(),
            exempt_symbol_ranges: default_exempt_symbol_ranges(),
        }
    }
}

impl VisibilityConfig {
    /// Returns the hide mode.
    pub fn hide_mode(&self) -> HideMode {
        self.hide_mode
    }

    /// Returns the configured exemption bands.
    pub fn exemptions(&self) -> ExemptionBands {
        ExemptionBands::new(self.exempt_symbol_ranges.iter().copied())
    }

    /// Sets the hide mode.
    pub fn with_hide_mode(mut self, hide_mode: HideMode) -> Self {
        self.hide_mode = hide_mode;
        self
    }

    fn validate(&self) -> Result<(), String> {
        match self.exempt_symbol_ranges.iter().find(|[low, high]| low > high) {
            Some([low, high]) => Err(format!(
                "visibility.exempt_symbol_ranges contains the inverted band [{low}, {high}]"
            )),
            None => Ok(()),
        }
    }
}
