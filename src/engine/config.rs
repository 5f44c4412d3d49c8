// src/engine/config.rs
//
// Pipeline configuration: conversion profile, size limits and the
// threshold above which row kernels go parallel.

use crate::engine::{MAX_DIMENSION, MAX_PIXELS};
use crate::error::PipelineError;
use std::str::FromStr;
use tracing::debug;

/// Frames below this many pixels are converted on the caller's thread.
const DEFAULT_PARALLEL_MIN_PIXELS: u64 = 256 * 256;

const ENV_PROFILE: &str = "FRAME_RESIZE_PROFILE";
const ENV_MAX_DIMENSION: &str = "FRAME_RESIZE_MAX_DIMENSION";
const ENV_MAX_PIXELS: &str = "FRAME_RESIZE_MAX_PIXELS";
const ENV_PARALLEL_MIN_PIXELS: &str = "FRAME_RESIZE_PARALLEL_MIN_PIXELS";

/// Which pixel-format conversions the format stage offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionProfile {
    /// Every target format, BGR included.
    Portable,
    /// Mobile conversion set without an ARGB -> BGR24 routine: requesting
    /// BGR fails with `UnsupportedConversion`.
    Constrained,
}

impl FromStr for ConversionProfile {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portable" => Ok(Self::Portable),
            "constrained" => Ok(Self::Constrained),
            other => Err(PipelineError::invalid_argument(
                "profile",
                other.to_string(),
                "Expected portable or constrained",
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub profile: ConversionProfile,
    pub max_dimension: u32,
    pub max_pixels: u64,
    pub parallel_min_pixels: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::portable()
    }
}

impl PipelineConfig {
    pub fn portable() -> Self {
        Self {
            profile: ConversionProfile::Portable,
            max_dimension: MAX_DIMENSION,
            max_pixels: MAX_PIXELS,
            parallel_min_pixels: DEFAULT_PARALLEL_MIN_PIXELS,
        }
    }

    pub fn constrained() -> Self {
        Self {
            profile: ConversionProfile::Constrained,
            ..Self::portable()
        }
    }

    pub fn with_profile(mut self, profile: ConversionProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn with_parallel_min_pixels(mut self, parallel_min_pixels: u64) -> Self {
        self.parallel_min_pixels = parallel_min_pixels;
        self
    }

    /// Defaults overlaid with `FRAME_RESIZE_*` environment variables.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(profile) = parse_var(&lookup, ENV_PROFILE) {
            config.profile = profile;
        }
        if let Some(max_dimension) = parse_var(&lookup, ENV_MAX_DIMENSION) {
            config.max_dimension = max_dimension;
        }
        if let Some(max_pixels) = parse_var(&lookup, ENV_MAX_PIXELS) {
            config.max_pixels = max_pixels;
        }
        if let Some(min_pixels) = parse_var(&lookup, ENV_PARALLEL_MIN_PIXELS) {
            config.parallel_min_pixels = min_pixels;
        }
        config
    }

    /// Reject frames whose dimensions exceed the configured limits.
    pub fn enforce_dimensions(&self, width: u32, height: u32) -> Result<(), PipelineError> {
        let largest = width.max(height);
        if largest > self.max_dimension {
            return Err(PipelineError::dimension_exceeds_limit(
                largest,
                self.max_dimension,
            ));
        }
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(PipelineError::pixel_count_exceeds_limit(
                pixels,
                self.max_pixels,
            ));
        }
        Ok(())
    }

    pub(crate) fn parallel_for(&self, width: u32, height: u32) -> bool {
        width as u64 * height as u64 >= self.parallel_min_pixels
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(key, value = %raw, "ignoring unparseable configuration value");
            None
        }
    }
}
