use crate::error::{AugmentError, AugmentResult};
use crate::params::{sample_downscale, validate_scale_range, DownscaleParams, ImageShape};
use crate::transforms::vision::ops;
use crate::transforms::{RandomizedTransform, Transform};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tch::Tensor;

// ============================================================================
// Interpolation
// ============================================================================

/// Resampling mode used to shrink and restore the image.
///
/// | Name       | Operation                   |
/// |------------|-----------------------------|
/// | `nearest`  | nearest neighbour           |
/// | `bilinear` | bilinear, corners unaligned |
/// | `bicubic`  | bicubic, corners unaligned  |
/// | `area`     | adaptive average pooling    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Area,
}

impl Interpolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Area => "area",
        }
    }
}

impl FromStr for Interpolation {
    type Err = AugmentError;

    fn from_str(name: &str) -> AugmentResult<Self> {
        match name {
            "nearest" => Ok(Interpolation::Nearest),
            "bilinear" => Ok(Interpolation::Bilinear),
            "bicubic" => Ok(Interpolation::Bicubic),
            "area" => Ok(Interpolation::Area),
            other => Err(AugmentError::Configuration(format!(
                "Unsupported interpolation mode, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Downscale
// ============================================================================

/// Settings for [`Downscale`]. `interpolation` is one of
/// `nearest`, `bilinear`, `bicubic` or `area`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownscaleConfig {
    pub scale_min: f64,
    pub scale_max: f64,
    pub interpolation: String,
}

impl Default for DownscaleConfig {
    fn default() -> Self {
        Self {
            scale_min: 0.25,
            scale_max: 0.25,
            interpolation: Interpolation::Nearest.as_str().to_string(),
        }
    }
}

/// Decreases image quality by downscaling and upscaling back.
///
/// # Example
/// ```ignore
/// let downscale = Downscale::new(0.25, 0.5, "bilinear")?;
/// let degraded = downscale.apply(image)?;
/// ```
#[derive(Debug, Clone)]
pub struct Downscale {
    scale_min: f64,
    scale_max: f64,
    interpolation: Interpolation,
}

impl Downscale {
    /// Fails with `AugmentError::Configuration` unless
    /// `0 < scale_min <= scale_max < 1` and the interpolation name is known.
    pub fn new(scale_min: f64, scale_max: f64, interpolation: &str) -> AugmentResult<Self> {
        validate_scale_range(scale_min, scale_max)?;
        Ok(Self {
            scale_min,
            scale_max,
            interpolation: interpolation.parse()?,
        })
    }

    pub fn from_config(config: &DownscaleConfig) -> AugmentResult<Self> {
        Self::new(config.scale_min, config.scale_max, &config.interpolation)
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

impl RandomizedTransform for Downscale {
    type Params = DownscaleParams;

    fn sample_params<R: Rng + ?Sized>(
        &self,
        _shape: ImageShape,
        rng: &mut R,
    ) -> AugmentResult<DownscaleParams> {
        sample_downscale(self.scale_min, self.scale_max, self.interpolation, rng)
    }

    fn apply_params(&self, image: &Tensor, params: &DownscaleParams) -> Result<Tensor> {
        ops::downscale(image, params.scale, params.interpolation)
    }
}

impl Transform<Tensor, Tensor> for Downscale {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        self.apply_random(image)
    }
}
