use crate::error::{ensure_augment, AugmentResult};
use crate::params::{
    sample_channels_to_drop, sample_holes, ChannelDropoutParams, CoarseDropoutParams, HoleRanges,
    ImageShape,
};
use crate::transforms::vision::ops;
use crate::transforms::{RandomizedTransform, Transform};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tch::Tensor;

// ============================================================================
// CoarseDropout
// ============================================================================

/// Settings for [`CoarseDropout`].
///
/// The `min_*` fields default to their `max_*` counterpart when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoarseDropoutConfig {
    pub max_holes: usize,
    pub max_height: usize,
    pub max_width: usize,
    pub min_holes: Option<usize>,
    pub min_height: Option<usize>,
    pub min_width: Option<usize>,
    pub fill_value: f64,
}

impl Default for CoarseDropoutConfig {
    fn default() -> Self {
        Self {
            max_holes: 8,
            max_height: 8,
            max_width: 8,
            min_holes: None,
            min_height: None,
            min_width: None,
            fill_value: 0.0,
        }
    }
}

/// Blanks out a random number of rectangles of random size.
///
/// # Example
/// ```ignore
/// let cutout = CoarseDropout::new(CoarseDropoutConfig {
///     max_holes: 4,
///     max_height: 16,
///     max_width: 16,
///     min_holes: Some(1),
///     ..Default::default()
/// })?;
/// let augmented = cutout.apply(image)?;
/// ```
#[derive(Debug, Clone)]
pub struct CoarseDropout {
    ranges: HoleRanges,
    fill_value: f64,
}

impl CoarseDropout {
    pub fn new(config: CoarseDropoutConfig) -> AugmentResult<Self> {
        let ranges = HoleRanges::new(
            config.min_holes.unwrap_or(config.max_holes),
            config.max_holes,
            config.min_height.unwrap_or(config.max_height),
            config.max_height,
            config.min_width.unwrap_or(config.max_width),
            config.max_width,
        );
        ranges.validate()?;
        Ok(Self {
            ranges,
            fill_value: config.fill_value,
        })
    }

    pub fn ranges(&self) -> &HoleRanges {
        &self.ranges
    }
}

impl RandomizedTransform for CoarseDropout {
    type Params = CoarseDropoutParams;

    fn sample_params<R: Rng + ?Sized>(
        &self,
        shape: ImageShape,
        rng: &mut R,
    ) -> AugmentResult<CoarseDropoutParams> {
        sample_holes(shape, &self.ranges, rng)
    }

    fn apply_params(&self, image: &Tensor, params: &CoarseDropoutParams) -> Result<Tensor> {
        ops::cutout(image, &params.holes, self.fill_value)
    }
}

impl Transform<Tensor, Tensor> for CoarseDropout {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        self.apply_random(image)
    }
}

// ============================================================================
// ChannelDropout
// ============================================================================

/// Settings for [`ChannelDropout`]. `channel_drop_range` is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelDropoutConfig {
    pub channel_drop_range: (usize, usize),
    pub fill_value: f64,
}

impl Default for ChannelDropoutConfig {
    fn default() -> Self {
        Self {
            channel_drop_range: (1, 1),
            fill_value: 0.0,
        }
    }
}

/// Fills a random subset of channels with a constant.
///
/// Whether `max_channels` leaves at least one channel intact depends on the
/// image, so that check happens per image in `sample_params`.
#[derive(Debug, Clone)]
pub struct ChannelDropout {
    min_channels: usize,
    max_channels: usize,
    fill_value: f64,
}

impl ChannelDropout {
    pub fn new(config: ChannelDropoutConfig) -> AugmentResult<Self> {
        let (min_channels, max_channels) = config.channel_drop_range;
        ensure_augment!(
            1 <= min_channels && min_channels <= max_channels,
            Configuration,
            "Invalid channel_drop_range. Got: ({}, {})",
            min_channels,
            max_channels
        );
        Ok(Self {
            min_channels,
            max_channels,
            fill_value: config.fill_value,
        })
    }
}

impl RandomizedTransform for ChannelDropout {
    type Params = ChannelDropoutParams;

    fn sample_params<R: Rng + ?Sized>(
        &self,
        shape: ImageShape,
        rng: &mut R,
    ) -> AugmentResult<ChannelDropoutParams> {
        sample_channels_to_drop(shape.channels, self.min_channels, self.max_channels, rng)
    }

    fn apply_params(&self, image: &Tensor, params: &ChannelDropoutParams) -> Result<Tensor> {
        ops::channel_dropout(image, &params.channels_to_drop, self.fill_value)
    }
}

impl Transform<Tensor, Tensor> for ChannelDropout {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        self.apply_random(image)
    }
}
