//! src/config.rs
//!
//! Declarative pipeline configuration.
//!
//! A pipeline is described as an ordered list of transforms, each tagged by
//! `"type"`. Transform settings live under `"config"`; omitted settings take
//! the transform's defaults. `p` is optional and, when present, wraps the
//! step in a [`RandomApply`]. Unknown keys are rejected at every level.
//!
//! ```json
//! {
//!   "transforms": [
//!     { "type": "CoarseDropout", "config": { "max_holes": 4, "max_height": 16, "max_width": 16, "min_holes": 1 }, "p": 0.5 },
//!     { "type": "ChannelDropout", "config": { "channel_drop_range": [1, 2] } },
//!     { "type": "ChannelShuffle", "p": 0.3 },
//!     { "type": "Downscale", "config": { "scale_min": 0.25, "scale_max": 0.5, "interpolation": "area" }, "p": 0.2 }
//!   ]
//! }
//! ```
//!
//! Example:
//! ```ignore
//! let pipeline = PipelineConfig::from_json_file("augment.json")?.build()?;
//! let augmented = pipeline.apply(image)?;
//! ```

use crate::transforms::vision::{
    ChannelDropout, ChannelDropoutConfig, ChannelShuffle, CoarseDropout, CoarseDropoutConfig,
    Downscale, DownscaleConfig,
};
use crate::transforms::{Compose, RandomApply, Transform};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tch::Tensor;

/// One step of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum TransformConfig {
    CoarseDropout {
        #[serde(default)]
        config: CoarseDropoutConfig,
        #[serde(default)]
        p: Option<f64>,
    },
    ChannelDropout {
        #[serde(default)]
        config: ChannelDropoutConfig,
        #[serde(default)]
        p: Option<f64>,
    },
    ChannelShuffle {
        #[serde(default)]
        p: Option<f64>,
    },
    Downscale {
        #[serde(default)]
        config: DownscaleConfig,
        #[serde(default)]
        p: Option<f64>,
    },
}

impl TransformConfig {
    pub fn name(&self) -> &'static str {
        match self {
            TransformConfig::CoarseDropout { .. } => "CoarseDropout",
            TransformConfig::ChannelDropout { .. } => "ChannelDropout",
            TransformConfig::ChannelShuffle { .. } => "ChannelShuffle",
            TransformConfig::Downscale { .. } => "Downscale",
        }
    }

    pub fn p(&self) -> Option<f64> {
        match self {
            TransformConfig::CoarseDropout { p, .. }
            | TransformConfig::ChannelDropout { p, .. }
            | TransformConfig::ChannelShuffle { p }
            | TransformConfig::Downscale { p, .. } => *p,
        }
    }

    /// Builds the transform, wrapped in `RandomApply` when `p` is set.
    pub fn build(&self) -> Result<Box<dyn Transform<Tensor, Tensor>>> {
        let step: Box<dyn Transform<Tensor, Tensor>> = match self {
            TransformConfig::CoarseDropout { config, .. } => {
                gate(CoarseDropout::new(config.clone())?, self.p())?
            }
            TransformConfig::ChannelDropout { config, .. } => {
                gate(ChannelDropout::new(config.clone())?, self.p())?
            }
            TransformConfig::ChannelShuffle { .. } => gate(ChannelShuffle, self.p())?,
            TransformConfig::Downscale { config, .. } => {
                gate(Downscale::from_config(config)?, self.p())?
            }
        };
        Ok(step)
    }
}

fn gate<T>(transform: T, p: Option<f64>) -> Result<Box<dyn Transform<Tensor, Tensor>>>
where
    T: Transform<Tensor, Tensor> + 'static,
{
    Ok(match p {
        Some(p) => Box::new(RandomApply::new(transform, p)?),
        None => Box::new(transform),
    })
}

/// Ordered list of transform steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub transforms: Vec<TransformConfig>,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse pipeline configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline configuration {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("In {}", path.display()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline configuration")
    }

    /// Validates every step and assembles them into a [`Compose`].
    pub fn build(&self) -> Result<Compose> {
        let mut compose = Compose::new();
        for (i, step) in self.transforms.iter().enumerate() {
            let transform = step
                .build()
                .with_context(|| format!("Invalid {} at position {}", step.name(), i))?;
            compose.push_boxed(transform);
        }
        tracing::debug!(
            steps = compose.len(),
            names = ?self.transforms.iter().map(TransformConfig::name).collect::<Vec<_>>(),
            "built augmentation pipeline"
        );
        Ok(compose)
    }
}
