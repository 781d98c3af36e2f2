//! src/transforms/vision/mod.rs
//!
//! Randomized vision augmentations for `[C, H, W]` tensors.
//!
//! # Module Organization
//!
//! ```text
//! transforms/vision/
//! ├── dropout.rs    → CoarseDropout (cutout holes), ChannelDropout
//! ├── channel.rs    → ChannelShuffle
//! ├── downscale.rs  → Downscale and its Interpolation modes
//! └── ops.rs        → Tensor operations consuming sampled parameters
//! ```
//!
//! Every transform validates its configuration on construction, samples its
//! parameters through [`crate::params`], and works on any device the input
//! tensor lives on.
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::transforms::{RandomApply, Transform};
//! use crate::transforms::vision::{ChannelShuffle, CoarseDropout, CoarseDropoutConfig, Downscale};
//!
//! let pipeline = RandomApply::new(CoarseDropout::new(CoarseDropoutConfig::default())?, 0.5)?
//!     .then(RandomApply::new(ChannelShuffle, 0.5)?)
//!     .then(RandomApply::new(Downscale::new(0.25, 0.5, "area")?, 0.5)?);
//! ```

pub mod channel;
pub mod downscale;
pub mod dropout;
pub mod ops;

pub use channel::ChannelShuffle;
pub use downscale::{Downscale, DownscaleConfig, Interpolation};
pub use dropout::{ChannelDropout, ChannelDropoutConfig, CoarseDropout, CoarseDropoutConfig};
