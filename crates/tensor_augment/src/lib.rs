//! Randomized image augmentations for `tch` tensors.
//!
//! ```text
//!   config (JSON) ──build──► Compose ──► [RandomApply] ──► transform
//!                                                            │
//!                       image shape + worker RNG ──► params::sample_*
//!                                                            │
//!                                     parameter bundle ──► vision::ops
//! ```

pub mod config;
pub mod error;
pub mod params;
pub mod rng;
pub mod transforms;

pub use config::{PipelineConfig, TransformConfig};
pub use error::{AugmentError, AugmentResult};
pub use params::ImageShape;
pub use rng::init_worker_rng;
pub use transforms::{Compose, RandomApply, RandomizedTransform, Transform};
