//! src/params.rs
//!
//! Random parameter sampling for the augmentation transforms.
//!
//! Every function here is a pure function of its configuration, the image
//! shape and the random source passed in. The resulting bundle is consumed
//! once by the matching `apply_params` and then dropped.
//!
//! ```ignore
//! let mut rng = StdRng::seed_from_u64(42);
//! let shape = ImageShape::new(3, 32, 32);
//! let holes = sample_holes(shape, &HoleRanges::new(1, 4, 2, 8, 2, 8), &mut rng)?;
//! ```

use crate::error::{ensure_augment, AugmentResult};
use crate::transforms::vision::Interpolation;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use tch::Tensor;

// ============================================================================
// ImageShape
// ============================================================================

/// Channel-first image dimensions `[C, H, W]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl ImageShape {
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }

    /// Reads the shape of a `[C, H, W]` tensor.
    pub fn of(image: &Tensor) -> AugmentResult<Self> {
        let size = image.size();
        ensure_augment!(
            size.len() == 3,
            Unsupported,
            "expected a 3D image tensor [C, H, W], got shape {:?}",
            size
        );
        Ok(Self::new(size[0] as usize, size[1] as usize, size[2] as usize))
    }
}

// ============================================================================
// Hole-region sampling
// ============================================================================

/// Inclusive ranges for cutout-style hole sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleRanges {
    pub min_holes: usize,
    pub max_holes: usize,
    pub min_height: usize,
    pub max_height: usize,
    pub min_width: usize,
    pub max_width: usize,
}

impl HoleRanges {
    pub fn new(
        min_holes: usize,
        max_holes: usize,
        min_height: usize,
        max_height: usize,
        min_width: usize,
        max_width: usize,
    ) -> Self {
        Self {
            min_holes,
            max_holes,
            min_height,
            max_height,
            min_width,
            max_width,
        }
    }

    /// Checks `1 <= min <= max` for the count and both side lengths.
    pub fn validate(&self) -> AugmentResult<()> {
        for (name, min, max) in [
            ("holes", self.min_holes, self.max_holes),
            ("height", self.min_height, self.max_height),
            ("width", self.min_width, self.max_width),
        ] {
            ensure_augment!(
                0 < min && min <= max,
                Configuration,
                "expected 0 < min_{name} <= max_{name}, got min_{name}={min}, max_{name}={max}"
            );
        }
        Ok(())
    }
}

/// Axis-aligned rectangle, half-open: covers columns `x1..x2`, rows `y1..y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hole {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Hole {
    pub fn width(&self) -> usize {
        self.x2 - self.x1
    }

    pub fn height(&self) -> usize {
        self.y2 - self.y1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoarseDropoutParams {
    pub holes: Vec<Hole>,
}

/// Draws a hole count, then each hole's size and top-left corner so the hole
/// fits inside the image.
///
/// A hole larger than the image is an error; sizes are never clamped.
pub fn sample_holes<R: Rng + ?Sized>(
    shape: ImageShape,
    ranges: &HoleRanges,
    rng: &mut R,
) -> AugmentResult<CoarseDropoutParams> {
    ranges.validate()?;

    let num_holes = rng.random_range(ranges.min_holes..=ranges.max_holes);
    let mut holes = Vec::with_capacity(num_holes);

    for _ in 0..num_holes {
        let hole_height = rng.random_range(ranges.min_height..=ranges.max_height);
        let hole_width = rng.random_range(ranges.min_width..=ranges.max_width);

        ensure_augment!(
            hole_height <= shape.height && hole_width <= shape.width,
            ConstraintViolation,
            "hole of {}x{} (HxW) does not fit in a {}x{} image",
            hole_height,
            hole_width,
            shape.height,
            shape.width
        );

        let y1 = rng.random_range(0..=shape.height - hole_height);
        let x1 = rng.random_range(0..=shape.width - hole_width);
        holes.push(Hole {
            x1,
            y1,
            x2: x1 + hole_width,
            y2: y1 + hole_height,
        });
    }

    tracing::trace!(?shape, ?holes, "sampled cutout holes");
    Ok(CoarseDropoutParams { holes })
}

// ============================================================================
// Channel-drop sampling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDropoutParams {
    pub channels_to_drop: Vec<usize>,
}

/// Picks between `min_channels` and `max_channels` distinct channel indices.
///
/// # Errors
/// - `Unsupported` for single-channel images.
/// - `Configuration` when `max_channels >= num_channels` (would drop everything)
///   or when `min_channels > max_channels`.
pub fn sample_channels_to_drop<R: Rng + ?Sized>(
    num_channels: usize,
    min_channels: usize,
    max_channels: usize,
    rng: &mut R,
) -> AugmentResult<ChannelDropoutParams> {
    ensure_augment!(
        num_channels != 1,
        Unsupported,
        "image has one channel, channel dropout is not defined"
    );
    ensure_augment!(
        max_channels < num_channels,
        Configuration,
        "cannot drop all channels: max_channels={} with {} channels",
        max_channels,
        num_channels
    );
    ensure_augment!(
        min_channels <= max_channels,
        Configuration,
        "expected min_channels <= max_channels, got {} > {}",
        min_channels,
        max_channels
    );

    let num_drop = rng.random_range(min_channels..=max_channels);
    let channels_to_drop = index::sample(rng, num_channels, num_drop).into_vec();

    tracing::trace!(num_channels, ?channels_to_drop, "sampled channels to drop");
    Ok(ChannelDropoutParams { channels_to_drop })
}

// ============================================================================
// Channel-shuffle sampling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelShuffleParams {
    pub channels_shuffled: Vec<usize>,
}

/// Uniform random permutation of `0..num_channels` (Fisher-Yates).
pub fn sample_channel_permutation<R: Rng + ?Sized>(
    num_channels: usize,
    rng: &mut R,
) -> ChannelShuffleParams {
    let mut channels_shuffled: Vec<usize> = (0..num_channels).collect();
    channels_shuffled.shuffle(rng);

    tracing::trace!(?channels_shuffled, "sampled channel permutation");
    ChannelShuffleParams { channels_shuffled }
}

// ============================================================================
// Downscale-factor sampling
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownscaleParams {
    pub scale: f64,
    pub interpolation: Interpolation,
}

/// Checks `0 < scale_min <= scale_max < 1`.
pub fn validate_scale_range(scale_min: f64, scale_max: f64) -> AugmentResult<()> {
    ensure_augment!(
        scale_min <= scale_max,
        Configuration,
        "expected scale_min <= scale_max, got {} {}",
        scale_min,
        scale_max
    );
    ensure_augment!(
        scale_max < 1.0,
        Configuration,
        "expected scale_max to be less than 1, got {}",
        scale_max
    );
    ensure_augment!(
        scale_min > 0.0,
        Configuration,
        "expected scale_min to be positive, got {}",
        scale_min
    );
    Ok(())
}

/// Draws a scale uniformly from `[scale_min, scale_max]`.
pub fn sample_downscale<R: Rng + ?Sized>(
    scale_min: f64,
    scale_max: f64,
    interpolation: Interpolation,
    rng: &mut R,
) -> AugmentResult<DownscaleParams> {
    validate_scale_range(scale_min, scale_max)?;
    let scale = rng.random_range(scale_min..=scale_max);

    tracing::trace!(scale, ?interpolation, "sampled downscale factor");
    Ok(DownscaleParams {
        scale,
        interpolation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AugmentError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    const SEEDS: [u64; 5] = [0, 1, 42, 1234, 98765];

    mod hole_tests {
        use super::*;

        #[test]
        fn single_fixed_hole_on_4x4() -> AugmentResult<()> {
            let ranges = HoleRanges::new(1, 1, 2, 2, 2, 2);
            let shape = ImageShape::new(3, 4, 4);
            for seed in 0..200 {
                let mut rng = StdRng::seed_from_u64(seed);
                let params = sample_holes(shape, &ranges, &mut rng)?;
                assert_eq!(params.holes.len(), 1);
                let hole = params.holes[0];
                assert_eq!((hole.width(), hole.height()), (2, 2));
                assert!(hole.x1 <= 2 && hole.y1 <= 2, "corner out of range: {hole:?}");
            }
            Ok(())
        }

        #[test]
        fn holes_stay_inside_image_and_ranges() -> AugmentResult<()> {
            let ranges = HoleRanges::new(2, 6, 1, 5, 3, 7);
            let shape = ImageShape::new(3, 9, 13);
            for seed in SEEDS {
                let mut rng = StdRng::seed_from_u64(seed);
                for _ in 0..100 {
                    let params = sample_holes(shape, &ranges, &mut rng)?;
                    assert!((2..=6).contains(&params.holes.len()));
                    for hole in &params.holes {
                        assert!((1..=5).contains(&hole.height()));
                        assert!((3..=7).contains(&hole.width()));
                        assert!(hole.x2 <= shape.width && hole.y2 <= shape.height);
                    }
                }
            }
            Ok(())
        }

        #[test]
        fn hole_equal_to_image_is_allowed() -> AugmentResult<()> {
            let ranges = HoleRanges::new(1, 1, 5, 5, 7, 7);
            let mut rng = StdRng::seed_from_u64(3);
            let params = sample_holes(ImageShape::new(1, 5, 7), &ranges, &mut rng)?;
            assert_eq!(
                params.holes,
                vec![Hole {
                    x1: 0,
                    y1: 0,
                    x2: 7,
                    y2: 5
                }]
            );
            Ok(())
        }

        #[test]
        fn oversized_hole_is_rejected() {
            let ranges = HoleRanges::new(1, 1, 5, 5, 2, 2);
            let mut rng = StdRng::seed_from_u64(0);
            let result = sample_holes(ImageShape::new(3, 4, 4), &ranges, &mut rng);
            assert!(matches!(result, Err(AugmentError::ConstraintViolation(_))));
        }

        #[test]
        fn invalid_ranges_are_rejected() {
            assert!(HoleRanges::new(0, 1, 1, 1, 1, 1).validate().is_err());
            assert!(HoleRanges::new(2, 1, 1, 1, 1, 1).validate().is_err());
            assert!(HoleRanges::new(1, 1, 3, 2, 1, 1).validate().is_err());
            assert!(HoleRanges::new(1, 1, 1, 1, 0, 0).validate().is_err());
            assert!(HoleRanges::new(1, 3, 1, 2, 1, 2).validate().is_ok());
        }
    }

    mod channel_drop_tests {
        use super::*;

        #[test]
        fn drops_one_or_two_of_three() -> AugmentResult<()> {
            let mut rng = StdRng::seed_from_u64(42);
            let mut sizes_seen = HashSet::new();
            for _ in 0..500 {
                let params = sample_channels_to_drop(3, 1, 2, &mut rng)?;
                let distinct: HashSet<_> = params.channels_to_drop.iter().collect();
                assert_eq!(distinct.len(), params.channels_to_drop.len());
                assert!((1..=2).contains(&distinct.len()));
                assert!(params.channels_to_drop.iter().all(|&c| c < 3));
                sizes_seen.insert(distinct.len());
            }
            assert_eq!(sizes_seen, HashSet::from([1, 2]));
            Ok(())
        }

        #[test]
        fn single_channel_is_unsupported() {
            for seed in SEEDS {
                let mut rng = StdRng::seed_from_u64(seed);
                let result = sample_channels_to_drop(1, 1, 1, &mut rng);
                assert!(matches!(result, Err(AugmentError::Unsupported(_))));
            }
        }

        #[test]
        fn dropping_all_channels_is_a_configuration_error() {
            let mut rng = StdRng::seed_from_u64(0);
            for max in [3, 4, 10] {
                let result = sample_channels_to_drop(3, 1, max, &mut rng);
                assert!(matches!(result, Err(AugmentError::Configuration(_))));
            }
        }
    }

    mod shuffle_tests {
        use super::*;

        #[test]
        fn returns_a_permutation() {
            let mut rng = StdRng::seed_from_u64(1);
            for n in [1, 2, 3, 4, 16] {
                let mut perm = sample_channel_permutation(n, &mut rng).channels_shuffled;
                perm.sort_unstable();
                assert_eq!(perm, (0..n).collect::<Vec<_>>());
            }
        }

        #[test]
        fn permutations_are_roughly_uniform() {
            let mut rng = StdRng::seed_from_u64(2024);
            let trials = 6_000;
            let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
            for _ in 0..trials {
                let perm = sample_channel_permutation(3, &mut rng).channels_shuffled;
                *counts.entry(perm).or_default() += 1;
            }
            // 3! = 6 permutations, ~1000 each
            assert_eq!(counts.len(), 6);
            for (perm, count) in counts {
                assert!((850..=1150).contains(&count), "{perm:?} drawn {count} times");
            }
        }
    }

    mod downscale_tests {
        use super::*;

        #[test]
        fn scale_stays_in_range() -> AugmentResult<()> {
            let mut rng = StdRng::seed_from_u64(5);
            for _ in 0..1_000 {
                let params = sample_downscale(0.3, 0.7, Interpolation::Bilinear, &mut rng)?;
                assert!((0.3..=0.7).contains(&params.scale));
                assert!(params.scale < 1.0);
                assert_eq!(params.interpolation, Interpolation::Bilinear);
            }
            Ok(())
        }

        #[test]
        fn degenerate_range_returns_the_bound() -> AugmentResult<()> {
            let mut rng = StdRng::seed_from_u64(5);
            let params = sample_downscale(0.25, 0.25, Interpolation::Nearest, &mut rng)?;
            assert_eq!(params.scale, 0.25);
            Ok(())
        }

        #[test]
        fn rejects_invalid_scale_ranges() {
            assert!(validate_scale_range(0.5, 1.0).is_err());
            assert!(validate_scale_range(0.8, 0.5).is_err());
            assert!(validate_scale_range(0.0, 0.5).is_err());
            assert!(validate_scale_range(0.1, 0.99).is_ok());
        }
    }

    #[test]
    fn shape_requires_three_dims() {
        let img = Tensor::zeros(&[3, 8, 6], (tch::Kind::Float, tch::Device::Cpu));
        assert_eq!(ImageShape::of(&img), Ok(ImageShape::new(3, 8, 6)));

        let batch = Tensor::zeros(&[2, 3, 8, 6], (tch::Kind::Float, tch::Device::Cpu));
        assert!(matches!(
            ImageShape::of(&batch),
            Err(AugmentError::Unsupported(_))
        ));
    }
}
