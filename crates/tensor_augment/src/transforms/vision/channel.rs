use crate::error::AugmentResult;
use crate::params::{sample_channel_permutation, ChannelShuffleParams, ImageShape};
use crate::transforms::vision::ops;
use crate::transforms::{RandomizedTransform, Transform};
use anyhow::Result;
use rand::Rng;
use tch::Tensor;

/// Randomly permutes the channels of an image.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelShuffle;

impl RandomizedTransform for ChannelShuffle {
    type Params = ChannelShuffleParams;

    fn sample_params<R: Rng + ?Sized>(
        &self,
        shape: ImageShape,
        rng: &mut R,
    ) -> AugmentResult<ChannelShuffleParams> {
        Ok(sample_channel_permutation(shape.channels, rng))
    }

    fn apply_params(&self, image: &Tensor, params: &ChannelShuffleParams) -> Result<Tensor> {
        ops::channel_shuffle(image, &params.channels_shuffled)
    }
}

impl Transform<Tensor, Tensor> for ChannelShuffle {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        self.apply_random(image)
    }
}
