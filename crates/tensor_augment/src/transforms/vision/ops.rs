//! Tensor operations behind the randomized vision transforms.
//!
//! Each function takes an image `[C, H, W]` and an already-sampled parameter
//! bundle and returns a new tensor on the same device; the input is never
//! modified in place.

use crate::error::AugmentError;
use crate::params::Hole;
use crate::transforms::vision::Interpolation;
use anyhow::{ensure, Context, Result};
use tch::{Kind, TchError, Tensor};

fn size3(image: &Tensor) -> Result<(i64, i64, i64)> {
    image.size3().map_err(|_| {
        AugmentError::Unsupported(format!(
            "expected a 3D image tensor [C, H, W], got shape {:?}",
            image.size()
        ))
        .into()
    })
}

fn index_tensor(indices: &[usize], image: &Tensor) -> Tensor {
    let indices: Vec<i64> = indices.iter().map(|&i| i as i64).collect();
    Tensor::from_slice(&indices).to_device(image.device())
}

// ============================================================================
// cutout
// ============================================================================

/// Fills every hole, across all channels, with `fill_value`.
pub fn cutout(image: &Tensor, holes: &[Hole], fill_value: f64) -> Result<Tensor> {
    let (_channels, height, width) = size3(image)?;
    let output = image.copy();

    for hole in holes {
        ensure!(
            hole.x1 <= hole.x2
                && hole.y1 <= hole.y2
                && hole.x2 as i64 <= width
                && hole.y2 as i64 <= height,
            AugmentError::ConstraintViolation(format!(
                "hole {:?} lies outside a {}x{} image",
                hole, height, width
            ))
        );
        output
            .f_narrow(1, hole.y1 as i64, hole.height() as i64)?
            .f_narrow(2, hole.x1 as i64, hole.width() as i64)?
            .f_fill_(fill_value)
            .context("Failed to fill cutout hole")?;
    }
    Ok(output)
}

// ============================================================================
// channel_dropout
// ============================================================================

/// Fills the listed channels with `fill_value`.
pub fn channel_dropout(image: &Tensor, channels_to_drop: &[usize], fill_value: f64) -> Result<Tensor> {
    let (channels, _height, _width) = size3(image)?;
    ensure!(
        channels > 1,
        AugmentError::Unsupported("image has one channel, channel dropout is not defined".into())
    );
    ensure!(
        channels_to_drop.iter().all(|&c| (c as i64) < channels),
        AugmentError::ConstraintViolation(format!(
            "channel indices {:?} out of range for {} channels",
            channels_to_drop, channels
        ))
    );

    let mut output = image.copy();
    if !channels_to_drop.is_empty() {
        output.f_index_fill_(0, &index_tensor(channels_to_drop, image), fill_value)?;
    }
    Ok(output)
}

// ============================================================================
// channel_shuffle
// ============================================================================

/// Reorders channels so that output channel `i` is input channel `order[i]`.
pub fn channel_shuffle(image: &Tensor, order: &[usize]) -> Result<Tensor> {
    let (channels, _height, _width) = size3(image)?;
    ensure!(
        order.len() as i64 == channels,
        AugmentError::ConstraintViolation(format!(
            "channel order has {} entries but the image has {} channels",
            order.len(),
            channels
        ))
    );
    image
        .f_index_select(0, &index_tensor(order, image))
        .context("Failed to reorder channels")
}

// ============================================================================
// downscale
// ============================================================================

fn resize(batched: &Tensor, size: &[i64], mode: Interpolation) -> Result<Tensor, TchError> {
    match mode {
        Interpolation::Nearest => batched.f_upsample_nearest2d(size, None::<f64>, None::<f64>),
        Interpolation::Bilinear => {
            batched.f_upsample_bilinear2d(size, false, None::<f64>, None::<f64>)
        }
        Interpolation::Bicubic => batched.f_upsample_bicubic2d(size, false, None::<f64>, None::<f64>),
        Interpolation::Area => batched.f_adaptive_avg_pool2d(size),
    }
}

/// Shrinks the image by `scale` and resizes it back to its original size,
/// using the same interpolation both ways.
///
/// Target sizes round half to even (a 10 pixel side at 0.25 becomes 2).
/// The result is clipped to the kind's value range before the cast back:
/// `uint8` to `[0, 255]` (truncating), floating kinds to `[0, 1]`. Other
/// kinds are cast back unclipped.
pub fn downscale(image: &Tensor, scale: f64, interpolation: Interpolation) -> Result<Tensor> {
    let (_channels, height, width) = size3(image)?;
    let kind = image.kind();

    let new_height = (height as f64 * scale).round_ties_even() as i64;
    let new_width = (width as f64 * scale).round_ties_even() as i64;
    ensure!(
        new_height > 0 && new_width > 0,
        AugmentError::ConstraintViolation(format!(
            "scale {} shrinks a {}x{} image to {}x{}",
            scale, height, width, new_height, new_width
        ))
    );

    let batched = image.f_unsqueeze(0)?.f_to_kind(Kind::Float)?;
    let mut downscaled = resize(&batched, &[new_height, new_width], interpolation)
        .context("Failed to downscale image")?;

    if kind == Kind::Uint8 && interpolation == Interpolation::Nearest {
        downscaled = downscaled
            .f_clamp(0.0, 255.0)?
            .f_to_kind(Kind::Int)?
            .f_to_kind(Kind::Float)?;
    }

    let upscaled = resize(&downscaled, &[height, width], interpolation)
        .context("Failed to upscale image")?
        .f_squeeze_dim(0)?;

    let output = match kind {
        Kind::Uint8 => upscaled.f_clamp(0.0, 255.0)?.f_to_kind(Kind::Uint8)?,
        Kind::Half | Kind::BFloat16 | Kind::Float | Kind::Double => {
            upscaled.f_clamp(0.0, 1.0)?.f_to_kind(kind)?
        }
        _ => upscaled.f_to_kind(kind)?,
    };
    Ok(output)
}
