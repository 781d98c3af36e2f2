use crate::error::{ensure_augment, AugmentResult};
use crate::params::ImageShape;
use crate::rng::{with_worker_rng, worker_gen_bool};
use anyhow::{Context, Result};
use rand::Rng;
use std::fmt::Debug;
use std::marker::PhantomData;
use tch::Tensor;

/// Defines the core `Transform` trait for composable augmentation pipelines.
///
/// The `Transform<I, O>` trait represents a stateless operation for
/// converting an input of type `I` to an output of type `O`.
/// Multiple `Transform` steps can be chained together via `.then(...)`
/// to form a single, inlined pipeline, or collected into a [`Compose`]
/// when the steps are only known at runtime.
///
/// Note: `then()` works only when:
/// 1. **Types align**: `self: Transform<I, O>`, `next: Transform<O, M>`
/// 2. **Owned**: `Self::Sized` (no trait objects, must be concrete)
/// 3. **Thread-safe**: intermediate and output types must be `Send`
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input
    fn apply(&self, input: I) -> Result<O>;

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }
}

/// A transform split into parameter sampling and a deterministic apply step.
///
/// `sample_params` only reads the configuration and the image shape, so it
/// can be driven by any RNG. `apply_params` must be a pure function of the
/// image and the bundle.
pub trait RandomizedTransform: Send + Sync {
    /// Concrete values sampled for one image.
    type Params: Debug;

    fn sample_params<R: Rng + ?Sized>(
        &self,
        shape: ImageShape,
        rng: &mut R,
    ) -> AugmentResult<Self::Params>;

    fn apply_params(&self, image: &Tensor, params: &Self::Params) -> Result<Tensor>;

    /// Samples from the worker RNG, then applies.
    fn apply_random(&self, image: Tensor) -> Result<Tensor> {
        let shape = ImageShape::of(&image)?;
        let params = with_worker_rng(|rng| self.sample_params(shape, rng))?;
        self.apply_params(&image, &params)
            .with_context(|| format!("Failed to apply {}", std::any::type_name::<Self>()))
    }
}

/// A chain of two transforms (`A` -> `B`)
/// - `PhantomData<M>` enforces intermediate type alignment.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Creates a new transform chain.
    /// Use [`Transform::then`] for better ergonomics.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        self.first
            .apply(input)
            .and_then(|mid| self.second.apply(mid))
            .with_context(|| {
                format!(
                    "Transform chain failed: {} → {} → {}",
                    std::any::type_name::<A>(),
                    std::any::type_name::<B>(),
                    std::any::type_name::<O>()
                )
            })
    }
}

// ============================================================================
// RandomApply
// ============================================================================

/// Runs the wrapped transform with probability `p`, otherwise passes the
/// image through untouched.
///
/// There is no default `p`: every step decides its own.
///
/// # Example
/// ```ignore
/// let dropout = RandomApply::new(ChannelDropout::new(ChannelDropoutConfig::default())?, 0.5)?;
/// let augmented = dropout.apply(image)?;
/// ```
#[derive(Debug)]
pub struct RandomApply<T> {
    inner: T,
    p: f64,
}

impl<T> RandomApply<T> {
    pub fn new(inner: T, p: f64) -> AugmentResult<Self> {
        ensure_augment!(
            (0.0..=1.0).contains(&p),
            Configuration,
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { inner, p })
    }

    pub fn p(&self) -> f64 {
        self.p
    }
}

impl<T> Transform<Tensor, Tensor> for RandomApply<T>
where
    T: Transform<Tensor, Tensor>,
{
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        match self.p {
            // Fast paths skip the RNG entirely
            0.0 => Ok(image),
            1.0 => self.inner.apply(image),
            _ => {
                if worker_gen_bool(self.p) {
                    self.inner.apply(image)
                } else {
                    Ok(image)
                }
            }
        }
    }
}

// ============================================================================
// Compose
// ============================================================================

/// An ordered list of boxed tensor transforms, built at runtime
/// (e.g. from a [`crate::config::PipelineConfig`]).
#[derive(Default)]
pub struct Compose {
    steps: Vec<Box<dyn Transform<Tensor, Tensor>>>,
}

impl Compose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Transform<Tensor, Tensor> + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn push_boxed(&mut self, step: Box<dyn Transform<Tensor, Tensor>>) {
        self.steps.push(step);
    }

    pub fn with(mut self, step: impl Transform<Tensor, Tensor> + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transform<Tensor, Tensor> for Compose {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        self.steps
            .iter()
            .enumerate()
            .try_fold(image, |img, (i, step)| {
                step.apply(img)
                    .with_context(|| format!("Pipeline step {} of {} failed", i + 1, self.len()))
            })
    }
}
