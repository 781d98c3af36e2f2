//! src/error.rs
//!
//! Error taxonomy for parameter sampling and transform construction.
//!
//! Constructors and samplers return `AugmentError` directly so callers can
//! match on the kind. Pipeline-level code (`Transform::apply`, config loading)
//! wraps it in `anyhow::Error`, from which it can still be recovered with
//! `downcast_ref::<AugmentError>()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    /// Invalid range or option, detected at construction or first use.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The operation is structurally impossible for the given input.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Sampled geometry would not fit the image.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type AugmentResult<T> = std::result::Result<T, AugmentError>;

/// Like `anyhow::ensure!`, but returns the given `AugmentError` variant.
macro_rules! ensure_augment {
    ($cond:expr, $variant:ident, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::AugmentError::$variant(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_augment;
