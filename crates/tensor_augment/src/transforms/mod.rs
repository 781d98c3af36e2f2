pub mod core;
pub mod vision;

pub use self::core::{Chain, Compose, RandomApply, RandomizedTransform, Transform};
