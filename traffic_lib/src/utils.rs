//! Thread coordination primitives.

pub mod queue;
pub mod shutdown;
