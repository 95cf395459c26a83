//! A traffic light that cycles between red and green on a randomized timer.
//!
//! The light publishes every phase change into a [`BlockingQueue`], and any number of
//! threads can block on it until the light turns green.

#![deny(missing_docs)]

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::{CycleConfig, CycleConfigBuilder};
pub use crate::core::{LightId, Phase, PhaseController};
pub use crate::error::{Error, Result};
pub use crate::utils::queue::BlockingQueue;
pub use crate::utils::shutdown::ShutdownSignal;
