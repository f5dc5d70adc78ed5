//! Sensor subsystem.
//!
//! Only the contact ladder lives here; remote level sources are handled by
//! [`crate::watcher`].

pub mod level_sampler;

pub use level_sampler::{LevelSampler, MAX_LEVEL_PINS, SamplerSettings};
