//! # Kotoba Audio Player Library (kotoba-ap)
//!
//! Lesson audio playback and the learner-facing use cases.
//!
//! **Architecture:** a single-session [`playback::AudioController`] driving a
//! pluggable media player, plus one use-case struct per intent over the
//! `kotoba-common` repositories.

pub mod build_info;
pub mod config;
pub mod error;
pub mod playback;
pub mod usecase;

pub use build_info::build_info;
pub use error::{Error, Result};
