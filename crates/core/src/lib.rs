//! Debounced action scheduling for Quiesce
//!
//! This crate provides trailing-edge debouncing for bursty event sources:
//! - At-most-one pending invocation per debouncer
//! - Quiet period reconfigurable at runtime
//! - Category -> delay profile tables (e.g. per question type)

pub mod debounce;
pub mod delay;
pub mod error;
pub mod profile;

pub use debounce::{Debouncer, Direct, Pending};
pub use delay::Delay;
pub use error::ConfigError;
pub use profile::{DelayProfile, DEFAULT_CATEGORY};
