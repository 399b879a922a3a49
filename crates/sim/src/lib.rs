#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # obsbox Sim
//!
//! Simulation primitives driving synthetic telemetry.
//!
//! This crate provides:
//! - [`Clock`] -- a periodic tick source, run on a tokio task
//! - [`Source`] -- draws one random observation per tick
//! - [`Value`] -- runs observations through [`Transform`]s, optionally
//!   consuming its state on read ([`Reset::OnRead`])
//! - [`SimError`] -- construction and start-up failures
//!
//! Subscriptions point upstream weakly: a clock does not keep its sources
//! alive and a source does not keep its values alive. Whoever builds the
//! graph owns it.

pub mod clock;
pub mod error;
pub mod source;
pub mod value;

pub use clock::{Clock, TickListener};
pub use error::{Result, SimError};
pub use source::{DEFAULT_MAX, DEFAULT_MIN, ObservationListener, Source};
pub use value::{Reset, Transform, Value};
