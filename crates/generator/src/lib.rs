#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # obsbox Generator
//!
//! Turns a resolved [`Config`](obsbox_config::Config) into running
//! simulation objects.
//!
//! This crate provides:
//! - [`Generator`] -- builds clocks, sources and values, shares named
//!   instances by identity, and owns their start/stop lifecycle
//! - [`MetricRegistry`] / [`Descriptor`] -- the metric view handed to
//!   exporters
//! - [`GeneratorError`] -- construction failures with metric context

pub mod error;
pub mod generator;
pub mod registry;

pub use error::{GeneratorError, Result, Stage};
pub use generator::Generator;
pub use registry::{Descriptor, MetricRegistry};
