#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # obsbox Config
//!
//! Configuration model and resolution engine for obsbox.
//!
//! This crate provides:
//! - [`RawConfig`] -- the configuration as authored in YAML
//! - [`PlaceholderIterator`], [`IteratorRegistry`], [`CombinationGenerator`] --
//!   the iterator engine behind `{name}` placeholder expansion
//! - [`Resolver`] -- turns templates, instances and inline definitions into
//!   a fully materialized [`Config`]
//! - [`ConfigError`] -- fail-fast errors with a resolution context stack
//!
//! Loading is a one-shot pipeline: [`parse_str`]/[`parse_file`] produce a
//! [`RawConfig`], [`resolve`] expands and resolves it, [`load`] does both.

pub mod error;
pub mod expand;
pub mod export;
pub mod iterator;
pub mod load;
pub mod model;
pub mod placeholder;
pub mod raw;
pub mod resolver;
pub mod settings;
mod validate;

pub use error::{
    ConfigError, EntityKind, IteratorError, NamespaceKind, ResolveError, ResolveErrorKind,
    Result, Role,
};
pub use export::{ExportConfig, OtelExport, OtelInterval, OtelTransport, PrometheusExport};
pub use iterator::{Combination, CombinationGenerator, IteratorRegistry, PlaceholderIterator};
pub use load::{load, load_str, parse_file, parse_str};
pub use model::{
    ClockConfig, Config, InstanceRegistry, MetricConfig, MetricType, ResetConfig, SourceConfig,
    TransformConfig, ValueConfig,
};
pub use placeholder::Placeholders;
pub use raw::RawConfig;
pub use resolver::{Resolver, resolve};
pub use settings::{InternalMetrics, NamingFormat, Settings};
