//! Resolution context stack used to annotate errors.

use std::fmt;

use crate::error::{ConfigError, ResolveError, ResolveErrorKind};

/// Frames of the entities currently being resolved, outermost first.
#[derive(Debug, Default)]
pub(crate) struct Context {
    frames: Vec<String>,
}

impl Context {
    pub(crate) fn push(&mut self, label: impl fmt::Display, name: &str) {
        self.frames.push(format!("{label} \"{name}\""));
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn error(&self, kind: ResolveErrorKind) -> ConfigError {
        ResolveError::new(kind, self.frames.clone()).into()
    }
}
