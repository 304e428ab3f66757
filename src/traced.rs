//! Errors that carry the stack they were created on

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::stack::Stack;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error with a call stack captured at construction
///
/// When passed to a logger alongside a message, the stack is rendered beneath the
/// `[error]:` line.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TracedError {
    message: String,
    #[source]
    source: Option<BoxError>,
    stack: Stack,
}

impl TracedError {
    /// Create a new error, capturing the caller's stack
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
            source: None,
            stack: Stack::capture(0),
        }
    }

    /// Wrap an existing error, capturing the caller's stack
    pub fn wrap<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
            stack: Stack::capture(0),
        }
    }

    /// Wrap an existing error under a new message
    pub fn context<E>(source: E, message: impl fmt::Display) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.to_string(),
            source: Some(Box::new(source)),
            stack: Stack::capture(0),
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }
}

/// Find the first stack attached anywhere along an error's source chain
pub fn stack_of<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Stack> {
    let mut current: Option<&'a (dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(traced) = e.downcast_ref::<TracedError>() {
            return Some(traced.stack());
        }
        current = e.source();
    }
    None
}
