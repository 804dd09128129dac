//! Tracing-backed handlers.

use core::fmt::Display;

use tracing::{Level, Span};

use crate::scope::ScopeState;
use crate::traits::Handler;
use crate::types::Annotate;

/// Records every error as a tracing event and passes it on.
///
/// Created by [`log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Log {
    level: Level,
}

impl Log {
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }
}

impl<E: Display> Handler<E> for Log {
    fn handle(&self, state: &ScopeState<'_, E>, err: E) -> Option<E> {
        let panicking = state.is_panicking();
        let pending = state.err().is_some();
        // Event levels must be known at the callsite.
        if self.level == Level::ERROR {
            tracing::error!(error = %err, panicking, pending, "scope error");
        } else if self.level == Level::WARN {
            tracing::warn!(error = %err, panicking, pending, "scope error");
        } else if self.level == Level::INFO {
            tracing::info!(error = %err, panicking, pending, "scope error");
        } else if self.level == Level::DEBUG {
            tracing::debug!(error = %err, panicking, pending, "scope error");
        } else {
            tracing::trace!(error = %err, panicking, pending, "scope error");
        }
        Some(err)
    }
}

/// Handler that logs errors at `level`.
#[inline]
pub fn log(level: Level) -> Log {
    Log { level }
}

/// Attaches the name of the current tracing span to every error.
///
/// Created by [`span_message`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanMessage;

impl<E: Annotate> Handler<E> for SpanMessage {
    fn handle(&self, _state: &ScopeState<'_, E>, err: E) -> Option<E> {
        Some(err.annotate(span_to_message(&Span::current()).into()))
    }
}

/// Handler that decorates errors with the current span name.
#[inline]
pub fn span_message() -> SpanMessage {
    SpanMessage
}

fn span_to_message(span: &Span) -> String {
    let name = span.metadata().map(|m| m.name()).unwrap_or("unknown");
    format!("in span '{}'", name)
}
