//! Source-location attribution for failing callbacks.
//!
//! A location combines two things captured at different times:
//! - the script identity, recorded on the [`Callback`] at registration;
//! - the line of the executing statement, recorded on the
//!   [`CallbackContext`] while the body runs.
//!
//! Resolution happens eagerly, as soon as the body returns `Err` and before
//! the context is dropped. Nothing is recovered from a stack unwind.

use crate::callback::{Callback, CallbackContext, CallbackOrigin};
use crate::types::{Phase, SourceLocation};

/// Produces the optional [`SourceLocation`] of a running callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationResolver;

impl LocationResolver {
    pub fn new() -> Self {
        Self
    }

    /// `None` for internal callbacks or when no statement line was recorded.
    pub fn resolve(&self, callback: &Callback, ctx: &CallbackContext<'_>) -> Option<SourceLocation> {
        match callback.origin() {
            CallbackOrigin::Internal => None,
            CallbackOrigin::Script(source) => {
                let line = ctx.current_line()?;
                SourceLocation::new(source.clone(), line)
            }
        }
    }

    /// Like [`resolve`](Self::resolve) but yields `None` for phases that are
    /// not location-attributed.
    pub fn resolve_for_phase(
        &self,
        phase: Phase,
        callback: &Callback,
        ctx: &CallbackContext<'_>,
    ) -> Option<SourceLocation> {
        if !phase.location_attributed() {
            return None;
        }
        self.resolve(callback, ctx)
    }
}
