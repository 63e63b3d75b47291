//! Per-phase listener registry.
//!
//! Callbacks are appended in registration order; nothing is de-duplicated.
//! The coordinator marks each phase as fired once it has been dispatched,
//! after which registering against it is an error (the callback could
//! never run).

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::callback::{BuildListener, Callback, CallbackContext, CallbackOrigin};
use crate::error::{CallbackError, RegistrationError};
use crate::types::Phase;

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    callbacks: BTreeMap<Phase, Vec<Callback>>,
    fired: BTreeSet<Phase>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback` to `phase`.
    ///
    /// Fails with [`RegistrationError::InternalPhase`] when a script callback
    /// targets an internal phase, and [`RegistrationError::PhaseAlreadyFired`]
    /// when the phase has already been dispatched.
    pub fn register(&mut self, phase: Phase, callback: Callback) -> Result<(), RegistrationError> {
        if phase.is_internal() && matches!(callback.origin(), CallbackOrigin::Script(_)) {
            return Err(RegistrationError::InternalPhase { phase });
        }
        if self.fired.contains(&phase) {
            return Err(RegistrationError::PhaseAlreadyFired { phase });
        }
        tracing::debug!(%phase, style = callback.kind().style(), "registered listener");
        self.callbacks.entry(phase).or_default().push(callback);
        Ok(())
    }

    /// [`register`](Self::register) by phase name.
    pub fn register_named(&mut self, name: &str, callback: Callback) -> Result<(), RegistrationError> {
        let phase: Phase = name.parse()?;
        self.register(phase, callback)
    }

    /// Registers one callback per phase method the listener declares, in
    /// lifecycle order. Returns the number of callbacks added.
    ///
    /// Validation runs before anything is registered, so a rejected listener
    /// leaves the registry unchanged.
    pub fn add_multi_phase_listener(
        &mut self,
        origin: CallbackOrigin,
        listener: Rc<dyn BuildListener>,
    ) -> Result<usize, RegistrationError> {
        let handled = listener.handles();
        let phases: Vec<Phase> =
            Phase::public().iter().copied().filter(|p| handled.contains(p)).collect();
        if let Some(phase) = phases.iter().copied().find(|p| self.fired.contains(p)) {
            return Err(RegistrationError::PhaseAlreadyFired { phase });
        }
        for phase in &phases {
            let callback = Callback::listener_method(origin.clone(), Rc::clone(&listener), *phase);
            self.register(*phase, callback)?;
        }
        Ok(phases.len())
    }

    /// Registers a system listener for the internal root-completion notification.
    pub fn add_root_completion_listener<F>(&mut self, body: F) -> Result<(), RegistrationError>
    where
        F: Fn(&mut CallbackContext<'_>) -> Result<(), CallbackError> + 'static,
    {
        self.register(
            Phase::RootBuildCompletion,
            Callback::closure(CallbackOrigin::Internal, body),
        )
    }

    /// Callbacks for `phase` in registration order; empty if none.
    pub fn callbacks_for(&self, phase: Phase) -> &[Callback] {
        self.callbacks.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn mark_fired(&mut self, phase: Phase) {
        self.fired.insert(phase);
    }

    pub fn is_fired(&self, phase: Phase) -> bool {
        self.fired.contains(&phase)
    }

    /// Total number of registered callbacks across all phases.
    pub fn len(&self) -> usize {
        self.callbacks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
