//! Single-phase dispatch.
//!
//! ## Algorithm
//!
//! 1. Invoke each callback for the phase in registration order, each with a
//!    fresh [`CallbackContext`] over the shared console.
//! 2. On the first `Err`, resolve the location from the still-live context
//!    (attributed phases only) and record the error message verbatim.
//! 3. [`DispatchPolicy::FailFast`] stops there; [`DispatchPolicy::RunAll`]
//!    keeps going and returns later failures in [`PhaseReport::additional`].
//! 4. No failure → [`DispatchResult::Success`].

use buildhooks_core::{
    CallbackContext, Console, DispatchPolicy, DispatchResult, Failure, ListenerRegistry,
    LocationResolver, Phase,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseDispatcher {
    policy: DispatchPolicy,
    resolver: LocationResolver,
}

impl PhaseDispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self { policy, resolver: LocationResolver::new() }
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Runs every callback registered for `phase`.
    ///
    /// `build_failure` is exposed to callbacks through
    /// [`CallbackContext::build_failure`].
    pub fn dispatch(
        &self,
        registry: &ListenerRegistry,
        phase: Phase,
        console: &mut dyn Console,
        build_failure: Option<&Failure>,
    ) -> DispatchResult {
        self.dispatch_phase(registry, phase, console, build_failure).result
    }

    /// [`dispatch`](Self::dispatch), also returning the failures that
    /// followed the first one under [`DispatchPolicy::RunAll`].
    pub fn dispatch_phase(
        &self,
        registry: &ListenerRegistry,
        phase: Phase,
        console: &mut dyn Console,
        build_failure: Option<&Failure>,
    ) -> PhaseReport {
        let callbacks = registry.callbacks_for(phase);
        tracing::debug!(%phase, listeners = callbacks.len(), "dispatching phase");

        let mut first: Option<Failure> = None;
        let mut additional = Vec::new();
        for (index, callback) in callbacks.iter().enumerate() {
            let mut ctx = CallbackContext::new(&mut *console).with_build_failure(build_failure);
            let Err(err) = callback.invoke(&mut ctx) else {
                continue;
            };
            let location = self.resolver.resolve_for_phase(phase, callback, &ctx);
            let failure = Failure::new(err.message).with_location(location);

            if first.is_some() {
                tracing::warn!(%phase, index, error = %failure, "additional listener failure");
                additional.push(failure);
                continue;
            }
            tracing::warn!(
                %phase,
                index,
                style = callback.kind().style(),
                error = %failure,
                "listener failed"
            );
            first = Some(failure);
            if self.policy == DispatchPolicy::FailFast {
                let skipped = callbacks.len() - index - 1;
                if skipped > 0 {
                    tracing::debug!(%phase, skipped, "fail-fast: skipping remaining listeners");
                }
                break;
            }
        }

        let result = match first {
            Some(failure) => DispatchResult::Failed(failure),
            None => DispatchResult::Success,
        };
        PhaseReport { result, additional }
    }
}

/// Everything one phase dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    /// Success, or the phase's first failure.
    pub result: DispatchResult,
    /// Later failures in the same phase; only populated under `RunAll`.
    pub additional: Vec<Failure>,
}
