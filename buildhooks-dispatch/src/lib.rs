//! # buildhooks-dispatch
//!
//! Phase dispatch and whole-build sequencing.
//!
//! Build a [`BuildLifecycleCoordinator`], register any internal listeners on
//! its registry, then call [`BuildLifecycleCoordinator::run`] with a
//! [`BuildSession`] and a console. The returned [`BuildOutcome`] carries the
//! single reported failure, if any.

pub mod coordinator;
pub mod dispatcher;
pub mod session;

pub use coordinator::{BuildLifecycleCoordinator, BuildOutcome, BuildStage};
pub use dispatcher::{PhaseDispatcher, PhaseReport};
pub use session::{BuildSession, EvaluationScope};
