//! # buildhooks-report
//!
//! Turns a build's [`Failure`](buildhooks_core::Failure) into the text the
//! user sees, using embedded Tera templates, or into a JSON document.
//!
//! ```rust,no_run
//! use buildhooks_core::Failure;
//! use buildhooks_report::FailureReporter;
//!
//! if let Ok(reporter) = FailureReporter::new() {
//!     if let Ok(text) = reporter.render(&Failure::new("broken")) {
//!         eprint!("{text}");
//!     }
//! }
//! ```

pub mod context;
pub mod error;
pub mod reporter;

pub use context::{FailureCtx, JsonReport};
pub use error::ReportError;
pub use reporter::FailureReporter;
