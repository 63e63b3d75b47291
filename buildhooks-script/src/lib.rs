//! # buildhooks-script
//!
//! A small line-oriented hook script language and a [`ScriptSession`] that
//! evaluates it during a build.
//!
//! Every statement knows its physical line, and every listener block keeps
//! the identity of the script it came from. That is all the lifecycle core
//! needs to attribute a failure to `<script> line: <n>`.

pub mod error;
pub mod parser;
pub mod script;
pub mod session;

pub use error::ScriptError;
pub use script::Script;
pub use session::ScriptSession;
