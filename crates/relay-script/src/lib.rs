//! Script definitions and variable resolution
//!
//! This crate holds Relay's script definitions and the variable resolution
//! that runs once per script execution. A script declares static variables
//! in its config; a run supplies its own variables on top. The merge is
//! more subtle than it looks:
//!
//! - run variables win on key collision and are never template-evaluated
//! - a run-supplied key also suppresses evaluation of the static
//!   definition's template entirely
//! - static definitions are evaluated in definition order, each seeing the
//!   variables resolved before it
//! - whether the definition set needs template evaluation at all is
//!   classified once, lazily, and cached for the life of the holder
//!
//! # Key Types
//!
//! - [`ScriptVariables`] - Holds and renders a script's static variables
//! - [`Script`] / [`ScriptConfig`] - A script definition carrying a
//!   variables block
//! - [`VariablesError`] - Render failure with the offending key attached

pub mod script;
pub mod variables;

pub use script::{Script, ScriptConfig, ScriptMode};
pub use variables::{ScriptVariables, Variables, VariablesError, VariablesResult};
