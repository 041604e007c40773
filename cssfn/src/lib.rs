//! Function expansion for a CSS preprocessor.
//!
//! Text such as `width: math(10px * 2)` is scanned for registered
//! `name(...)` calls, and each call is replaced by whatever its callback
//! returns.  See [`functions`] for the engine and the built-in functions.

pub mod color;
pub mod config;
pub mod error;
pub mod functions;
pub mod hook;
pub mod pattern;
pub mod process;
pub mod rule;
pub mod selector;

pub use config::{Config, Unresolved};
pub use error::FunctionError;
pub use functions::{Context, Function, Functions, Registry};
pub use process::Process;
