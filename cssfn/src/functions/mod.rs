//! Function expansion.
//!
//! Recognises `name(...)` call sites in arbitrary text, resolves them against
//! a [`Registry`] and splices each call's return value back into the text.
//! Calls nested in another call's arguments are expanded first.
//!
//! | Built-in        | Arguments                           | Result                                  |
//! |-----------------|-------------------------------------|-----------------------------------------|
//! | `query`         | target, [property], [fallback]      | a property of another rule              |
//! | `math`          | expression, [unit]                  | `<number><unit>`                        |
//! | `hsla-adjust`   | color, h, s, l, a                   | adjusted color                          |
//! | `hsl-adjust`    | color, h, s, l                      | adjusted color                          |
//! | `h-adjust` etc. | color, delta                        | one channel adjusted                    |
//! | `this`          | property, [fallback]                | a property of the current rule          |
//!
//! # Quick start
//!
//! ```rust
//! use cssfn::functions::{Function, Functions};
//! use cssfn::process::Process;
//!
//! let mut fns = Functions::new();
//! fns.activate_builtins();
//! fns.add("double", Function::raw(|args, _, _| format!("{args}{args}")));
//!
//! let out = fns.apply("width: math(10px * 2); x: double(ab)", None, &Process::new()).unwrap();
//! assert_eq!(out, "width: 20px; x: abab");
//! ```

use std::rc::Rc;

use crate::rule::Rule;

pub mod args;
pub mod builtins;
pub mod expand;
pub mod expr;
pub mod registry;

// Re-exports for convenience.
pub use expand::Functions;
pub use registry::{Function, Registry};

/// Where a call is being expanded.
///
/// Owned by the caller.  The engine only ever writes [`function`](Self::function).
#[derive(Clone, Default)]
pub struct Context {
    /// Name of the call currently being expanded.
    pub function: Option<String>,
    /// The property the surrounding declaration belongs to.
    pub property: Option<String>,
    /// The rule the surrounding declaration belongs to.
    pub rule: Option<Rc<dyn Rule>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("function", &self.function)
            .field("property", &self.property)
            .field("rule", &self.rule.is_some())
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_rule(mut self, rule: Rc<dyn Rule>) -> Self {
        self.rule = Some(rule);
        self
    }
}
