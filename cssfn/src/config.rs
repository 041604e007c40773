//! Engine options.
//!
//! | Option                    | Default  | Effect                                                  |
//! |---------------------------|----------|---------------------------------------------------------|
//! | `builtins`                | `false`  | activate the built-in functions on construction         |
//! | `unresolved`              | `Remove` | what happens to a call site whose name is not registered |
//! | `case_insensitive_lookup` | `false`  | resolve `MATH(` against a registered `math`             |

/// Policy for call sites whose name matched the pattern but has no entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unresolved {
    /// Replace the call site with the empty string.
    #[default]
    Remove,
    /// Leave the call site verbatim for a later stage.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub builtins: bool,
    pub unresolved: Unresolved,
    pub case_insensitive_lookup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            builtins: false,
            unresolved: Unresolved::Remove,
            case_insensitive_lookup: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtins(mut self, on: bool) -> Self {
        self.builtins = on;
        self
    }

    pub fn unresolved(mut self, policy: Unresolved) -> Self {
        self.unresolved = policy;
        self
    }

    pub fn case_insensitive_lookup(mut self, on: bool) -> Self {
        self.case_insensitive_lookup = on;
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
