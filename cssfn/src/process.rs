//! The surrounding process object.
//!
//! Built-ins that reach beyond their own arguments do so through a
//! [`Process`] handed to every callback: the selector → rule reference table
//! used by `query()`, the hook bus fired by `color_adjust`, and the color and
//! selector collaborators.

use std::collections::HashMap;
use std::rc::Rc;

use crate::color::{ColorModel, DefaultColorModel};
use crate::hook::HookBus;
use crate::rule::Rule;
use crate::selector::{DefaultSelectorNormalizer, SelectorNormalizer};

// ── ReferenceTable ────────────────────────────────────────────────────────────

/// Normalised selector → rule.
///
/// Read-only while expansion runs; callers fill it before calling
/// [`Functions::apply`](crate::functions::Functions::apply).
#[derive(Default)]
pub struct ReferenceTable {
    refs: HashMap<String, Rc<dyn Rule>>,
}

impl std::fmt::Debug for ReferenceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.refs.keys()).finish()
    }
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the rule for an already-normalised selector.
    pub fn set(&mut self, selector: impl Into<String>, rule: Rc<dyn Rule>) {
        self.refs.insert(selector.into(), rule);
    }

    pub fn get(&self, selector: &str) -> Option<Rc<dyn Rule>> {
        self.refs.get(selector).cloned()
    }

    /// Remove a reference.  Returns `true` if it existed.
    pub fn unset(&mut self, selector: &str) -> bool {
        self.refs.remove(selector).is_some()
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.refs.contains_key(selector)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

// ── Process ───────────────────────────────────────────────────────────────────

pub struct Process {
    pub references: ReferenceTable,
    pub hooks: HookBus,
    colors: Box<dyn ColorModel>,
    selectors: Box<dyn SelectorNormalizer>,
}

impl Default for Process {
    fn default() -> Self {
        Self {
            references: ReferenceTable::new(),
            hooks: HookBus::new(),
            colors: Box::new(DefaultColorModel),
            selectors: Box::new(DefaultSelectorNormalizer),
        }
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("references", &self.references)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl Process {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_model(mut self, model: impl ColorModel + 'static) -> Self {
        self.colors = Box::new(model);
        self
    }

    pub fn with_selector_normalizer(mut self, normalizer: impl SelectorNormalizer + 'static) -> Self {
        self.selectors = Box::new(normalizer);
        self
    }

    pub fn colors(&self) -> &dyn ColorModel {
        self.colors.as_ref()
    }

    pub fn selectors(&self) -> &dyn SelectorNormalizer {
        self.selectors.as_ref()
    }

    /// Register `rule` under the readable form of `selector`.
    pub fn add_reference(&mut self, selector: &str, rule: Rc<dyn Rule>) {
        let key = self.selectors.make_readable(selector);
        self.references.set(key, rule);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{DataTable, SimpleRule};

    #[test]
    fn set_get_unset() {
        let mut refs = ReferenceTable::new();
        assert!(refs.is_empty());
        refs.set(".a", SimpleRule::new(".a").with("color", "red"));
        assert!(refs.contains(".a"));
        assert_eq!(refs.len(), 1);
        let rule = refs.get(".a").unwrap();
        assert_eq!(rule.data(DataTable::Data, "color").as_deref(), Some("red"));
        assert!(refs.unset(".a"));
        assert!(!refs.unset(".a"));
    }

    #[test]
    fn add_reference_normalises_key() {
        let mut process = Process::new();
        process.add_reference("ul>li", SimpleRule::new("ul > li"));
        assert!(process.references.contains("ul > li"));
        assert!(!process.references.contains("ul>li"));
    }

    #[test]
    fn custom_collaborators() {
        struct Upper;
        impl SelectorNormalizer for Upper {
            fn make_readable(&self, raw: &str) -> String {
                raw.to_uppercase()
            }
        }
        let process = Process::new().with_selector_normalizer(Upper);
        assert_eq!(process.selectors().make_readable(".a"), ".A");
        assert!(process.colors().test("red"));
    }
}
