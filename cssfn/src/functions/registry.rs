//! Function registry.
//!
//! An insertion-ordered name → [`Function`] table.  Every mutation bumps a
//! version counter; [`Functions`](super::Functions) recompiles its call-site
//! pattern whenever the counter has moved since the last compile.
//!
//! Removed names are retired rather than forgotten: they stay in the
//! call-site pattern so that `name(...)` left over in a stylesheet still
//! gets the unresolved treatment instead of passing through as plain text.

use std::rc::Rc;

use indexmap::IndexMap;

use super::args;
use super::builtins;
use super::Context;
use crate::process::Process;

type RawCallback = Rc<dyn Fn(&str, Option<&mut Context>, &Process) -> String>;
type ArgsCallback = Rc<dyn Fn(&[String], Option<&mut Context>, &Process) -> String>;

// ── Function ──────────────────────────────────────────────────────────────────

/// A registered callback.
#[derive(Clone)]
pub enum Function {
    /// Receives the trimmed text between the parens.
    Raw(RawCallback),
    /// Receives that text already split on top-level commas.
    ParsedArgs(ArgsCallback),
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Raw(_) => f.write_str("Function::Raw"),
            Function::ParsedArgs(_) => f.write_str("Function::ParsedArgs"),
        }
    }
}

impl Function {
    pub fn raw<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&mut Context>, &Process) -> String + 'static,
    {
        Function::Raw(Rc::new(f))
    }

    pub fn parsed_args<F>(f: F) -> Self
    where
        F: Fn(&[String], Option<&mut Context>, &Process) -> String + 'static,
    {
        Function::ParsedArgs(Rc::new(f))
    }

    pub fn invoke(&self, raw_args: &str, context: Option<&mut Context>, process: &Process) -> String {
        match self {
            Function::Raw(f) => f(raw_args, context, process),
            Function::ParsedArgs(f) => f(&args::split(raw_args, false), context, process),
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Function>,
    retired: Vec<String>,
    version: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) `name`.  A replaced entry keeps its position.
    pub fn add(&mut self, name: impl Into<String>, function: Function) {
        let name = name.into();
        self.retired.retain(|r| *r != name);
        self.entries.insert(name, function);
        self.version += 1;
    }

    /// Remove `name`.  Returns `true` if it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.entries.shift_remove_entry(name);
        let Some((name, _)) = removed else {
            return false;
        };
        self.retired.push(name);
        self.version += 1;
        true
    }

    /// Merge in the built-ins.
    ///
    /// Built-in names move to the front, `query` first, so that `query`
    /// wins whenever several names could match at one position.  A name the
    /// caller already registered keeps the caller's callback.
    pub fn activate_builtins(&mut self) {
        let mut merged = IndexMap::with_capacity(self.entries.len() + builtins::NAMES.len());
        for (name, builtin) in builtins::builtins() {
            let function = self.entries.shift_remove(name).unwrap_or(builtin);
            self.retired.retain(|r| r != name);
            merged.insert(name.to_owned(), function);
        }
        merged.extend(self.entries.drain(..));
        self.entries = merged;
        self.version += 1;
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.entries.get(name)
    }

    /// Look `name` up verbatim, then (if `ignore_case`) ignoring ASCII case.
    pub fn resolve(&self, name: &str, ignore_case: bool) -> Option<&Function> {
        self.entries.get(name).or_else(|| {
            if !ignore_case {
                return None;
            }
            self.entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, f)| f)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in match-priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Names the call-site pattern must recognise: registered names in
    /// priority order, then retired ones.
    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.names().chain(self.retired.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
