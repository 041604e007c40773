//! The expansion engine.
//!
//! [`Functions::apply`] finds every call site the compiled pattern
//! recognises and replaces each `name(...)` span with its callback's return
//! value.  Call sites are processed right to left: a replacement only
//! changes the text at and after its own offset, so the offsets of the call
//! sites still waiting (all further left) stay valid, and a call nested in
//! another call's arguments is always expanded before its outer call.

use super::registry::{Function, Registry};
use super::Context;
use crate::config::{Config, Unresolved};
use crate::error::FunctionError;
use crate::pattern::{self, FunctionPattern};
use crate::process::Process;

/// A function registry plus its lazily compiled call-site pattern.
#[derive(Debug, Default)]
pub struct Functions {
    registry: Registry,
    config: Config,
    /// Pattern and the registry version it was compiled from.
    pattern: Option<(u64, FunctionPattern)>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine configured by `config`; built-ins are activated when
    /// [`Config::builtins`] is set.
    pub fn with_config(config: Config) -> Self {
        let mut fns = Functions { config, ..Self::default() };
        if fns.config.builtins {
            fns.registry.activate_builtins();
        }
        fns
    }

    /// Wrap an existing registry.
    pub fn with_registry(registry: Registry, config: Config) -> Self {
        let mut fns = Functions { registry, config, pattern: None };
        if fns.config.builtins {
            fns.registry.activate_builtins();
        }
        fns
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registry.  Any change invalidates the compiled
    /// pattern.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn add(&mut self, name: impl Into<String>, function: Function) {
        self.registry.add(name, function);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.registry.remove(name)
    }

    pub fn activate_builtins(&mut self) {
        self.registry.activate_builtins();
    }

    /// Expand every registered call in `text`.
    ///
    /// `context`, when given, has its `function` field set to each call's
    /// name before that call runs and is handed on to the callback.
    ///
    /// Fails only when the pattern has to be compiled and there is nothing
    /// to compile it from.  Malformed or unknown calls degrade per call
    /// site and never produce an `Err`.
    pub fn apply(
        &mut self,
        text: &str,
        mut context: Option<&mut Context>,
        process: &Process,
    ) -> Result<String, FunctionError> {
        if !text.contains('(') {
            return Ok(text.to_owned());
        }

        let sites = self.pattern()?.find_all(text);
        if sites.is_empty() {
            return Ok(text.to_owned());
        }

        let mut out = text.to_owned();
        for site in sites.into_iter().rev() {
            let Some(open) = out[site.offset..].find('(').map(|i| site.offset + i) else {
                continue;
            };
            let Some(close) = matching_paren(&out, open) else {
                tracing::debug!(function = %site.name, offset = site.offset, "unbalanced call, skipped");
                continue;
            };
            tracing::trace!(function = %site.name, offset = site.offset, "expanding call");

            if let Some(ctx) = context.as_deref_mut() {
                ctx.function = Some(site.name.clone());
            }

            let raw_args = out[open + 1..close].trim();
            let returns = match self
                .registry
                .resolve(&site.name, self.config.case_insensitive_lookup)
            {
                Some(function) => function.invoke(raw_args, context.as_deref_mut(), process),
                None => {
                    tracing::debug!(function = %site.name, policy = ?self.config.unresolved, "unresolved function");
                    match self.config.unresolved {
                        Unresolved::Remove => String::new(),
                        Unresolved::Keep => continue,
                    }
                }
            };

            out = splice(&out, site.offset, close + 1, &returns);
        }
        Ok(out)
    }

    /// The compiled pattern, rebuilt first if the registry changed.
    fn pattern(&mut self) -> Result<&FunctionPattern, FunctionError> {
        let version = self.registry.version();
        let compiled = match self.pattern.take() {
            Some((v, p)) if v == version => p,
            _ => {
                let names: Vec<&str> = self.registry.pattern_names().collect();
                let p = pattern::compile(&names)?;
                tracing::debug!(names = p.len(), version, "compiled call-site pattern");
                p
            }
        };
        Ok(&self.pattern.insert((version, compiled)).1)
    }
}

/// Byte index of the `)` closing the `(` at `open`.
///
/// Parens inside `'...'` or `"..."` don't count, and a backslash escapes
/// the byte after it.  `None` if the group never closes.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(open) {
        if escaped {
            escaped = false;
            continue;
        }
        match (b, quote) {
            (b'\\', _) => escaped = true,
            (q, Some(open_quote)) if q == open_quote => quote = None,
            (_, Some(_)) => {}
            (b'"' | b'\'', None) => quote = Some(b),
            (b'(', None) => depth += 1,
            (b')', None) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `text` with `start..end` replaced by `with`.
fn splice(text: &str, start: usize, end: usize, with: &str) -> String {
    let mut out = String::with_capacity(text.len() - (end - start) + with.len());
    out.push_str(&text[..start]);
    out.push_str(with);
    out.push_str(&text[end..]);
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
