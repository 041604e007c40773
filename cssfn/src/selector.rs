//! Selector normalisation.
//!
//! `query()` looks rules up by selector text, so both the reference table
//! keys and the lookup target must be spelled the same way.

/// Turns raw selector text into the canonical form used as a reference key.
pub trait SelectorNormalizer {
    fn make_readable(&self, raw: &str) -> String;
}

/// Collapses whitespace and writes top-level combinators (`>`, `+`, `~`) and
/// list commas with uniform spacing.  Text inside `[...]` and `(...)` is left
/// alone so `[rel~=x]` and `:nth-child(2n+1)` survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSelectorNormalizer;

impl SelectorNormalizer for DefaultSelectorNormalizer {
    fn make_readable(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut depth = 0usize;
        let mut pending_space = false;

        for c in raw.trim().chars() {
            if depth > 0 {
                match c {
                    '[' | '(' => depth += 1,
                    ']' | ')' => depth -= 1,
                    _ => {}
                }
                out.push(c);
                continue;
            }
            match c {
                c if c.is_whitespace() => pending_space = true,
                '>' | '+' | '~' => {
                    trim_trailing_space(&mut out);
                    out.push(' ');
                    out.push(c);
                    out.push(' ');
                    pending_space = false;
                }
                ',' => {
                    trim_trailing_space(&mut out);
                    out.push_str(", ");
                    pending_space = false;
                }
                _ => {
                    if pending_space && !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    pending_space = false;
                    if matches!(c, '[' | '(') {
                        depth += 1;
                    }
                    out.push(c);
                }
            }
        }

        trim_trailing_space(&mut out);
        out
    }
}

fn trim_trailing_space(s: &mut String) {
    while s.ends_with(' ') {
        s.pop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
