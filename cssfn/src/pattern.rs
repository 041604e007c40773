//! Call-site pattern compiler.
//!
//! Every registered function name is folded into a single case-insensitive
//! regex that recognises `name(` anywhere in a text buffer.  Names are split
//! into two groups:
//!
//! | Group            | First char        | Matching rule                                   |
//! |------------------|-------------------|-------------------------------------------------|
//! | `function`       | letter or `_`     | left word boundary, optional leading `-`        |
//! | `simple_function`| anything else     | literal, unanchored                             |
//!
//! The [`regex`] crate has no look-behind, so the left boundary of the
//! `function` group is checked by hand in [`FunctionPattern::find_all`].

use regex::Regex;

use crate::error::FunctionError;

const IDENT_GROUP: &str = "function";
const SYMBOL_GROUP: &str = "simple_function";

// ── Public types ─────────────────────────────────────────────────────────────

/// One recognised call site: the function name as spelled in the text and
/// the byte offset of that spelling (just after any leading `-`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub offset: usize,
}

/// A compiled call-site pattern.
#[derive(Clone)]
pub struct FunctionPattern {
    regex: Regex,
    names: usize,
}

impl std::fmt::Debug for FunctionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionPattern")
            .field("src", &self.regex.as_str())
            .field("names", &self.names)
            .finish()
    }
}

/// `true` if `name` belongs in the word-bounded `function` group.
pub fn is_ident_name(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

/// Compile `names` into a [`FunctionPattern`].
///
/// Empty names are ignored; if nothing is left the registry is considered
/// empty and [`FunctionError::EmptyRegistry`] is returned.
pub fn compile<S: AsRef<str>>(names: &[S]) -> Result<FunctionPattern, FunctionError> {
    let mut idents = Vec::new();
    let mut symbols = Vec::new();

    for name in names.iter().map(AsRef::as_ref).filter(|n| !n.is_empty()) {
        if is_ident_name(name) {
            idents.push(regex::escape(name));
        } else {
            symbols.push(regex::escape(name));
        }
    }

    let ident_src = (!idents.is_empty())
        .then(|| format!("-?(?P<{IDENT_GROUP}>{})", idents.join("|")));
    let symbol_src = (!symbols.is_empty())
        .then(|| format!("(?P<{SYMBOL_GROUP}>{})", symbols.join("|")));

    let body = match (ident_src, symbol_src) {
        (Some(i), Some(s)) => format!("(?:{i}|{s})"),
        (Some(i), None) => i,
        (None, Some(s)) => s,
        (None, None) => return Err(FunctionError::EmptyRegistry),
    };

    let regex = Regex::new(&format!(r"(?i){body}\("))?;
    Ok(FunctionPattern {
        regex,
        names: idents.len() + symbols.len(),
    })
}

impl FunctionPattern {
    /// The generated regex source.
    pub fn src(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of names folded into the pattern.
    pub fn len(&self) -> usize {
        self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names == 0
    }

    /// Returns `true` if at least one call site occurs in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.next_site(text, 0).is_some()
    }

    /// All non-overlapping call sites in `text`, left to right.
    pub fn find_all(&self, text: &str) -> Vec<CallSite> {
        let mut sites = Vec::new();
        let mut at = 0;
        while let Some((site, end)) = self.next_site(text, at) {
            sites.push(site);
            at = end;
        }
        sites
    }

    /// Find the first call site starting at or after `at`, returning it with
    /// the byte offset just past its `(`.
    fn next_site(&self, text: &str, mut at: usize) -> Option<(CallSite, usize)> {
        while at <= text.len() {
            let caps = self.regex.captures_at(text, at)?;
            let whole = caps.get(0)?;

            if let Some(m) = caps.name(IDENT_GROUP) {
                if !left_boundary(text, whole.start()) {
                    // Retry one char further on; a shorter name may still
                    // start at a valid boundary inside this match.
                    at = whole.start() + text[whole.start()..].chars().next()?.len_utf8();
                    continue;
                }
                let site = CallSite { name: m.as_str().to_owned(), offset: m.start() };
                return Some((site, whole.end()));
            }

            let m = caps.name(SYMBOL_GROUP)?;
            let site = CallSite { name: m.as_str().to_owned(), offset: m.start() };
            return Some((site, whole.end()));
        }
        None
    }
}

/// `true` when the char before `pos` is neither a word char nor `-`.
fn left_boundary(text: &str, pos: usize) -> bool {
    match text[..pos].chars().next_back() {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '_' || c == '-'),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
