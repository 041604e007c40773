//! Argument splitting.
//!
//! Nested `(...)` groups and quoted strings are never split; everything else
//! is split on commas (and whitespace when asked), trimmed, and empty items
//! are dropped.

/// Split `raw` into arguments.
///
/// With `allow_space_delimiter` set, runs of whitespace separate arguments
/// as well as commas: `"red, 10 20"` → `["red", "10", "20"]`.
pub fn split(raw: &str, allow_space_delimiter: bool) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in raw.trim().chars() {
        if escaped {
            escaped = false;
            cur.push(c);
            continue;
        }
        if let Some(q) = quote {
            match c {
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            }
            cur.push(c);
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                cur.push(c);
            }
            '\\' => {
                escaped = true;
                cur.push(c);
            }
            '(' => {
                depth += 1;
                cur.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                cur.push(c);
            }
            ',' if depth == 0 => push_arg(&mut out, &mut cur),
            c if depth == 0 && allow_space_delimiter && c.is_whitespace() => {
                push_arg(&mut out, &mut cur)
            }
            _ => cur.push(c),
        }
    }
    push_arg(&mut out, &mut cur);
    out
}

fn push_arg(out: &mut Vec<String>, cur: &mut String) {
    let arg = cur.trim();
    if !arg.is_empty() {
        out.push(arg.to_owned());
    }
    cur.clear();
}

/// Split off the first argument only, for functions whose first argument is
/// an identifier: `"color, red"` → `("color", Some("red"))`.
///
/// The delimiter is the first comma or whitespace run (with surrounding
/// whitespace).  Nesting is not tracked.  With no delimiter the second slot
/// is `None`.
pub fn split_simple(raw: &str) -> (String, Option<String>) {
    let Some(pos) = raw.find(|c: char| c == ',' || c.is_whitespace()) else {
        return (raw.to_owned(), None);
    };
    let first = &raw[..pos];
    let rest = raw[pos..].trim_start();
    let rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    (first.to_owned(), Some(rest.to_owned()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
