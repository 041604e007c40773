//! Built-in functions.
//!
//! Each built-in is a raw callback: it receives the trimmed argument text,
//! the optional [`Context`], and the [`Process`].  None of them can fail;
//! bad input degrades to an empty string (or `0` for `math`).

use std::sync::LazyLock;

use regex::Regex;

use super::args::{split, split_simple};
use super::expr::eval_str;
use super::registry::Function;
use super::Context;
use crate::color::{Delta, Deltas};
use crate::hook::HookPayload;
use crate::process::Process;
use crate::rule::{DataTable, Rule};

/// Built-in names in match-priority order.  `query` must stay first.
pub const NAMES: &[&str] = &[
    "query",
    "math",
    "hsla-adjust",
    "hsl-adjust",
    "h-adjust",
    "s-adjust",
    "l-adjust",
    "a-adjust",
    "this",
];

static PI_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpi\b").expect("pi regex"));

static NUMBER_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[+-]?\d*\.?\d+(?P<unit>[A-Za-z]{2,4}\b|%)").expect("unit regex")
});

static ROOTED_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[_a-zA-Z][-_a-zA-Z0-9]*$").expect("ident regex"));

/// Fresh [`Function`] entries for every built-in, in [`NAMES`] order.
pub fn builtins() -> Vec<(&'static str, Function)> {
    NAMES
        .iter()
        .filter_map(|&name| lookup(name).map(|f| (name, f)))
        .collect()
}

fn lookup(name: &str) -> Option<Function> {
    Some(match name {
        "query" => Function::raw(query),
        "math" => Function::raw(math),
        "hsla-adjust" => Function::raw(hsla_adjust),
        "hsl-adjust" => Function::raw(hsl_adjust),
        "h-adjust" => Function::raw(h_adjust),
        "s-adjust" => Function::raw(s_adjust),
        "l-adjust" => Function::raw(l_adjust),
        "a-adjust" => Function::raw(a_adjust),
        "this" => Function::raw(this),
        _ => return None,
    })
}

// ── math ──────────────────────────────────────────────────────────────────────

/// `math(expression[, unit])`.
///
/// `pi` is substituted, the unit is taken from the first `<number><unit>`
/// in the expression unless given, and everything but digits, `.` and
/// `+ - * / ( )` is stripped before evaluation.
pub fn math(input: &str, _: Option<&mut Context>, _: &Process) -> String {
    let mut args = split(input, false).into_iter();
    let expression = args.next().unwrap_or_default();
    let mut unit = args.next().unwrap_or_default();

    if unit.is_empty() {
        if let Some(caps) = NUMBER_UNIT.captures(&expression) {
            unit = caps["unit"].to_owned();
        }
    }

    let expression = PI_WORD.replace_all(&expression, std::f64::consts::PI.to_string());
    let filtered: String = expression
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '*' | '(' | ')' | '+' | '-'))
        .collect();

    let value = match eval_str(&filtered) {
        Ok(v) => round5(v),
        Err(e) => {
            tracing::debug!(expression = %filtered, error = %e, "math() evaluation failed");
            0.0
        }
    };
    format!("{value}{unit}")
}

fn round5(v: f64) -> f64 {
    let r = (v * 100_000.0).round() / 100_000.0;
    if !r.is_finite() {
        return v;
    }
    // Avoid printing "-0".
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

// ── color adjustment ──────────────────────────────────────────────────────────

/// Parse `color` and up to `slots` deltas; slots a function doesn't accept
/// stay zero.
fn color_args(input: &str, slots: usize) -> (String, Vec<Delta>) {
    let mut args = split(input, true).into_iter();
    let color = args.next().unwrap_or_default();
    let mut deltas: Vec<Delta> = args.take(slots).map(|a| Delta::parse(&a)).collect();
    deltas.resize(slots, Delta::ZERO);
    (color, deltas)
}

/// `hsla-adjust(color, h, s, l, a)`
pub fn hsla_adjust(input: &str, _: Option<&mut Context>, process: &Process) -> String {
    let (color, d) = color_args(input, 4);
    color_adjust(process, color, Deltas::new(d[0], d[1], d[2], d[3]))
}

/// `hsl-adjust(color, h, s, l)`
pub fn hsl_adjust(input: &str, _: Option<&mut Context>, process: &Process) -> String {
    let (color, d) = color_args(input, 3);
    color_adjust(process, color, Deltas::new(d[0], d[1], d[2], Delta::ZERO))
}

pub fn h_adjust(input: &str, _: Option<&mut Context>, process: &Process) -> String {
    let (color, d) = color_args(input, 1);
    color_adjust(process, color, Deltas { h: d[0], ..Deltas::default() })
}

pub fn s_adjust(input: &str, _: Option<&mut Context>, process: &Process) -> String {
    let (color, d) = color_args(input, 1);
    color_adjust(process, color, Deltas { s: d[0], ..Deltas::default() })
}

pub fn l_adjust(input: &str, _: Option<&mut Context>, process: &Process) -> String {
    let (color, d) = color_args(input, 1);
    color_adjust(process, color, Deltas { l: d[0], ..Deltas::default() })
}

pub fn a_adjust(input: &str, _: Option<&mut Context>, process: &Process) -> String {
    let (color, d) = color_args(input, 1);
    color_adjust(process, color, Deltas { a: d[0], ..Deltas::default() })
}

/// Adjust `color` by `deltas`.
///
/// Fires `color_adjust_before` (color and deltas writable), validates and
/// adjusts through the process's color model, then fires
/// `color_adjust_after` (result writable, deltas read-only).  An invalid
/// color yields the empty string.
pub fn color_adjust(process: &Process, mut color: String, mut deltas: Deltas) -> String {
    process.hooks.emit(&mut HookPayload::ColorAdjustBefore {
        color: &mut color,
        deltas: &mut deltas,
    });

    let colors = process.colors();
    let mut adjusted = if colors.test(&color) {
        colors.adjust(&color, &deltas)
    } else {
        tracing::debug!(%color, "not a color");
        String::new()
    };

    process.hooks.emit(&mut HookPayload::ColorAdjustAfter {
        color: &mut adjusted,
        deltas: &deltas,
    });
    adjusted
}

// ── this ──────────────────────────────────────────────────────────────────────

/// `this(property[, fallback])`: a property of the current rule.
pub fn this(input: &str, context: Option<&mut Context>, _: &Process) -> String {
    let (property, fallback) = split_simple(input);

    let Some(rule) = context.and_then(|c| c.rule.clone()) else {
        return String::new();
    };

    rule.expand_data(DataTable::Data, &property);
    rule.data(DataTable::Data, &property)
        .or(fallback)
        .unwrap_or_default()
}

// ── query ─────────────────────────────────────────────────────────────────────

/// `query(target[, property[, fallback]])`: a property of another rule.
///
/// `target` is `parent`, `previous`, `next`, `top`, or a selector looked up
/// in the process's reference table.  `property` defaults to (and the word
/// `default` means) the property being expanded.
pub fn query(input: &str, context: Option<&mut Context>, process: &Process) -> String {
    let args = split(input, false);
    let Some(context) = context else {
        return String::new();
    };
    let (Some(current_property), Some(target)) = (context.property.clone(), args.first()) else {
        return String::new();
    };

    let property = match args.get(1) {
        Some(p) if !p.eq_ignore_ascii_case("default") => p.clone(),
        _ => current_property,
    };
    let fallback = args.get(2);

    let target = if ROOTED_IDENT.is_match(target) {
        target.clone()
    } else {
        process.selectors().make_readable(target)
    };

    let current = context.rule.clone();
    let target_rule: Option<std::rc::Rc<dyn Rule>> = match target.to_ascii_lowercase().as_str() {
        "parent" => current.and_then(|r| r.parent()),
        "previous" => current.and_then(|r| r.previous()),
        "next" => current.and_then(|r| r.next()),
        "top" => {
            let mut top = current.and_then(|r| r.parent());
            while let Some(parent) = top.as_ref().and_then(|r| r.parent()) {
                top = Some(parent);
            }
            top
        }
        _ => process.references.get(&target),
    };

    let mut result = String::new();
    if let Some(rule) = target_rule {
        rule.process();
        rule.expand_data(DataTable::QueryData, &property);
        if let Some(value) = rule.data(DataTable::QueryData, &property) {
            result = value;
        }
    } else {
        tracing::debug!(%target, "query() target not found");
    }

    match fallback {
        Some(fallback) if result.is_empty() => fallback.clone(),
        _ => result,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Hook;
    use crate::rule::SimpleRule;
    use std::rc::Rc;

    fn run(f: fn(&str, Option<&mut Context>, &Process) -> String, input: &str) -> String {
        f(input, None, &Process::new())
    }

    fn run_in(
        f: fn(&str, Option<&mut Context>, &Process) -> String,
        input: &str,
        ctx: &mut Context,
        process: &Process,
    ) -> String {
        f(input, Some(ctx), process)
    }

    #[test]
    fn every_name_has_a_builtin() {
        assert_eq!(builtins().len(), NAMES.len());
        assert_eq!(NAMES[0], "query");
    }

    // ── math ──

    #[test]
    fn math_basic() {
        assert_eq!(run(math, "1 + 1"), "2");
        assert_eq!(run(math, "10px / 2"), "5px");
        assert_eq!(run(math, "pi * 2, "), "6.28319");
        assert_eq!(run(math, "PI"), "3.14159");
    }

    #[test]
    fn math_units() {
        assert_eq!(run(math, "50% / 2"), "25%");
        assert_eq!(run(math, "2em * 3"), "6em");
        assert_eq!(run(math, "10 * 2, px"), "20px");
        assert_eq!(run(math, "1.5rem + 1"), "2.5rem");
        // Unit token longer than four letters is not a unit.
        assert_eq!(run(math, "3 * 2abcde"), "6");
    }

    #[test]
    fn math_failures_are_zero() {
        assert_eq!(run(math, "1 / 0"), "0");
        assert_eq!(run(math, "1 / 0px"), "0px");
        assert_eq!(run(math, "1 +"), "0");
        assert_eq!(run(math, ""), "0");
        assert_eq!(run(math, "foo"), "0");
    }

    #[test]
    fn math_rounds_to_five_places() {
        assert_eq!(run(math, "1 / 3"), "0.33333");
        assert_eq!(run(math, "-1 / 3"), "-0.33333");
        assert_eq!(run(math, "0.000001"), "0");
    }

    #[test]
    fn math_prints_plain_decimals() {
        // No exponent notation, even for huge or tiny magnitudes.
        assert_eq!(run(math, "1000000000000 * 10000000000000"), "10000000000000000000000000");
        assert_eq!(run(math, "0.5 * 0.5"), "0.25");
        assert_eq!(run(math, "4 / 2"), "2");
    }

    #[test]
    fn math_strips_non_arithmetic() {
        assert_eq!(run(math, "1 + foo2"), "3");
        assert_eq!(run(math, "(2 + 3) * 2 px"), "10");
    }

    // ── color ──

    #[test]
    fn adjust_entry_points() {
        assert_eq!(run(h_adjust, "#ff0000 120"), "#00ff00");
        assert_eq!(run(h_adjust, "#ff0000, 120"), "#00ff00");
        assert_eq!(run(l_adjust, "#000, 100%"), "#ffffff");
        assert_eq!(run(s_adjust, "red -100"), "#808080");
        assert_eq!(run(a_adjust, "red -50"), "rgba(255,0,0,0.5)");
        assert_eq!(run(hsl_adjust, "red 120 0 0"), "#00ff00");
        assert_eq!(run(hsla_adjust, "red 0 0 0 -50"), "rgba(255,0,0,0.5)");
    }

    #[test]
    fn adjust_extra_args_ignored() {
        // h-adjust only takes a hue; the rest must not leak into s/l/a.
        assert_eq!(run(h_adjust, "#ff0000 0 -100 -100 -100"), "#ff0000");
    }

    #[test]
    fn adjust_invalid_color_is_empty() {
        assert_eq!(run(h_adjust, "notacolor, 10"), "");
        assert_eq!(run(hsla_adjust, ""), "");
    }

    #[test]
    fn adjust_color_function_argument() {
        assert_eq!(run(h_adjust, "rgb(255, 0, 0) 120"), "#00ff00");
    }

    #[test]
    fn hooks_can_override() {
        let mut process = Process::new();
        process.hooks.subscribe(Hook::ColorAdjustBefore, |p| {
            if let HookPayload::ColorAdjustBefore { color, deltas } = p {
                if color.as_str() == "brand" {
                    **color = "#ff0000".into();
                }
                deltas.h = Delta::from(240.0);
            }
        });
        assert_eq!(h_adjust("brand 10", None, &process), "#0000ff");

        process.hooks.subscribe(Hook::ColorAdjustAfter, |p| {
            if let HookPayload::ColorAdjustAfter { color, deltas } = p {
                **color = format!("{color} /* h={} */", deltas.h);
            }
        });
        assert_eq!(h_adjust("red 10", None, &process), "#0000ff /* h=240 */");
    }

    // ── this ──

    #[test]
    fn this_without_rule_is_empty() {
        assert_eq!(run(this, "color"), "");
        let mut ctx = Context::new();
        assert_eq!(run_in(this, "color, blue", &mut ctx, &Process::new()), "");
    }

    #[test]
    fn this_reads_current_rule() {
        let rule = SimpleRule::new(".a").with("color", "red").with("margin", "1px 2px");
        let mut ctx = Context::new().with_rule(rule);
        let p = Process::new();
        assert_eq!(run_in(this, "color", &mut ctx, &p), "red");
        assert_eq!(run_in(this, "margin-left", &mut ctx, &p), "2px");
        assert_eq!(run_in(this, "width, 10px", &mut ctx, &p), "10px");
        assert_eq!(run_in(this, "width", &mut ctx, &p), "");
    }

    // ── query ──

    fn family() -> (Rc<SimpleRule>, Rc<SimpleRule>, Rc<SimpleRule>, Rc<SimpleRule>) {
        let root = SimpleRule::new(".root").with("color", "black");
        let parent = SimpleRule::new(".parent").with("color", "navy").with("width", "100px");
        let a = SimpleRule::new(".a").with("color", "red");
        let b = SimpleRule::new(".b").with("color", "blue");
        parent.set_parent(&root);
        a.set_parent(&parent);
        b.set_parent(&parent);
        SimpleRule::link(&a, &b);
        (root, parent, a, b)
    }

    #[test]
    fn query_needs_property_and_args() {
        let p = Process::new();
        assert_eq!(run(query, "parent"), "");
        let mut ctx = Context::new();
        assert_eq!(run_in(query, "parent, color, x", &mut ctx, &p), "");
        let mut ctx = Context::new().with_property("color");
        assert_eq!(run_in(query, "", &mut ctx, &p), "");
    }

    #[test]
    fn query_navigation() {
        let (_root, parent, a, b) = family();
        let p = Process::new();

        let mut ctx = Context::new().with_property("color").with_rule(a.clone());
        assert_eq!(run_in(query, "parent", &mut ctx, &p), "navy");
        assert_eq!(run_in(query, "next", &mut ctx, &p), "blue");
        assert_eq!(run_in(query, "top", &mut ctx, &p), "black");
        assert_eq!(run_in(query, "parent, width", &mut ctx, &p), "100px");
        assert_eq!(run_in(query, "parent, default", &mut ctx, &p), "navy");
        assert_eq!(run_in(query, "PARENT", &mut ctx, &p), "navy");
        assert!(parent.is_processed());

        let mut ctx = Context::new().with_property("color").with_rule(b);
        assert_eq!(run_in(query, "previous", &mut ctx, &p), "red");
    }

    #[test]
    fn query_missing_target_uses_fallback() {
        let (root, _parent, a, _b) = family();
        let p = Process::new();

        let mut ctx = Context::new().with_property("color").with_rule(root);
        assert_eq!(run_in(query, "parent, color", &mut ctx, &p), "");
        assert_eq!(run_in(query, "parent, color, green", &mut ctx, &p), "green");
        assert_eq!(run_in(query, "top, color, green", &mut ctx, &p), "green");

        let mut ctx = Context::new().with_property("color").with_rule(a);
        assert_eq!(run_in(query, "previous, color, green", &mut ctx, &p), "green");
        assert_eq!(run_in(query, "parent, height, auto", &mut ctx, &p), "auto");
    }

    #[test]
    fn query_by_selector() {
        let mut p = Process::new();
        let target = SimpleRule::new("ul > li").with("color", "teal");
        p.add_reference("ul>li", target.clone());
        p.add_reference(".btn", SimpleRule::new(".btn").with("padding", "4px 8px"));

        let mut ctx = Context::new().with_property("color");
        assert_eq!(run_in(query, "ul  >li", &mut ctx, &p), "teal");
        assert!(target.is_processed());
        assert_eq!(run_in(query, ".btn, padding-left", &mut ctx, &p), "8px");
        assert_eq!(run_in(query, ".missing, color, x", &mut ctx, &p), "x");
    }

    #[test]
    fn query_rooted_ident_is_not_normalised() {
        let mut p = Process::new();
        p.references.set("header", SimpleRule::new("header").with("color", "olive"));
        let mut ctx = Context::new().with_property("color");
        assert_eq!(run_in(query, "header", &mut ctx, &p), "olive");
    }
}
