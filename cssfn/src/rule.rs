//! Rule-tree boundary.
//!
//! The engine never owns the document tree.  Context-sensitive built-ins
//! (`this`, `query`) only need to navigate from one rule to its neighbours
//! and read resolved declaration values, which is what [`Rule`] exposes.
//!
//! [`SimpleRule`] is a small in-memory implementation for embedders that do
//! not have a tree of their own, and for tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// The resolved-value tables a rule keeps per property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTable {
    /// Values visible to `this()`; available as soon as a declaration exists.
    Data,
    /// Values visible to `query()`; only filled once the rule is processed.
    QueryData,
}

/// A node in an externally-owned rule tree.
pub trait Rule {
    fn parent(&self) -> Option<Rc<dyn Rule>>;
    fn previous(&self) -> Option<Rc<dyn Rule>>;
    fn next(&self) -> Option<Rc<dyn Rule>>;

    /// Resolve this rule's declarations.  Must be idempotent.
    fn process(&self);

    /// Make sure `property` is present in `table` if it can be derived
    /// (e.g. a longhand from its shorthand).
    fn expand_data(&self, table: DataTable, property: &str);

    /// Read a resolved value.
    fn data(&self, table: DataTable, property: &str) -> Option<String>;
}

// ── SimpleRule ────────────────────────────────────────────────────────────────

/// In-memory [`Rule`] with weak neighbour links.
#[derive(Debug, Default)]
pub struct SimpleRule {
    selector: String,
    declarations: RefCell<Vec<(String, String)>>,
    parent: RefCell<Weak<SimpleRule>>,
    previous: RefCell<Weak<SimpleRule>>,
    next: RefCell<Weak<SimpleRule>>,
    data: RefCell<HashMap<String, String>>,
    query_data: RefCell<HashMap<String, String>>,
    processed: Cell<bool>,
}

impl SimpleRule {
    pub fn new(selector: impl Into<String>) -> Rc<Self> {
        Rc::new(SimpleRule {
            selector: selector.into(),
            ..Default::default()
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Append a declaration.  Later declarations of the same property win.
    pub fn declare(&self, property: impl Into<String>, value: impl Into<String>) {
        let (property, value) = (property.into(), value.into());
        self.data.borrow_mut().insert(property.clone(), value.clone());
        self.declarations.borrow_mut().push((property, value));
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn with(self: Rc<Self>, property: &str, value: &str) -> Rc<Self> {
        self.declare(property, value);
        self
    }

    pub fn set_parent(&self, parent: &Rc<SimpleRule>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }

    /// Make `next` the following sibling of `previous`.
    pub fn link(previous: &Rc<SimpleRule>, next: &Rc<SimpleRule>) {
        *previous.next.borrow_mut() = Rc::downgrade(next);
        *next.previous.borrow_mut() = Rc::downgrade(previous);
    }

    pub fn is_processed(&self) -> bool {
        self.processed.get()
    }

    fn table(&self, table: DataTable) -> &RefCell<HashMap<String, String>> {
        match table {
            DataTable::Data => &self.data,
            DataTable::QueryData => &self.query_data,
        }
    }
}

fn upcast(link: &RefCell<Weak<SimpleRule>>) -> Option<Rc<dyn Rule>> {
    link.borrow().upgrade().map(|r| r as Rc<dyn Rule>)
}

impl Rule for SimpleRule {
    fn parent(&self) -> Option<Rc<dyn Rule>> {
        upcast(&self.parent)
    }

    fn previous(&self) -> Option<Rc<dyn Rule>> {
        upcast(&self.previous)
    }

    fn next(&self) -> Option<Rc<dyn Rule>> {
        upcast(&self.next)
    }

    fn process(&self) {
        if self.processed.replace(true) {
            return;
        }
        let mut query_data = self.query_data.borrow_mut();
        for (property, value) in self.declarations.borrow().iter() {
            query_data.insert(property.clone(), value.clone());
        }
    }

    fn expand_data(&self, table: DataTable, property: &str) {
        let mut values = self.table(table).borrow_mut();
        if values.contains_key(property) {
            return;
        }
        let Some((shorthand, side)) = box_side(property) else {
            return;
        };
        if let Some(value) = values.get(shorthand).and_then(|v| box_value(v, side)) {
            values.insert(property.to_owned(), value);
        }
    }

    fn data(&self, table: DataTable, property: &str) -> Option<String> {
        self.table(table).borrow().get(property).cloned()
    }
}

// ── Box shorthands ────────────────────────────────────────────────────────────

const BOX_SHORTHANDS: &[&str] = &["margin", "padding", "border-width", "border-style", "border-color"];
const SIDES: &[&str] = &["top", "right", "bottom", "left"];

/// Split a longhand like `margin-top` into (`margin`, 0).
/// `border-top-width` style longhands map onto the `border-*` shorthands.
fn box_side(property: &str) -> Option<(&'static str, usize)> {
    for &shorthand in BOX_SHORTHANDS {
        for (i, &side) in SIDES.iter().enumerate() {
            let longhand = match shorthand.strip_prefix("border-") {
                Some(kind) => format!("border-{side}-{kind}"),
                None => format!("{shorthand}-{side}"),
            };
            if property.eq_ignore_ascii_case(&longhand) {
                return Some((shorthand, i));
            }
        }
    }
    None
}

/// The value for side `side` (top, right, bottom, left) of a 1–4 value
/// box shorthand.
fn box_value(shorthand_value: &str, side: usize) -> Option<String> {
    let parts: Vec<&str> = shorthand_value.split_whitespace().collect();
    let idx = match (parts.len(), side) {
        (1, _) => 0,
        (2, 0 | 2) => 0,
        (2, _) => 1,
        (3, 0) => 0,
        (3, 1 | 3) => 1,
        (3, _) => 2,
        (4, s) => s,
        _ => return None,
    };
    parts.get(idx).map(|s| (*s).to_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_available_before_processing() {
        let rule = SimpleRule::new(".a").with("color", "red");
        assert_eq!(rule.data(DataTable::Data, "color").as_deref(), Some("red"));
        assert_eq!(rule.data(DataTable::QueryData, "color"), None);
    }

    #[test]
    fn process_fills_query_data_once() {
        let rule = SimpleRule::new(".a").with("color", "red");
        rule.process();
        assert!(rule.is_processed());
        assert_eq!(rule.data(DataTable::QueryData, "color").as_deref(), Some("red"));

        // Later declarations don't leak into query data after processing.
        rule.declare("color", "blue");
        rule.process();
        assert_eq!(rule.data(DataTable::QueryData, "color").as_deref(), Some("red"));
        assert_eq!(rule.data(DataTable::Data, "color").as_deref(), Some("blue"));
    }

    #[test]
    fn navigation_links() {
        let parent = SimpleRule::new(".p");
        let a = SimpleRule::new(".a");
        let b = SimpleRule::new(".b").with("width", "10px");
        a.set_parent(&parent);
        SimpleRule::link(&a, &b);

        assert!(a.parent().is_some());
        assert!(a.previous().is_none());
        let next = a.next().unwrap();
        assert_eq!(next.data(DataTable::Data, "width").as_deref(), Some("10px"));
        assert!(b.previous().is_some());
    }

    #[test]
    fn dropped_neighbours_disappear() {
        let a = SimpleRule::new(".a");
        {
            let parent = SimpleRule::new(".p");
            a.set_parent(&parent);
            assert!(a.parent().is_some());
        }
        assert!(a.parent().is_none());
    }

    #[test]
    fn expand_box_longhands() {
        let rule = SimpleRule::new(".a")
            .with("margin", "1px 2px 3px")
            .with("border-color", "red blue");

        rule.expand_data(DataTable::Data, "margin-top");
        rule.expand_data(DataTable::Data, "margin-left");
        rule.expand_data(DataTable::Data, "margin-bottom");
        rule.expand_data(DataTable::Data, "border-left-color");
        assert_eq!(rule.data(DataTable::Data, "margin-top").as_deref(), Some("1px"));
        assert_eq!(rule.data(DataTable::Data, "margin-left").as_deref(), Some("2px"));
        assert_eq!(rule.data(DataTable::Data, "margin-bottom").as_deref(), Some("3px"));
        assert_eq!(rule.data(DataTable::Data, "border-left-color").as_deref(), Some("blue"));
    }

    #[test]
    fn expand_keeps_explicit_longhand() {
        let rule = SimpleRule::new(".a")
            .with("padding", "4px")
            .with("padding-top", "9px");
        rule.expand_data(DataTable::Data, "padding-top");
        assert_eq!(rule.data(DataTable::Data, "padding-top").as_deref(), Some("9px"));
    }

    #[test]
    fn box_value_rules() {
        assert_eq!(box_value("1 2 3 4", 3).as_deref(), Some("4"));
        assert_eq!(box_value("1 2", 3).as_deref(), Some("2"));
        assert_eq!(box_value("1", 2).as_deref(), Some("1"));
        assert_eq!(box_value("1 2 3 4 5", 0), None);
        assert_eq!(box_value("", 0), None);
    }
}
