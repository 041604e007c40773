//! Extension hooks.
//!
//! Built-ins raise a small, fixed set of named events so that an embedding
//! stylesheet engine can intercept values mid-computation.  Each [`Hook`] has
//! an explicit discriminant so that `hook as usize` is a stable index into
//! the per-hook subscriber lists held by [`HookBus`].

use crate::color::Deltas;

// ── Hook ──────────────────────────────────────────────────────────────────────

/// A hook event that built-in functions can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum Hook {
    /// Raised before a color is validated and adjusted.  Subscribers may
    /// rewrite the color and every delta.
    ColorAdjustBefore = 0,
    /// Raised after adjustment.  Subscribers may rewrite the result; the
    /// deltas are read-only.
    ColorAdjustAfter = 1,
}

impl Hook {
    /// Every hook variant in discriminant order.
    pub const ALL: &'static [Hook] = &[Hook::ColorAdjustBefore, Hook::ColorAdjustAfter];

    /// Total number of hook variants.
    pub const COUNT: usize = 2;

    /// The event name subscribers register against.
    pub fn name(self) -> &'static str {
        match self {
            Hook::ColorAdjustBefore => "color_adjust_before",
            Hook::ColorAdjustAfter => "color_adjust_after",
        }
    }
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Payload ───────────────────────────────────────────────────────────────────

/// Data handed to subscribers.  The variant always matches the hook that is
/// being emitted.
#[derive(Debug)]
pub enum HookPayload<'a> {
    ColorAdjustBefore {
        color: &'a mut String,
        deltas: &'a mut Deltas,
    },
    ColorAdjustAfter {
        color: &'a mut String,
        deltas: &'a Deltas,
    },
}

impl HookPayload<'_> {
    pub fn hook(&self) -> Hook {
        match self {
            HookPayload::ColorAdjustBefore { .. } => Hook::ColorAdjustBefore,
            HookPayload::ColorAdjustAfter { .. } => Hook::ColorAdjustAfter,
        }
    }
}

// ── HookBus ───────────────────────────────────────────────────────────────────

type Subscriber = Box<dyn Fn(&mut HookPayload<'_>)>;

/// Ordered subscriber lists, one per [`Hook`].
#[derive(Default)]
pub struct HookBus {
    subscribers: [Vec<Subscriber>; Hook::COUNT],
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for &h in Hook::ALL {
            map.entry(&h.name(), &self.subscribers[h as usize].len());
        }
        map.finish()
    }
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `f` to the subscribers of `hook`.  Subscribers run in
    /// registration order.
    pub fn subscribe<F>(&mut self, hook: Hook, f: F)
    where
        F: Fn(&mut HookPayload<'_>) + 'static,
    {
        self.subscribers[hook as usize].push(Box::new(f));
    }

    /// Run every subscriber of the payload's hook.
    pub fn emit(&self, payload: &mut HookPayload<'_>) {
        let subs = &self.subscribers[payload.hook() as usize];
        if !subs.is_empty() {
            tracing::trace!(hook = %payload.hook(), subscribers = subs.len(), "emitting hook");
        }
        for sub in subs {
            sub(payload);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
