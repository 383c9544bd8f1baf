//! Generic terminal device as seen by the engine.
//!
//! The engine never knows which display it drives. It owns a [`Term`], pushes
//! requests through [`Term::xtra`] and reads keys back with [`Term::inkey`].
//! The concrete back-end is a [`TermHook`] stored inside the term.

use std::collections::VecDeque;

use tracing::trace;

use crate::oracle::GameOracle;
use crate::types::{Keypress, Xtra, XtraStatus};

/// Failures surfaced to the engine's main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TermError {
    /// The input stream reached end-of-input while the engine waited for a key.
    #[error("terminal input closed")]
    InputClosed,

    /// The back-end refused an operation the engine requires.
    #[error("extended operation {0} not handled by the terminal back-end")]
    Unhandled(i32),
}

/// Bounded FIFO of keypresses waiting for the engine.
#[derive(Debug, Clone)]
pub struct KeyQueue {
    keys: VecDeque<Keypress>,
    capacity: usize,
}

impl KeyQueue {
    pub fn new(capacity: usize) -> Self {
        let bounded_capacity = capacity.max(1);
        Self {
            keys: VecDeque::with_capacity(bounded_capacity),
            capacity: bounded_capacity,
        }
    }

    /// Queue a keypress. Returns false (and drops the key) when full.
    pub fn push(&mut self, key: Keypress) -> bool {
        if self.keys.len() >= self.capacity {
            return false;
        }
        self.keys.push_back(key);
        true
    }

    pub fn pop(&mut self) -> Option<Keypress> {
        self.keys.pop_front()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypress> {
        self.keys.iter()
    }
}

/// Per-call context handed to a back-end.
///
/// Built fresh for every extended operation, so a back-end never holds on
/// to engine state between calls.
pub struct XtraContext<'a> {
    pub oracle: &'a dyn GameOracle,
    pub keys: &'a mut KeyQueue,
}

/// A display back-end.
pub trait TermHook {
    /// Perform extended operation `op` with auxiliary argument `v`.
    fn xtra(&mut self, ctx: &mut XtraContext<'_>, op: Xtra, v: i32) -> XtraStatus;
}

/// Terminal device owned by the engine.
pub struct Term<H> {
    width: u16,
    height: u16,
    keys: KeyQueue,
    hook: H,
}

impl<H: TermHook> Term<H> {
    pub fn new(width: u16, height: u16, key_capacity: usize, hook: H) -> Self {
        Self {
            width,
            height,
            keys: KeyQueue::new(key_capacity),
            hook,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn keys(&self) -> &KeyQueue {
        &self.keys
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn into_hook(self) -> H {
        self.hook
    }

    /// Issue one extended operation to the back-end.
    pub fn xtra(&mut self, oracle: &dyn GameOracle, op: Xtra, v: i32) -> XtraStatus {
        let mut ctx = XtraContext {
            oracle,
            keys: &mut self.keys,
        };
        let status = self.hook.xtra(&mut ctx, op, v);
        trace!(op = op.as_str(), v, status = status.code(), "xtra");
        status
    }

    /// Let the back-end pick up global setting changes.
    pub fn activate(&mut self, oracle: &dyn GameOracle) -> XtraStatus {
        self.xtra(oracle, Xtra::React, 0)
    }

    /// Make everything drawn so far visible.
    pub fn fresh(&mut self, oracle: &dyn GameOracle) -> XtraStatus {
        self.xtra(oracle, Xtra::Fresh, 0)
    }

    /// Drop pending input, both in the back-end and in the key queue.
    pub fn flush(&mut self, oracle: &dyn GameOracle) {
        let _ = self.xtra(oracle, Xtra::Flush, 0);
        self.keys.clear();
    }

    /// Queue a keypress as if the back-end had read it.
    pub fn keypress(&mut self, key: Keypress) -> bool {
        self.keys.push(key)
    }

    /// Next keypress.
    ///
    /// With `wait` set this polls the back-end until a key is queued.
    /// Without it, the back-end is polled once and `Ok(None)` comes back if
    /// nothing arrived.
    pub fn inkey(
        &mut self,
        oracle: &dyn GameOracle,
        wait: bool,
    ) -> Result<Option<Keypress>, TermError> {
        loop {
            if let Some(key) = self.keys.pop() {
                return Ok(Some(key));
            }

            match self.xtra(oracle, Xtra::Event, i32::from(wait)) {
                XtraStatus::Handled => {}
                XtraStatus::InputClosed => return Err(TermError::InputClosed),
                XtraStatus::Unhandled => return Err(TermError::Unhandled(Xtra::Event.code())),
            }

            if !wait && self.keys.is_empty() {
                return Ok(None);
            }
        }
    }
}
