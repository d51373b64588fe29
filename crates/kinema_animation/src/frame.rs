//! Frame requests
//!
//! Components never loop on their own. They ask a [`FrameDriver`] for the
//! next animation frame and receive a [`TickToken`]; the host calls back
//! with that token when the frame arrives. Cancelling, or requesting a new
//! frame, supersedes older tokens, and a callback carrying a superseded
//! token does nothing.

use crate::clock::Clock;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle for one requested animation frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickToken(u64);

impl TickToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Host hook for scheduling animation frames
pub trait FrameDriver {
    fn request_tick(&self) -> TickToken;
    fn cancel_tick(&self, token: TickToken);
}

/// Bundled [`FrameDriver`]: records requests until the host drains them
#[derive(Default)]
pub struct FrameQueue {
    next_token: Cell<u64>,
    pending: RefCell<Vec<TickToken>>,
    wake: RefCell<Option<Box<dyn Fn()>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called whenever the queue goes from empty to non-empty, so an idle
    /// event loop knows to schedule a frame
    pub fn set_wake_callback<F: Fn() + 'static>(&self, wake: F) {
        *self.wake.borrow_mut() = Some(Box::new(wake));
    }

    /// Drain the tokens due this frame, in request order
    pub fn take_due(&self) -> Vec<TickToken> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_pending(&self, token: TickToken) -> bool {
        self.pending.borrow().contains(&token)
    }
}

impl FrameDriver for FrameQueue {
    fn request_tick(&self) -> TickToken {
        let token = TickToken(self.next_token.get());
        self.next_token.set(token.0 + 1);

        let was_idle = {
            let mut pending = self.pending.borrow_mut();
            pending.push(token);
            pending.len() == 1
        };

        if was_idle {
            if let Some(wake) = self.wake.borrow().as_ref() {
                wake();
            }
        }
        token
    }

    fn cancel_tick(&self, token: TickToken) {
        self.pending.borrow_mut().retain(|t| *t != token);
    }
}

/// Clock and frame driver shared by every component of one scheduler
#[derive(Clone)]
pub struct FrameContext {
    pub clock: Rc<dyn Clock>,
    pub driver: Rc<dyn FrameDriver>,
}

impl FrameContext {
    pub fn new(clock: Rc<dyn Clock>, driver: Rc<dyn FrameDriver>) -> Self {
        Self { clock, driver }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn request_tick(&self) -> TickToken {
        self.driver.request_tick()
    }

    pub fn cancel_tick(&self, token: TickToken) {
        self.driver.cancel_tick(token);
    }
}

/// Pending frame of one component; at most one token is live at a time
#[derive(Debug, Default)]
pub(crate) struct FrameSlot {
    token: Option<TickToken>,
}

impl FrameSlot {
    /// Request a frame unless one is already pending
    pub(crate) fn arm(&mut self, ctx: &FrameContext) {
        if self.token.is_none() {
            self.token = Some(ctx.request_tick());
        }
    }

    pub(crate) fn cancel(&mut self, ctx: &FrameContext) {
        if let Some(token) = self.token.take() {
            ctx.cancel_tick(token);
        }
    }

    /// Consume `token` if it is the live one; stale tokens return `false`
    pub(crate) fn accept(&mut self, token: TickToken) -> bool {
        if self.token == Some(token) {
            self.token = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn pending(&self) -> Option<TickToken> {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_queue_hands_out_tokens_in_order() {
        let queue = FrameQueue::new();
        let a = queue.request_tick();
        let b = queue.request_tick();

        assert!(a < b);
        assert_eq!(queue.take_due(), vec![a, b]);
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_cancelled_tokens_are_not_due() {
        let queue = FrameQueue::new();
        let a = queue.request_tick();
        let b = queue.request_tick();
        queue.cancel_tick(a);

        assert!(!queue.is_pending(a));
        assert_eq!(queue.take_due(), vec![b]);
    }

    #[test]
    fn test_wake_fires_on_first_request_only() {
        let queue = FrameQueue::new();
        let wakes = Rc::new(Cell::new(0));
        let counter = wakes.clone();
        queue.set_wake_callback(move || counter.set(counter.get() + 1));

        queue.request_tick();
        queue.request_tick();
        assert_eq!(wakes.get(), 1);

        queue.take_due();
        queue.request_tick();
        assert_eq!(wakes.get(), 2);
    }

    #[test]
    fn test_frame_slot_rejects_stale_tokens() {
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(Rc::new(ManualClock::new(0.0)), queue.clone());
        let mut slot = FrameSlot::default();

        slot.arm(&ctx);
        let first = slot.pending().unwrap();
        slot.arm(&ctx);
        assert_eq!(queue.pending_count(), 1);

        slot.cancel(&ctx);
        slot.arm(&ctx);
        assert!(!slot.accept(first));
        let second = slot.pending().unwrap();
        assert!(slot.accept(second));
        assert!(slot.pending().is_none());
    }
}
