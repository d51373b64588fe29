//! State Machine Runtime
//!
//! Flat, table-driven state machines used for playback and gesture
//! lifecycles. States and events are small `Copy` enums supplied by the
//! owning component; unknown `(state, event)` pairs are ignored rather than
//! treated as errors, so redundant requests (pausing twice) are no-ops.

use smallvec::SmallVec;
use std::fmt::Debug;

/// Bound for state and event types
pub trait FsmSymbol: Copy + Eq + Debug + 'static {}

impl<T: Copy + Eq + Debug + 'static> FsmSymbol for T {}

/// A single `from --event--> to` edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S: FsmSymbol, E: FsmSymbol> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
    history_limit: usize,
}

impl<S: FsmSymbol, E: FsmSymbol> StateMachineBuilder<S, E> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Add a transition
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add the same event edge from several source states
    pub fn on_any(mut self, from: &[S], event: E, to: S) -> Self {
        for state in from {
            self.transitions.push(Transition::new(*state, event, to));
        }
        self
    }

    /// Keep at most `limit` entries of transition history
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            history: SmallVec::new(),
            history_limit: self.history_limit,
        }
    }
}

const DEFAULT_HISTORY_LIMIT: usize = 32;

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: Vec<Transition<S, E>>,
    /// Recent transitions, oldest first (for debugging)
    history: SmallVec<[(S, E, S); 8]>,
    history_limit: usize,
}

impl<S: FsmSymbol, E: FsmSymbol> StateMachine<S, E> {
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E>>) -> Self {
        Self {
            current_state: initial_state,
            transitions,
            history: SmallVec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn find(&self, event: E) -> Option<&Transition<S, E>> {
        let current = self.current_state;
        self.transitions
            .iter()
            .find(|t| t.from_state == current && t.event == event)
    }

    /// Check if an event can trigger a transition from the current state
    pub fn can_send(&self, event: E) -> bool {
        self.find(event).is_some()
    }

    /// Send an event; returns the new state if a transition fired
    pub fn send(&mut self, event: E) -> Option<S> {
        let from = self.current_state;
        let to = self.find(event)?.to_state;

        self.current_state = to;
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.remove(0);
            }
            self.history.push((from, event, to));
        }

        tracing::trace!(?from, ?event, ?to, "fsm transition");
        Some(to)
    }
}
