//! Motion value graph
//!
//! Push-based observer graph of animatable cells:
//! - Root values are written directly (`set`, `set_many`)
//! - Derived values recompute from their inputs through a transform chain
//!   whenever an input changes, and reject direct writes
//! - Subscribers run synchronously before a write returns
//!
//! Nodes live in a slot map arena; [`MotionValue<T>`] is a cheap `Copy`
//! handle. Edges are only inserted through [`MotionGraph::derive`],
//! [`MotionGraph::derive_combined`] and [`MotionGraph::link`]; `link` is the
//! one that can close a loop and checks reachability before inserting.
//!
//! # Example
//!
//! ```rust
//! use kinema_core::{MotionGraph, TransformChain};
//!
//! let mut graph = MotionGraph::new();
//! let x = graph.create(0.0_f32);
//! let scale = graph
//!     .derive(x, TransformChain::new([(-100.0, 0.5), (0.0, 1.0), (100.0, 1.5)]).unwrap())
//!     .unwrap();
//!
//! graph.set(x, 50.0).unwrap();
//! assert_eq!(graph.get(scale), Some(1.25));
//! ```

use crate::error::{MotionError, Result};
use crate::transform::TransformChain;
use crate::value::{Animatable, Value, ValueKind};
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

new_key_type! {
    /// Unique identifier for a motion value
    pub struct ValueId;
    /// Unique identifier for a subscription
    pub struct SubscriptionId;
}

/// Identifier handed out to exclusive drivers (gesture bindings)
pub type DriverId = u64;

/// Typed handle to a motion value (cheap to copy)
pub struct MotionValue<T> {
    id: ValueId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MotionValue<T> {
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// Reinterpret a raw id. Reads fail with `KindMismatch` if the stored
    /// value is not a `T`.
    pub fn from_id(id: ValueId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for MotionValue<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MotionValue<T> {}

impl<T> PartialEq for MotionValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for MotionValue<T> {}

impl<T> Hash for MotionValue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for MotionValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MotionValue").field(&self.id).finish()
    }
}

type Compute = Box<dyn Fn(&[f32]) -> Value>;

/// Inputs and mapping of a derived node
struct Derivation {
    inputs: SmallVec<[ValueId; 2]>,
    compute: Compute,
}

struct ValueNode {
    value: Value,
    derivation: Option<Derivation>,
    /// Derived nodes reading this one
    dependents: SmallVec<[ValueId; 4]>,
    /// In subscription order
    subscribers: SmallVec<[SubscriptionId; 4]>,
    /// 0 for roots, 1 + max(input depth) for derived nodes
    depth: u32,
    driver: Option<DriverId>,
}

impl ValueNode {
    fn root(value: Value) -> Self {
        Self {
            value,
            derivation: None,
            dependents: SmallVec::new(),
            subscribers: SmallVec::new(),
            depth: 0,
            driver: None,
        }
    }
}

struct Subscriber {
    value: ValueId,
    callback: Box<dyn FnMut(&Value)>,
}

/// Arena owning every motion value of one engine instance
pub struct MotionGraph {
    nodes: SlotMap<ValueId, ValueNode>,
    subscribers: SlotMap<SubscriptionId, Subscriber>,
    next_driver: DriverId,
}

impl MotionGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            subscribers: SlotMap::with_key(),
            next_driver: 1,
        }
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    /// Create a writable motion value
    pub fn create<T: Animatable>(&mut self, initial: T) -> MotionValue<T> {
        MotionValue::from_id(self.nodes.insert(ValueNode::root(initial.into_value())))
    }

    /// Current value, or `None` if removed or of another kind
    pub fn get<T: Animatable>(&self, value: MotionValue<T>) -> Option<T> {
        self.nodes
            .get(value.id)
            .and_then(|node| T::from_value(node.value))
    }

    /// Type-erased read
    pub fn value(&self, id: ValueId) -> Option<Value> {
        self.nodes.get(id).map(|node| node.value)
    }

    pub fn kind(&self, id: ValueId) -> Option<ValueKind> {
        self.nodes.get(id).map(|node| node.value.kind())
    }

    pub fn contains(&self, id: ValueId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_derived(&self, id: ValueId) -> bool {
        self.nodes
            .get(id)
            .map(|node| node.derivation.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store and notify
    pub fn set<T: Animatable>(&mut self, value: MotionValue<T>, new_value: T) -> Result<()> {
        self.set_many([(value.id, new_value.into_value())])
    }

    /// Type-erased write
    pub fn set_value(&mut self, id: ValueId, new_value: Value) -> Result<()> {
        self.set_many([(id, new_value)])
    }

    /// Write several values as one mutation.
    ///
    /// Every write is validated before any is stored, so a failing batch
    /// leaves the graph untouched. Subscribers only run once all values of
    /// the batch (and everything derived from them) are in place.
    pub fn set_many(&mut self, writes: impl IntoIterator<Item = (ValueId, Value)>) -> Result<()> {
        let writes: SmallVec<[(ValueId, Value); 8]> = writes.into_iter().collect();

        for (id, new_value) in &writes {
            let node = self.nodes.get(*id).ok_or(MotionError::UnknownValue)?;
            if node.derivation.is_some() {
                return Err(MotionError::ReadOnly(*id));
            }
            if node.value.kind() != new_value.kind() {
                return Err(MotionError::KindMismatch {
                    expected: node.value.kind(),
                    found: new_value.kind(),
                });
            }
        }

        let mut roots: SmallVec<[ValueId; 8]> = SmallVec::new();
        for (id, new_value) in writes {
            self.nodes[id].value = new_value;
            if !roots.contains(&id) {
                roots.push(id);
            }
        }

        self.propagate(&roots);
        Ok(())
    }

    /// Recompute everything downstream of `changed`, then notify.
    ///
    /// `changed` must already hold their new values.
    fn propagate(&mut self, changed: &[ValueId]) {
        let mut seen: FxHashSet<ValueId> = changed.iter().copied().collect();
        let mut affected: Vec<ValueId> = Vec::new();
        let mut stack: Vec<ValueId> = changed.to_vec();

        while let Some(id) = stack.pop() {
            for dependent in &self.nodes[id].dependents {
                if seen.insert(*dependent) {
                    affected.push(*dependent);
                    stack.push(*dependent);
                }
            }
        }

        // Depth order guarantees inputs are fresh before a node recomputes
        affected.sort_by_key(|id| self.nodes[*id].depth);
        for id in &affected {
            self.recompute(*id);
        }

        for id in changed.iter().chain(affected.iter()) {
            self.notify(*id);
        }
    }

    fn recompute(&mut self, id: ValueId) {
        let inputs: SmallVec<[f32; 4]> = match &self.nodes[id].derivation {
            Some(derivation) => derivation
                .inputs
                .iter()
                .map(|input| self.nodes[*input].value.as_number().unwrap_or_default())
                .collect(),
            None => return,
        };

        let node = &mut self.nodes[id];
        if let Some(next) = node.derivation.as_ref().map(|d| (d.compute)(&inputs)) {
            node.value = next;
        }
    }

    fn notify(&mut self, id: ValueId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let value = node.value;
        let subscribers = node.subscribers.clone();

        for sub_id in subscribers {
            if let Some(sub) = self.subscribers.get_mut(sub_id) {
                (sub.callback)(&value);
            }
        }
    }

    /// Remove a value, its subscriptions and every value derived from it.
    ///
    /// Returns how many values were removed.
    pub fn remove(&mut self, id: ValueId) -> Result<usize> {
        if !self.nodes.contains_key(id) {
            return Err(MotionError::UnknownValue);
        }

        let mut doomed: Vec<ValueId> = vec![id];
        let mut seen: FxHashSet<ValueId> = FxHashSet::default();
        seen.insert(id);
        let mut cursor = 0;
        while cursor < doomed.len() {
            for dependent in &self.nodes[doomed[cursor]].dependents {
                if seen.insert(*dependent) {
                    doomed.push(*dependent);
                }
            }
            cursor += 1;
        }

        for doomed_id in &doomed {
            if let Some(node) = self.nodes.remove(*doomed_id) {
                for sub in node.subscribers {
                    self.subscribers.remove(sub);
                }
                if let Some(derivation) = node.derivation {
                    for input in derivation.inputs {
                        if let Some(input_node) = self.nodes.get_mut(input) {
                            input_node.dependents.retain(|d| *d != *doomed_id);
                        }
                    }
                }
            }
        }

        tracing::trace!(removed = doomed.len(), "motion values removed");
        Ok(doomed.len())
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// New read-only value following `input` through `chain`
    pub fn derive<T: Animatable>(
        &mut self,
        input: MotionValue<f32>,
        chain: TransformChain<T>,
    ) -> Result<MotionValue<T>> {
        self.derive_inner(&[input.id], Box::new(move |inputs| chain.sample(inputs[0]).into_value()))
    }

    /// New read-only value combining several inputs before the chain,
    /// e.g. distance from `(x, y)` mapped to opacity
    pub fn derive_combined<T, F>(
        &mut self,
        inputs: &[MotionValue<f32>],
        combine: F,
        chain: TransformChain<T>,
    ) -> Result<MotionValue<T>>
    where
        T: Animatable,
        F: Fn(&[f32]) -> f32 + 'static,
    {
        let ids: SmallVec<[ValueId; 2]> = inputs.iter().map(|v| v.id).collect();
        self.derive_inner(
            &ids,
            Box::new(move |values| chain.sample(combine(values)).into_value()),
        )
    }

    fn derive_inner<T: Animatable>(
        &mut self,
        inputs: &[ValueId],
        compute: Compute,
    ) -> Result<MotionValue<T>> {
        let values = self.number_inputs(inputs)?;
        let initial = compute(&values);
        let id = self.nodes.insert(ValueNode::root(initial));
        self.attach(id, inputs, compute);
        tracing::trace!(?id, inputs = inputs.len(), "derived motion value created");
        Ok(MotionValue::from_id(id))
    }

    /// Drive an existing value from `inputs` through `chain`.
    ///
    /// Rejects the link with `CyclicDependency` if `output` already feeds
    /// any of the inputs (or is one of them). Replaces any previous
    /// derivation of `output`.
    pub fn link<T: Animatable>(
        &mut self,
        inputs: &[MotionValue<f32>],
        output: MotionValue<T>,
        chain: TransformChain<T>,
    ) -> Result<()> {
        let ids: SmallVec<[ValueId; 2]> = inputs.iter().map(|v| v.id).collect();
        let output_id = output.id;

        let current_kind = self.kind(output_id).ok_or(MotionError::UnknownValue)?;
        let values = self.number_inputs(&ids)?;

        for input in &ids {
            if *input == output_id || self.reaches(output_id, *input) {
                tracing::debug!(?input, output = ?output_id, "rejected cyclic link");
                return Err(MotionError::CyclicDependency {
                    input: *input,
                    output: output_id,
                });
            }
        }

        let compute: Compute = if ids.len() == 1 {
            Box::new(move |v| chain.sample(v[0]).into_value())
        } else {
            // Several inputs without a combiner: chain reads their sum
            Box::new(move |v| chain.sample(v.iter().sum()).into_value())
        };

        let initial = compute(&values);
        if initial.kind() != current_kind {
            return Err(MotionError::KindMismatch {
                expected: current_kind,
                found: initial.kind(),
            });
        }

        self.detach(output_id);
        self.attach(output_id, &ids, compute);
        self.nodes[output_id].value = initial;
        self.propagate(&[output_id]);
        Ok(())
    }

    /// Drop the derivation of `output`, making it writable again
    pub fn unlink(&mut self, output: ValueId) -> Result<()> {
        if !self.nodes.contains_key(output) {
            return Err(MotionError::UnknownValue);
        }
        self.detach(output);
        self.refresh_depth(output);
        Ok(())
    }

    fn number_inputs(&self, inputs: &[ValueId]) -> Result<SmallVec<[f32; 4]>> {
        inputs
            .iter()
            .map(|id| {
                let node = self.nodes.get(*id).ok_or(MotionError::UnknownValue)?;
                node.value.as_number().ok_or(MotionError::KindMismatch {
                    expected: ValueKind::Number,
                    found: node.value.kind(),
                })
            })
            .collect()
    }

    fn attach(&mut self, output: ValueId, inputs: &[ValueId], compute: Compute) {
        for input in inputs {
            let dependents = &mut self.nodes[*input].dependents;
            if !dependents.contains(&output) {
                dependents.push(output);
            }
        }
        self.nodes[output].derivation = Some(Derivation {
            inputs: SmallVec::from_slice(inputs),
            compute,
        });
        self.refresh_depth(output);
    }

    fn detach(&mut self, output: ValueId) {
        if let Some(derivation) = self.nodes[output].derivation.take() {
            for input in derivation.inputs {
                if let Some(node) = self.nodes.get_mut(input) {
                    node.dependents.retain(|d| *d != output);
                }
            }
        }
    }

    /// Recompute depth of `id` and everything downstream
    fn refresh_depth(&mut self, id: ValueId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let depth = match &self.nodes[current].derivation {
                Some(d) => 1 + d.inputs.iter().map(|i| self.nodes[*i].depth).max().unwrap_or(0),
                None => 0,
            };
            let node = &mut self.nodes[current];
            node.depth = depth;
            stack.extend(node.dependents.iter().copied());
        }
    }

    /// Whether `to` is reachable from `from` along dependent edges
    fn reaches(&self, from: ValueId, to: ValueId) -> bool {
        let mut seen: FxHashSet<ValueId> = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if seen.insert(id) {
                stack.extend(self.nodes[id].dependents.iter().copied());
            }
        }
        false
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Run `callback` after every mutation of `value`
    pub fn subscribe<T, F>(&mut self, value: MotionValue<T>, mut callback: F) -> Result<SubscriptionId>
    where
        T: Animatable,
        F: FnMut(T) + 'static,
    {
        let node = self.nodes.get(value.id).ok_or(MotionError::UnknownValue)?;
        if T::from_value(node.value).is_none() {
            let stored = node.value.kind();
            let requested = match stored {
                ValueKind::Number => ValueKind::Color,
                ValueKind::Color => ValueKind::Number,
            };
            return Err(MotionError::KindMismatch {
                expected: stored,
                found: requested,
            });
        }

        let sub_id = self.subscribers.insert(Subscriber {
            value: value.id,
            callback: Box::new(move |v| {
                if let Some(typed) = T::from_value(*v) {
                    callback(typed);
                }
            }),
        });
        self.nodes[value.id].subscribers.push(sub_id);
        Ok(sub_id)
    }

    /// Returns `false` if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscribers.remove(id) {
            Some(sub) => {
                if let Some(node) = self.nodes.get_mut(sub.value) {
                    node.subscribers.retain(|s| *s != id);
                }
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self, id: ValueId) -> usize {
        self.nodes
            .get(id)
            .map(|node| node.subscribers.len())
            .unwrap_or(0)
    }

    // =========================================================================
    // DRIVER CLAIMS
    // =========================================================================

    /// Fresh id for an exclusive driver
    pub fn allocate_driver(&mut self) -> DriverId {
        let id = self.next_driver;
        self.next_driver += 1;
        id
    }

    /// Claim exclusive ownership of a writable value.
    ///
    /// Claiming again with the same driver is a no-op.
    pub fn claim(&mut self, id: ValueId, driver: DriverId) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(MotionError::UnknownValue)?;
        if node.derivation.is_some() {
            return Err(MotionError::ReadOnly(id));
        }
        match node.driver {
            Some(owner) if owner != driver => Err(MotionError::GestureConflict { value: id }),
            _ => {
                node.driver = Some(driver);
                Ok(())
            }
        }
    }

    /// Release a claim held by `driver`; claims held by others are untouched
    pub fn release(&mut self, id: ValueId, driver: DriverId) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.driver == Some(driver) {
                node.driver = None;
            }
        }
    }

    pub fn driver_of(&self, id: ValueId) -> Option<DriverId> {
        self.nodes.get(id).and_then(|node| node.driver)
    }
}

impl Default for MotionGraph {
    fn default() -> Self {
        Self::new()
    }
}
