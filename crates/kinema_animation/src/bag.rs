//! Property bags
//!
//! A [`PropertyBag`] is an ordered set of named values produced by a
//! timeline phase or a choreography step. [`PropertyBindings`] maps those
//! names onto motion values so a bag can be written in one atomic batch.

use indexmap::IndexMap;
use kinema_core::{Animatable, Color, MotionError, MotionGraph, MotionValue, Result, Value, ValueId};
use smallvec::SmallVec;
use std::borrow::Cow;

/// Property name, usually a `&'static str` literal
pub type PropertyName = Cow<'static, str>;

/// Ordered map of property name to value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    values: IndexMap<PropertyName, Value>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<PropertyName>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<PropertyName>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn number(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(|v| v.as_number())
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(|v| v.as_color())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_ref())
    }

    /// Same property names, ignoring order
    pub fn same_keys(&self, other: &PropertyBag) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains(k))
    }

    /// Interpolate every property of `self` toward `other`; properties
    /// missing from `other` keep their value
    pub fn lerp(&self, other: &PropertyBag, t: f32) -> PropertyBag {
        let values = self
            .values
            .iter()
            .map(|(name, from)| {
                let value = match other.values.get(name) {
                    Some(to) => from.lerp(to, t),
                    None => *from,
                };
                (name.clone(), value)
            })
            .collect();
        PropertyBag { values }
    }
}

impl<N: Into<PropertyName>> FromIterator<(N, Value)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

/// Property name to motion value table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBindings {
    bindings: IndexMap<PropertyName, ValueId>,
}

impl PropertyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style bind
    pub fn bind<T: Animatable>(mut self, name: impl Into<PropertyName>, value: MotionValue<T>) -> Self {
        self.insert(name, value.id());
        self
    }

    pub fn insert(&mut self, name: impl Into<PropertyName>, id: ValueId) {
        self.bindings.insert(name.into(), id);
    }

    pub fn get(&self, name: &str) -> Option<ValueId> {
        self.bindings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ValueId)> {
        self.bindings.iter().map(|(k, v)| (k.as_ref(), *v))
    }

    /// Check that `bag` produces every bound property with the bound
    /// value's kind
    pub fn validate(&self, graph: &MotionGraph, bag: &PropertyBag) -> Result<()> {
        for (name, id) in self.iter() {
            let produced = bag
                .get(name)
                .ok_or_else(|| MotionError::UnboundProperty(name.to_string()))?;
            let bound = graph.kind(id).ok_or(MotionError::UnknownValue)?;
            if bound != produced.kind() {
                return Err(MotionError::KindMismatch {
                    expected: bound,
                    found: produced.kind(),
                });
            }
        }
        Ok(())
    }

    /// Write every bound property present in `bag` as one batch.
    /// Unbound properties are ignored.
    pub fn apply(&self, graph: &mut MotionGraph, bag: &PropertyBag) -> Result<()> {
        let writes: SmallVec<[(ValueId, Value); 8]> = self
            .iter()
            .filter_map(|(name, id)| bag.get(name).map(|value| (id, value)))
            .collect();
        graph.set_many(writes)
    }

    /// Current values of every bound property
    pub fn snapshot(&self, graph: &MotionGraph) -> Result<PropertyBag> {
        self.bindings
            .iter()
            .map(|(name, id)| {
                let value = graph.value(*id).ok_or(MotionError::UnknownValue)?;
                Ok((name.clone(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_builder_keeps_insertion_order() {
        let bag = PropertyBag::new()
            .with("x", 10.0)
            .with("scale", 1.5)
            .with("background", Color::WHITE);

        assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["x", "scale", "background"]);
        assert_eq!(bag.number("scale"), Some(1.5));
        assert_eq!(bag.color("background"), Some(Color::WHITE));
        assert_eq!(bag.number("background"), None);
    }

    #[test]
    fn test_same_keys_ignores_order() {
        let a = PropertyBag::new().with("x", 0.0).with("y", 0.0);
        let b = PropertyBag::new().with("y", 1.0).with("x", 1.0);
        let c = PropertyBag::new().with("x", 1.0);

        assert!(a.same_keys(&b));
        assert!(!a.same_keys(&c));
    }

    #[test]
    fn test_bag_lerp() {
        let a = PropertyBag::new().with("opacity", 0.0).with("x", 5.0);
        let b = PropertyBag::new().with("opacity", 1.0);

        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.number("opacity"), Some(0.5));
        assert_eq!(mid.number("x"), Some(5.0));
    }

    #[test]
    fn test_bindings_apply_and_snapshot() {
        let mut graph = MotionGraph::new();
        let x = graph.create(0.0_f32);
        let tint = graph.create(Color::BLACK);
        let bindings = PropertyBindings::new().bind("x", x).bind("background", tint);

        let bag = PropertyBag::new()
            .with("x", 42.0)
            .with("background", Color::WHITE)
            .with("ignored", 1.0);
        bindings.apply(&mut graph, &bag).unwrap();

        assert_eq!(graph.get(x), Some(42.0));
        assert_eq!(graph.get(tint), Some(Color::WHITE));

        let snapshot = bindings.snapshot(&graph).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.number("x"), Some(42.0));
    }

    #[test]
    fn test_validate_reports_missing_and_mismatched() {
        let mut graph = MotionGraph::new();
        let x = graph.create(0.0_f32);
        let bindings = PropertyBindings::new().bind("x", x);

        let missing = PropertyBag::new().with("y", 1.0);
        assert_eq!(
            bindings.validate(&graph, &missing),
            Err(MotionError::UnboundProperty("x".into()))
        );

        let wrong_kind = PropertyBag::new().with("x", Color::WHITE);
        assert!(matches!(
            bindings.validate(&graph, &wrong_kind),
            Err(MotionError::KindMismatch { .. })
        ));
    }
}
