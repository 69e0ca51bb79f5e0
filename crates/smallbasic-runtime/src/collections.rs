//! Named stacks and queues.
//!
//! Unlike handle registries, the names here are chosen by the caller and a
//! collection springs into existence the first time something is pushed
//! onto it.

use std::collections::VecDeque;
use std::marker::PhantomData;

use dashmap::DashMap;

use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

/// Which end of the sequence `take` removes from
pub trait Discipline {
    const KIND: &'static str;

    fn take(items: &mut VecDeque<Value>) -> Option<Value>;
    fn peek(items: &VecDeque<Value>) -> Option<&Value>;
}

/// Last in, first out
pub struct Lifo;

/// First in, first out
pub struct Fifo;

impl Discipline for Lifo {
    const KIND: &'static str = "Stack";

    fn take(items: &mut VecDeque<Value>) -> Option<Value> {
        items.pop_back()
    }

    fn peek(items: &VecDeque<Value>) -> Option<&Value> {
        items.back()
    }
}

impl Discipline for Fifo {
    const KIND: &'static str = "Queue";

    fn take(items: &mut VecDeque<Value>) -> Option<Value> {
        items.pop_front()
    }

    fn peek(items: &VecDeque<Value>) -> Option<&Value> {
        items.front()
    }
}

pub struct NamedCollection<D> {
    collections: DashMap<String, VecDeque<Value>>,
    _discipline: PhantomData<fn() -> D>,
}

pub type Stack = NamedCollection<Lifo>;
pub type Queue = NamedCollection<Fifo>;

impl<D: Discipline> NamedCollection<D> {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            _discipline: PhantomData,
        }
    }

    /// Add a value, creating the collection on first use
    pub fn push(&self, name: &str, value: impl Into<Value>) {
        let mut items = self.collections.entry(name.to_string()).or_default();
        items.push_back(value.into());
        tracing::trace!(kind = D::KIND, name, count = items.len(), "Pushed value");
    }

    /// Remove and return the next value according to the discipline
    pub fn take(&self, name: &str) -> RuntimeResult<Value> {
        let mut items = self
            .collections
            .get_mut(name)
            .ok_or_else(|| RuntimeError::not_found(D::KIND, name))?;
        D::take(&mut items).ok_or_else(|| RuntimeError::empty(D::KIND, name))
    }

    pub fn peek(&self, name: &str) -> RuntimeResult<Value> {
        let items = self
            .collections
            .get(name)
            .ok_or_else(|| RuntimeError::not_found(D::KIND, name))?;
        D::peek(&items)
            .cloned()
            .ok_or_else(|| RuntimeError::empty(D::KIND, name))
    }

    pub fn count(&self, name: &str) -> RuntimeResult<usize> {
        self.collections
            .get(name)
            .map(|items| items.len())
            .ok_or_else(|| RuntimeError::not_found(D::KIND, name))
    }

    /// Drop a collection with everything in it
    pub fn remove(&self, name: &str) -> bool {
        self.collections.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl<D: Discipline> Default for NamedCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_stack_is_lifo() {
        let stack = Stack::new();
        stack.push("s", 1);
        stack.push("s", "two");
        assert_eq!(stack.count("s").unwrap(), 2);
        assert_eq!(stack.take("s").unwrap(), Value::from("two"));
        assert_eq!(stack.take("s").unwrap(), Value::from(1));
    }

    #[test]
    fn test_queue_is_fifo() {
        let queue = Queue::new();
        queue.push("q", "v1");
        queue.push("q", "v2");
        assert_eq!(queue.peek("q").unwrap(), Value::from("v1"));
        assert_eq!(queue.take("q").unwrap(), Value::from("v1"));
        assert_eq!(queue.take("q").unwrap(), Value::from("v2"));
    }

    #[test]
    fn test_missing_and_empty_are_distinct() {
        let stack = Stack::new();
        assert!(matches!(
            stack.take("nope").unwrap_err().kind(),
            ErrorKind::NotFound { .. }
        ));
        assert!(stack.count("nope").unwrap_err().is_not_found());

        stack.push("s", true);
        stack.take("s").unwrap();
        assert!(matches!(
            stack.take("s").unwrap_err().kind(),
            ErrorKind::Empty { kind: "Stack", .. }
        ));
        assert_eq!(stack.count("s").unwrap(), 0);
    }

    #[test]
    fn test_remove() {
        let queue = Queue::new();
        queue.push("q", 1);
        assert!(queue.remove("q"));
        assert!(!queue.remove("q"));
        assert!(queue.take("q").unwrap_err().is_not_found());
    }

    proptest! {
        #[test]
        fn stack_pop_returns_reverse_order(values in prop::collection::vec(-1e6f64..1e6, 1..32)) {
            let stack = Stack::new();
            for v in &values {
                stack.push("p", *v);
            }
            for v in values.iter().rev() {
                prop_assert_eq!(stack.take("p").unwrap(), Value::Number(*v));
            }
        }

        #[test]
        fn queue_dequeue_preserves_order(values in prop::collection::vec(".*", 1..32)) {
            let queue = Queue::new();
            for v in &values {
                queue.push("p", v.as_str());
            }
            for v in &values {
                prop_assert_eq!(queue.take("p").unwrap(), Value::from(v.as_str()));
            }
        }
    }
}
