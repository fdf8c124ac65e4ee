//! Generational handles and the arena that hands them out.
//!
//! A removed slot keeps its position but bumps its generation, so a handle to
//! a deleted neuron or edge resolves to `None` instead of aliasing whatever
//! later reuses the slot.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Handle to a neuron inside a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId {
    index: u32,
    generation: u32,
}

/// Handle to a weighted edge inside a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeightId {
    index: u32,
    generation: u32,
}

/// Conversion between a typed handle and its raw `(index, generation)` pair.
pub trait Handle: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(&self) -> u32;
    fn generation(&self) -> u32;
}

macro_rules! impl_handle {
    ($ty:ident, $prefix:literal) => {
        impl Handle for $ty {
            fn from_parts(index: u32, generation: u32) -> Self {
                $ty { index, generation }
            }
            fn index(&self) -> u32 {
                self.index
            }
            fn generation(&self) -> u32 {
                self.generation
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.generation == 0 {
                    write!(f, concat!($prefix, "{}"), self.index)
                } else {
                    write!(f, concat!($prefix, "{}v{}"), self.index, self.generation)
                }
            }
        }
    };
}

impl_handle!(NeuronId, "n");
impl_handle!(WeightId, "w");

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage addressed by generational handles.
#[derive(Debug, Clone)]
pub struct Arena<H, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> Arena<H, T> {
    pub fn new() -> Self {
        Arena { slots: Vec::new(), free: Vec::new(), len: 0, _handle: PhantomData }
    }

    pub fn insert(&mut self, value: T) -> H {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return H::from_parts(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, value: Some(value) });
        H::from_parts(index, 0)
    }

    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| (H::from_parts(i as u32, slot.generation), v))
        })
    }

    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(h, _)| h).collect()
    }
}

impl<H: Handle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let mut arena: Arena<NeuronId, &str> = Arena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        let b = arena.insert("b");

        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn display_includes_generation_after_reuse() {
        let mut arena: Arena<WeightId, ()> = Arena::new();
        let first = arena.insert(());
        assert_eq!(first.to_string(), "w0");
        arena.remove(first);
        let second = arena.insert(());
        assert_eq!(second.to_string(), "w0v1");
    }
}
