// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Buffer Pool
//!
//! Arena of scratch buffers addressed by `(slot, generation)` handles. Freed slots keep their
//! storage and go on a free list; reusing a slot bumps its generation so that old handles are
//! recognized as stale.

use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A buffer that can be cleared without giving up its allocation.
pub trait ScratchBuffer: Default {
    fn reset(&mut self);
}

pub struct BufferRef<B> {
    slot: u32,
    generation: u32,
    _buffer: PhantomData<fn() -> B>,
}

impl<B> BufferRef<B> {
    fn new(slot: u32, generation: u32) -> Self {
        Self {
            slot,
            generation,
            _buffer: PhantomData,
        }
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<B> Clone for BufferRef<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for BufferRef<B> {}

impl<B> PartialEq for BufferRef<B> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<B> Eq for BufferRef<B> {}

impl<B> Hash for BufferRef<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<B> Debug for BufferRef<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BufferRef({}@{})", self.slot, self.generation)
    }
}

#[derive(Debug)]
enum SlotState<B> {
    Free(B),
    Live(B),
    /// checked out by a constructor, see [`Pool::take`]
    Taken,
}

#[derive(Debug)]
struct Slot<B> {
    generation: u32,
    state: SlotState<B>,
}

#[derive(Debug)]
pub struct Pool<B: ScratchBuffer> {
    slots: Vec<Slot<B>>,
    free: Vec<u32>,
}

impl<B: ScratchBuffer> Default for Pool<B> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<B: ScratchBuffer> Pool<B> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
        }
    }

    /// Returns an empty buffer, reusing a freed slot when possible.
    pub fn alloc(&mut self) -> BufferRef<B> {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            let buffer = match std::mem::replace(&mut entry.state, SlotState::Taken) {
                SlotState::Free(b) => b,
                _ => unreachable!("slot {slot} on the free list is in use"),
            };
            entry.state = SlotState::Live(buffer);
            BufferRef::new(slot, entry.generation)
        } else {
            let slot = self.slots.len() as u32;
            tracing::debug!("buffer pool grows to {} slots", slot + 1);
            self.slots.push(Slot {
                generation: 0,
                state: SlotState::Live(B::default()),
            });
            BufferRef::new(slot, 0)
        }
    }

    /// Resets the buffer and puts its slot on the free list. Returns `false` for a stale handle.
    pub fn free(&mut self, h: BufferRef<B>) -> bool {
        let Some(entry) = self.slots.get_mut(h.slot as usize) else {
            return false;
        };
        if entry.generation != h.generation {
            return false;
        }
        match std::mem::replace(&mut entry.state, SlotState::Taken) {
            SlotState::Live(mut b) => {
                b.reset();
                entry.state = SlotState::Free(b);
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(h.slot);
                true
            }
            other => {
                entry.state = other;
                false
            }
        }
    }

    fn live_entry(&mut self, h: BufferRef<B>) -> Option<&mut Slot<B>> {
        self.slots
            .get_mut(h.slot as usize)
            .filter(|e| e.generation == h.generation)
    }

    pub fn get(&self, h: BufferRef<B>) -> Option<&B> {
        match self.slots.get(h.slot as usize) {
            Some(Slot {
                generation,
                state: SlotState::Live(b),
            }) if *generation == h.generation => Some(b),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, h: BufferRef<B>) -> Option<&mut B> {
        match self.live_entry(h) {
            Some(Slot {
                state: SlotState::Live(b),
                ..
            }) => Some(b),
            _ => None,
        }
    }

    /// Moves the buffer out of its slot so that it can be used while the owner of the pool
    /// is mutably borrowed. Must be followed by [`Pool::restore`].
    pub fn take(&mut self, h: BufferRef<B>) -> Option<B> {
        let entry = self.live_entry(h)?;
        match std::mem::replace(&mut entry.state, SlotState::Taken) {
            SlotState::Live(b) => Some(b),
            other => {
                entry.state = other;
                None
            }
        }
    }

    pub fn restore(&mut self, h: BufferRef<B>, buffer: B) {
        if let Some(entry) = self.live_entry(h) {
            debug_assert!(matches!(entry.state, SlotState::Taken));
            entry.state = SlotState::Live(buffer);
        }
    }

    /// Scratch buffer for internal use: allocated and taken in one step.
    pub fn checkout(&mut self) -> (BufferRef<B>, B) {
        let h = self.alloc();
        let entry = &mut self.slots[h.slot as usize];
        match std::mem::replace(&mut entry.state, SlotState::Taken) {
            SlotState::Live(b) => (h, b),
            _ => unreachable!("freshly allocated slot"),
        }
    }

    /// Returns a buffer obtained through [`Pool::checkout`] and frees its slot.
    pub fn checkin(&mut self, h: BufferRef<B>, buffer: B) {
        self.restore(h, buffer);
        self.free(h);
    }

    /// number of slots currently handed out
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Scratch(Vec<u32>);

    impl ScratchBuffer for Scratch {
        fn reset(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn slots_are_recycled_with_a_new_generation() {
        let mut pool: Pool<Scratch> = Pool::default();
        let a = pool.alloc();
        pool.get_mut(a).unwrap().0.push(3);
        assert!(pool.free(a));
        assert!(!pool.free(a), "double free must be detected");
        let b = pool.alloc();
        assert_eq!(b.slot(), a.slot());
        assert_ne!(b, a);
        assert!(pool.get(a).is_none());
        assert!(pool.get(b).unwrap().0.is_empty(), "buffer was reset");
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn take_and_restore() {
        let mut pool: Pool<Scratch> = Pool::default();
        let a = pool.alloc();
        let mut buf = pool.take(a).unwrap();
        assert!(pool.get(a).is_none());
        assert!(pool.take(a).is_none());
        buf.0.push(1);
        pool.restore(a, buf);
        assert_eq!(pool.get(a).unwrap().0, vec![1]);

        let (h, scratch) = pool.checkout();
        assert_eq!(pool.live(), 2);
        pool.checkin(h, scratch);
        assert_eq!(pool.live(), 1);
    }
}
