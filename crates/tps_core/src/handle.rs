//! Type-safe generational handles
//!
//! A handle names a slot plus the generation the slot had when the handle was
//! issued. Once the slot is freed its generation moves on, so a handle kept
//! past its lifetime is detected instead of silently aliasing the next
//! occupant. Pools use this to catch double releases.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A type-safe handle to a slot holding a `T`
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a handle from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Create an invalid/null handle
    #[inline]
    pub const fn null() -> Self {
        Self::new(u32::MAX, u32::MAX)
    }

    /// Check if this handle is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }

    /// Slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at issue time
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into a single u64 (generation in the upper half)
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        (self.generation as u64) << 32 | self.index as u64
    }

    /// Unpack from [`Handle::to_bits`]
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self::new(bits as u32, (bits >> 32) as u32)
    }
}

// Manual impls so handles stay Copy/Eq regardless of T
impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        if self.is_null() {
            write!(f, "Handle<{}>(null)", short)
        } else {
            write!(f, "Handle<{}>({}v{})", short, self.index, self.generation)
        }
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

/// Allocates handles with generation tracking
pub struct HandleAllocator<T> {
    /// Current generation per slot
    generations: Vec<u32>,
    /// Whether each slot is currently handed out
    live: Vec<bool>,
    /// Freed slots available for reuse
    free_list: Vec<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HandleAllocator<T> {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// Create with a reserved slot capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            live: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocate a new handle
    pub fn allocate(&mut self) -> Handle<T> {
        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            return Handle::new(index, self.generations[index as usize]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        Handle::new(index, 0)
    }

    /// Free a handle. Returns false for stale, null or already-freed handles.
    pub fn free(&mut self, handle: Handle<T>) -> bool {
        if !self.is_valid(handle) {
            return false;
        }

        let index = handle.index() as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.live[index] = false;
        self.free_list.push(handle.index());
        true
    }

    /// Check if a handle refers to a live slot of the right generation
    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        if handle.is_null() {
            return false;
        }
        let index = handle.index() as usize;
        index < self.generations.len()
            && self.live[index]
            && self.generations[index] == handle.generation()
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }

    /// Check if no handles are live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalidate every outstanding handle
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, generation) in self.generations.iter_mut().enumerate() {
            if self.live[index] {
                *generation = generation.wrapping_add(1);
                self.live[index] = false;
            }
            self.free_list.push(index as u32);
        }
    }
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Enemy;

    #[test]
    fn test_handle_bits() {
        let handle: Handle<Enemy> = Handle::new(42, 7);
        assert_eq!(handle.index(), 42);
        assert_eq!(handle.generation(), 7);
        assert_eq!(Handle::<Enemy>::from_bits(handle.to_bits()), handle);
        assert!(Handle::<Enemy>::null().is_null());
        assert!(!handle.is_null());
    }

    #[test]
    fn test_allocator_reuse_bumps_generation() {
        let mut alloc = HandleAllocator::<Enemy>::new();
        let a = alloc.allocate();
        assert!(alloc.is_valid(a));

        assert!(alloc.free(a));
        assert!(!alloc.is_valid(a));

        let b = alloc.allocate();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(alloc.is_valid(b));
    }

    #[test]
    fn test_double_free_rejected() {
        let mut alloc = HandleAllocator::<Enemy>::new();
        let a = alloc.allocate();
        assert!(alloc.free(a));
        assert!(!alloc.free(a));
        assert_eq!(alloc.len(), 0);
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut alloc = HandleAllocator::<Enemy>::new();
        let handles: Vec<_> = (0..4).map(|_| alloc.allocate()).collect();
        alloc.clear();
        assert!(alloc.is_empty());
        assert!(handles.iter().all(|h| !alloc.is_valid(*h)));
    }
}
