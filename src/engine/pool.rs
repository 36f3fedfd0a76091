//! Object pool for transient entities
//!
//! A slot map: slots are pre-allocated, reused through a free list, and
//! addressed by handles that carry a generation counter so a handle kept
//! past its release can never alias the slot's next occupant.
//!
//! Acquisition never fails. When every slot is in use the pool grows by one
//! slot (soft cap). `compact` trims trailing free slots that accumulated past
//! the nominal capacity without touching live entries.

/// Reset an object back to its pooled default state
pub trait Poolable: Default {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stable, generation-checked reference to a pooled object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

#[derive(Debug, Clone)]
pub struct Pool<T: Poolable> {
    slots: Vec<Slot<T>>,
    /// Free slot indices; popped from the end, so kept sorted descending
    free: Vec<u32>,
    nominal: usize,
    active: usize,
    /// Lowest generation a regrown slot may start at; raised by `compact`
    generation_floor: u32,
}

impl<T: Poolable> Pool<T> {
    /// Create a pool pre-populated with `nominal` inactive slots
    pub fn new(nominal: usize) -> Self {
        let slots = (0..nominal)
            .map(|_| Slot {
                value: T::default(),
                generation: 0,
                active: false,
            })
            .collect();
        Self {
            slots,
            free: (0..nominal as u32).rev().collect(),
            nominal,
            active: 0,
            generation_floor: 0,
        }
    }

    /// Claim a slot (lowest free index first) and return its handle and object
    pub fn acquire(&mut self) -> (Handle, &mut T) {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    value: T::default(),
                    generation: self.generation_floor,
                    active: false,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        debug_assert!(!slot.active);
        slot.active = true;
        self.active += 1;
        (
            Handle {
                index,
                generation: slot.generation,
            },
            &mut slot.value,
        )
    }

    /// Claim a slot and initialize it in one call
    pub fn spawn(&mut self, value: T) -> Handle {
        let (handle, slot) = self.acquire();
        *slot = value;
        handle
    }

    /// Return a slot to the pool. Stale handles are ignored; returns whether anything was released.
    pub fn release(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if !slot.active || slot.generation != handle.generation {
            return false;
        }
        slot.value.reset();
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.active -= 1;
        self.insert_free(handle.index);
        true
    }

    fn insert_free(&mut self, index: u32) {
        // Descending order so the lowest index is reused first
        let pos = self.free.partition_point(|&i| i > index);
        self.free.insert(pos, index);
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &mut s.value)
    }

    /// Number of live objects
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Number of allocated slots (live + free)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn nominal_capacity(&self) -> usize {
        self.nominal
    }

    /// Iterate live objects in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                Handle {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.value,
            )
        })
    }

    /// Iterate live objects mutably in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| {
                (
                    Handle {
                        index: i as u32,
                        generation: s.generation,
                    },
                    &mut s.value,
                )
            })
    }

    /// Release every live object for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        let mut dead = Vec::new();
        for (handle, value) in self.iter_mut() {
            if !keep(value) {
                dead.push(handle);
            }
        }
        for handle in dead {
            self.release(handle);
        }
    }

    /// Release everything (slots stay allocated)
    pub fn clear(&mut self) {
        let handles: Vec<Handle> = self.iter().map(|(h, _)| h).collect();
        for handle in handles {
            self.release(handle);
        }
    }

    /// Trim trailing free slots beyond the nominal capacity. Live entries and
    /// their handles are untouched. Returns the number of slots removed.
    pub fn compact(&mut self) -> usize {
        let last_active = self.slots.iter().rposition(|s| s.active);
        let keep = match last_active {
            Some(i) => (i + 1).max(self.nominal),
            None => self.nominal,
        };
        if keep >= self.slots.len() {
            return 0;
        }
        let removed = self.slots.len() - keep;
        // Handles into truncated slots must stay stale once the index regrows
        if let Some(max) = self.slots[keep..].iter().map(|s| s.generation).max() {
            self.generation_floor = self.generation_floor.max(max);
        }
        self.slots.truncate(keep);
        self.free.retain(|&i| (i as usize) < keep);
        removed
    }

    /// Whether the pool has grown well past its nominal size
    pub fn is_oversized(&self) -> bool {
        self.slots.len() > self.nominal + self.nominal / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Dot {
        x: i32,
    }

    impl Poolable for Dot {}

    #[test]
    fn test_acquire_release_cycle() {
        let mut pool: Pool<Dot> = Pool::new(4);
        let (a, dot) = pool.acquire();
        dot.x = 7;
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.get(a).map(|d| d.x), Some(7));

        assert!(pool.release(a));
        assert_eq!(pool.active_count(), 0);
        assert!(pool.get(a).is_none(), "stale handle must not resolve");
        assert!(!pool.release(a), "double release is a no-op");
    }

    #[test]
    fn test_released_object_is_reset() {
        let mut pool: Pool<Dot> = Pool::new(1);
        let h = pool.spawn(Dot { x: 5 });
        pool.release(h);
        let (_, dot) = pool.acquire();
        assert_eq!(dot.x, 0);
    }

    #[test]
    fn test_soft_growth() {
        let mut pool: Pool<Dot> = Pool::new(2);
        let handles: Vec<Handle> = (0..5).map(|i| pool.spawn(Dot { x: i })).collect();
        assert_eq!(pool.capacity(), 5);
        assert_eq!(pool.active_count(), 5);
        for (i, h) in handles.iter().enumerate() {
            assert_eq!(pool.get(*h).unwrap().x, i as i32);
        }
    }

    #[test]
    fn test_lowest_free_slot_reused_first() {
        let mut pool: Pool<Dot> = Pool::new(4);
        let a = pool.spawn(Dot::default());
        let b = pool.spawn(Dot::default());
        pool.release(b);
        pool.release(a);
        let (c, _) = pool.acquire();
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_compact_preserves_live_entries() {
        let mut pool: Pool<Dot> = Pool::new(2);
        let handles: Vec<Handle> = (0..8).map(|i| pool.spawn(Dot { x: i })).collect();
        // Free everything except slot 3
        for (i, h) in handles.iter().enumerate() {
            if i != 3 {
                pool.release(*h);
            }
        }
        assert!(pool.is_oversized());
        let removed = pool.compact();
        assert_eq!(removed, 4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.get(handles[3]).unwrap().x, 3);

        // Free list stays consistent: next acquisitions use slots 0,1,2 then grow
        let idx: Vec<usize> = (0..4).map(|_| pool.acquire().0.index()).collect();
        assert_eq!(idx, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_handle_stays_stale_after_compact_and_regrow() {
        let mut pool: Pool<Dot> = Pool::new(1);
        let _a = pool.spawn(Dot { x: 1 });
        let b = pool.spawn(Dot { x: 2 });
        assert_eq!(b.index(), 1);
        pool.release(b);
        assert_eq!(pool.compact(), 1);

        let c = pool.spawn(Dot { x: 3 });
        assert_eq!(c.index(), 1);
        assert_ne!(b, c);
        assert!(pool.get(b).is_none());
        assert!(!pool.release(b));
        assert_eq!(pool.get(c).map(|d| d.x), Some(3));
    }

    #[test]
    fn test_retain_and_clear() {
        let mut pool: Pool<Dot> = Pool::new(8);
        for i in 0..6 {
            pool.spawn(Dot { x: i });
        }
        pool.retain(|d| d.x % 2 == 0);
        assert_eq!(pool.active_count(), 3);
        assert!(pool.iter().all(|(_, d)| d.x % 2 == 0));
        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), 8);
    }
}
