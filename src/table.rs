//! Fixed-capacity open-addressing slot array.
//!
//! Slots are deliberately small: a node pointer, the key's precomputed
//! hash, and the absolute expiration. Probing compares the stored hash
//! before touching the entry behind the pointer, so a lookup walks the
//! table without chasing pointers except on a hash match. The nodes a
//! slot points at are owned by the recency list; the table only copies
//! addresses around.
//!
//! Invariant maintained by the controller: for every occupied slot,
//! the walk from the key's ideal index to the slot crosses no vacant
//! slot. The repair pass in the controller restores it after removals.

use crate::entry::CacheEntry;
use crate::list::ListEntry;
use crate::Timestamp;
use alloc::boxed::Box;
use core::borrow::Borrow;
use core::ptr;

/// One table position: vacant, or a reference to a live entry.
///
/// When `node` is null the other fields are meaningless; vacating a
/// slot only nulls the pointer.
pub(crate) struct TableSlot<K, V> {
    node: *mut ListEntry<CacheEntry<K, V>>,
    hash: u64,
    expire_at: Timestamp,
}

impl<K, V> TableSlot<K, V> {
    fn vacant() -> Self {
        TableSlot {
            node: ptr::null_mut(),
            hash: 0,
            expire_at: 0,
        }
    }
}

/// The slot array with wrap-around index arithmetic.
pub(crate) struct Table<K, V> {
    slots: Box<[TableSlot<K, V>]>,
}

impl<K, V> Table<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| TableSlot::vacant()).collect();
        Table { slots }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn is_vacant(&self, index: usize) -> bool {
        self.slots[index].node.is_null()
    }

    #[inline]
    pub(crate) fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    #[inline]
    pub(crate) fn prev_index(&self, index: usize) -> usize {
        (index + self.capacity() - 1) % self.capacity()
    }

    /// First slot probed for a key with this hash.
    #[inline]
    pub(crate) fn ideal_index(&self, hash: u64) -> usize {
        (hash % self.capacity() as u64) as usize
    }

    #[inline]
    pub(crate) fn node_at(&self, index: usize) -> *mut ListEntry<CacheEntry<K, V>> {
        debug_assert!(!self.is_vacant(index));
        self.slots[index].node
    }

    #[inline]
    pub(crate) fn hash_at(&self, index: usize) -> u64 {
        debug_assert!(!self.is_vacant(index));
        self.slots[index].hash
    }

    #[inline]
    pub(crate) fn expire_at(&self, index: usize) -> Timestamp {
        debug_assert!(!self.is_vacant(index));
        self.slots[index].expire_at
    }

    /// Whether the occupied slot's expiration has elapsed at `now`.
    #[inline]
    pub(crate) fn is_expired(&self, index: usize, now: Timestamp) -> bool {
        debug_assert!(!self.is_vacant(index));
        self.slots[index].expire_at <= now
    }

    /// Overwrites the expiration of an occupied slot.
    #[inline]
    pub(crate) fn set_expiration(&mut self, index: usize, expire_at: Timestamp) {
        debug_assert!(!self.is_vacant(index));
        self.slots[index].expire_at = expire_at;
    }

    /// Fills a vacant slot.
    pub(crate) fn occupy(
        &mut self,
        index: usize,
        node: *mut ListEntry<CacheEntry<K, V>>,
        hash: u64,
        expire_at: Timestamp,
    ) {
        debug_assert!(self.is_vacant(index));
        debug_assert!(!node.is_null());
        let slot = &mut self.slots[index];
        slot.node = node;
        slot.hash = hash;
        slot.expire_at = expire_at;
    }

    /// Empties a slot and hands back its node pointer.
    pub(crate) fn vacate(&mut self, index: usize) -> *mut ListEntry<CacheEntry<K, V>> {
        debug_assert!(!self.is_vacant(index));
        let slot = &mut self.slots[index];
        let node = slot.node;
        slot.node = ptr::null_mut();
        node
    }

    /// Copies a slot's contents to a vacant slot earlier in its probe
    /// sequence and empties the source.
    pub(crate) fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(!self.is_vacant(from));
        debug_assert!(self.is_vacant(to));
        self.slots[to].node = self.slots[from].node;
        self.slots[to].hash = self.slots[from].hash;
        self.slots[to].expire_at = self.slots[from].expire_at;
        self.slots[from].node = ptr::null_mut();
    }

    /// First vacant slot at or after `index`.
    ///
    /// Guaranteed to terminate while the load bound holds: a table at
    /// or below half occupancy always has vacant slots.
    pub(crate) fn next_vacant(&self, index: usize) -> usize {
        let mut i = index;
        while !self.is_vacant(i) {
            i = self.next_index(i);
        }
        i
    }

    /// Start of the cluster containing the occupied slot `index`,
    /// walking backward to the slot after the nearest vacancy.
    pub(crate) fn cluster_start(&self, index: usize) -> usize {
        debug_assert!(!self.is_vacant(index));
        let mut i = index;
        while !self.is_vacant(self.prev_index(i)) {
            i = self.prev_index(i);
        }
        i
    }

    /// Drops every slot reference without touching the nodes.
    ///
    /// The caller is responsible for freeing the entries through the
    /// recency list afterwards.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.node = ptr::null_mut();
        }
    }

    /// Probes for a key from its ideal index.
    ///
    /// Compares the stored hash first and only dereferences the node
    /// for a full key comparison on a hash match. Returns the slot
    /// index, or `None` once a vacant slot ends the probe sequence.
    pub(crate) fn find<Q>(&self, key: &Q, hash: u64) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut i = self.ideal_index(hash);
        while !self.is_vacant(i) {
            if self.slots[i].hash == hash {
                // SAFETY: occupied slots always reference live list nodes
                let entry = unsafe { (*self.slots[i].node).value() };
                if entry.key.borrow() == key {
                    return Some(i);
                }
            }
            i = self.next_index(i);
        }
        None
    }
}
