//! Recency List Module
//!
//! The LRU ordering structure: an arena-backed doubly-linked list of cache
//! entries fused with a key-to-slot lookup index.
//!
//! Entries are ordered by recency:
//! - Front = Most recently used
//! - Back = Least recently used
//!
//! Links are slot indices into a `Vec` arena rather than pointers, which
//! keeps promotion, insertion and back-eviction O(1) without unsafe code.
//! Removed slots are recycled through a free list.

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Sentinel value for null links in the doubly-linked list.
const SENTINEL: usize = usize::MAX;

// == List Node ==
/// A node in the arena-backed doubly-linked list.
///
/// `entry` is `None` only while the slot sits on the free list.
#[derive(Debug)]
struct Node {
    entry: Option<CacheEntry>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Ordered storage for cache entries with an O(1) lookup index.
///
/// Invariant: every resident entry has exactly one index record and every
/// index record points at a resident entry (a bijection between index keys
/// and list nodes).
#[derive(Debug)]
pub struct RecencyList {
    /// Arena of list nodes
    nodes: Vec<Node>,
    /// Lookup index: key -> arena slot of its node
    index: HashMap<String, usize>,
    /// Slot of the most recently used entry
    head: usize,
    /// Slot of the least recently used entry
    tail: usize,
    /// Head of the free list threaded through `next` links
    free_head: usize,
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyList {
    // == Constructor ==
    /// Creates a new empty recency list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty recency list with pre-allocated room for
    /// `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            head: SENTINEL,
            tail: SENTINEL,
            free_head: SENTINEL,
        }
    }

    // == Promote ==
    /// Moves a key's entry to the front (most recently used) in O(1).
    ///
    /// No-op if the key is absent. Changes only ordering, never index
    /// membership.
    pub fn promote(&mut self, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            if slot != self.head {
                self.detach(slot);
                self.attach_front(slot);
            }
        }
    }

    // == Peek Value ==
    /// Returns the value for a key without touching the recency order.
    ///
    /// Higher-level operations that want hit semantics promote separately.
    pub fn peek_value(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .and_then(|&slot| self.nodes[slot].entry.as_ref())
            .map(CacheEntry::value)
    }

    // == Insert Front ==
    /// Creates a new entry at the front and registers it in the index.
    ///
    /// The key must not already be present; callers check first. A duplicate
    /// insert is a programming error, not a recoverable condition.
    pub fn insert_front(&mut self, key: String, value: String) {
        debug_assert!(
            !self.index.contains_key(&key),
            "duplicate insert for key '{key}'"
        );

        let slot = self.allocate(CacheEntry::new(key.clone(), value));
        self.attach_front(slot);
        self.index.insert(key, slot);
    }

    // == Evict Back ==
    /// Removes the least recently used entry from both the list and the
    /// index, returning its key. Returns None if the list is empty.
    pub fn evict_back(&mut self) -> Option<String> {
        if self.tail == SENTINEL {
            return None;
        }

        let slot = self.tail;
        self.detach(slot);
        let entry = self.release(slot)?;
        self.index.remove(entry.key());
        Some(entry.into_key())
    }

    // == Length ==
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    /// Checks if a key is resident.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Front Key ==
    /// Returns the most recently used key without removing it.
    pub fn front_key(&self) -> Option<&str> {
        self.key_at(self.head)
    }

    // == Back Key ==
    /// Returns the least recently used key without removing it.
    pub fn back_key(&self) -> Option<&str> {
        self.key_at(self.tail)
    }

    fn key_at(&self, slot: usize) -> Option<&str> {
        if slot == SENTINEL {
            return None;
        }
        self.nodes[slot].entry.as_ref().map(CacheEntry::key)
    }

    // == Internal: Link Maintenance ==

    /// Unlinks a slot from the recency order, fixing up head/tail.
    fn detach(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);

        if prev == SENTINEL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }

        if next == SENTINEL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }

        self.nodes[slot].prev = SENTINEL;
        self.nodes[slot].next = SENTINEL;
    }

    /// Links a detached slot in at the front of the recency order.
    fn attach_front(&mut self, slot: usize) {
        self.nodes[slot].prev = SENTINEL;
        self.nodes[slot].next = self.head;

        if self.head != SENTINEL {
            self.nodes[self.head].prev = slot;
        }
        self.head = slot;

        if self.tail == SENTINEL {
            self.tail = slot;
        }
    }

    /// Takes a slot from the free list, or grows the arena, and parks the
    /// entry in it. The returned slot is detached.
    fn allocate(&mut self, entry: CacheEntry) -> usize {
        if self.free_head != SENTINEL {
            let slot = self.free_head;
            self.free_head = self.nodes[slot].next;
            self.nodes[slot].entry = Some(entry);
            self.nodes[slot].prev = SENTINEL;
            self.nodes[slot].next = SENTINEL;
            slot
        } else {
            self.nodes.push(Node {
                entry: Some(entry),
                prev: SENTINEL,
                next: SENTINEL,
            });
            self.nodes.len() - 1
        }
    }

    /// Returns a detached slot to the free list, yielding its entry.
    fn release(&mut self, slot: usize) -> Option<CacheEntry> {
        let entry = self.nodes[slot].entry.take();
        self.nodes[slot].prev = SENTINEL;
        self.nodes[slot].next = self.free_head;
        self.free_head = slot;
        entry
    }
}
