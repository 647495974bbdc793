// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A heterogeneous FIFO of type-erased entries.
//!
//! [`MailboxQueue`] is a doubly-linked chain whose nodes live in a slab
//! (`Vec` of slots plus a free list). Every entry carries metadata of the
//! queue's type `M` and a [`Payload`] of whatever type was pushed. Located
//! nodes unlink in O(1), and tearing the queue down never recurses.
//!
//! The queue is not synchronized; wrap it in a lock to share it.

mod entry;

pub use self::entry::{Entry, Payload};

use std::any::Any;

#[derive(Debug)]
struct Node<M> {
    entry: Entry<M>,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
enum Slot<M> {
    Occupied(Node<M>),
    Vacant { next_free: Option<usize> },
}

/// An owning, doubly-linked FIFO of heterogeneous entries.
#[derive(Debug)]
pub struct MailboxQueue<M = ()> {
    slots: Vec<Slot<M>>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Option<usize>,
    len: usize,
}

impl<M> MailboxQueue<M> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            tail: None,
            free: None,
            len: 0,
        }
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Appends `value` at the tail and returns a reference to the stored value.
    pub fn push<T: Any + Send>(&mut self, meta: M, value: T) -> &mut T {
        let index = self.link_back(Entry::new(meta, Payload::new(value)));
        match self.node_mut(index).entry.get_mut::<T>() {
            Some(value) => value,
            None => unreachable!("slot {index} was just filled with a different type"),
        }
    }

    /// Appends an entry whose payload is empty.
    pub fn push_empty(&mut self, meta: M) {
        self.link_back(Entry::new(meta, Payload::empty()));
    }

    /// Appends an already-built payload at the tail.
    pub fn push_payload(&mut self, meta: M, payload: Payload) {
        self.link_back(Entry::new(meta, payload));
    }

    /// Appends a detached entry at the tail.
    pub fn push_entry(&mut self, entry: Entry<M>) {
        self.link_back(entry);
    }

    /// Detaches and returns the oldest entry.
    pub fn pop_front(&mut self) -> Option<Entry<M>> {
        self.head.map(|index| self.unlink(index))
    }

    /// Detaches the first entry, from the head, for which `predicate` holds.
    ///
    /// The remaining entries keep their relative order.
    pub fn pop_first_matching<P>(&mut self, mut predicate: P) -> Option<Entry<M>>
    where
        P: FnMut(&Entry<M>) -> bool,
    {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.node(index);
            let next = node.next;
            if predicate(&node.entry) {
                return Some(self.unlink(index));
            }
            cursor = next;
        }
        None
    }

    /// Detaches every entry for which `predicate` holds, oldest first.
    pub fn drain_matching<P>(&mut self, mut predicate: P) -> Vec<Entry<M>>
    where
        P: FnMut(&Entry<M>) -> bool,
    {
        let mut taken = Vec::new();
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.node(index);
            cursor = node.next;
            if predicate(&node.entry) {
                taken.push(self.unlink(index));
            }
        }
        taken
    }

    /// Borrows the oldest entry without detaching it.
    pub fn peek_front(&self) -> Option<&Entry<M>> {
        self.head.map(|index| &self.node(index).entry)
    }

    /// Iterates from head to tail.
    pub fn iter(&self) -> Iter<'_, M> {
        Iter {
            queue: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Visits every entry mutably, from head to tail.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Entry<M>),
    {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.node_mut(index);
            f(&mut node.entry);
            cursor = node.next;
        }
    }

    /// Detaches entries from the head as the iterator is consumed.
    pub fn drain(&mut self) -> Drain<'_, M> {
        Drain { queue: self }
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue holds no entry.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Destroys every entry.
    pub fn clear(&mut self) {
        // Dropping the slab visits the slots one after another; no entry owns
        // its successor, so the depth stays constant however long the chain is.
        self.slots.clear();
        self.head = None;
        self.tail = None;
        self.free = None;
        self.len = 0;
    }

    fn link_back(&mut self, entry: Entry<M>) -> usize {
        let node = Node {
            entry,
            prev: self.tail,
            next: None,
        };

        let index = match self.free {
            Some(index) => {
                if let Slot::Vacant { next_free } = self.slots[index] {
                    self.free = next_free;
                }
                self.slots[index] = Slot::Occupied(node);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        index
    }

    fn unlink(&mut self, index: usize) -> Entry<M> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        let node = match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("unlinking vacant slot {index}"),
        };
        self.free = Some(index);

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.len -= 1;
        if self.len == 0 {
            self.slots.clear();
            self.free = None;
        }
        node.entry
    }

    fn node(&self, index: usize) -> &Node<M> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("linked index {index} is vacant"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<M> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("linked index {index} is vacant"),
        }
    }
}

impl<M> Default for MailboxQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Head-to-tail iterator over a [`MailboxQueue`].
pub struct Iter<'a, M> {
    queue: &'a MailboxQueue<M>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, M> Iterator for Iter<'a, M> {
    type Item = &'a Entry<M>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.node(self.cursor?);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, M> ExactSizeIterator for Iter<'a, M> {}

impl<'a, M> IntoIterator for &'a MailboxQueue<M> {
    type Item = &'a Entry<M>;
    type IntoIter = Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Draining iterator returned by [`MailboxQueue::drain`].
pub struct Drain<'a, M> {
    queue: &'a mut MailboxQueue<M>,
}

impl<M> Iterator for Drain<'_, M> {
    type Item = Entry<M>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_front()
    }
}
