//! Recency Index
//!
//! Doubly linked list over a slab of nodes, ordered by last touch.
//! Head = least recently used (next eviction candidate), tail = most
//! recently touched. Handles returned by [`RecencyList::push_back`] are
//! slot indices and stay valid until the entry is removed.

// == Entry ==
/// One key/value record tracked by the engine.
///
/// `size_bytes` is the accounted size (key length plus value size),
/// recorded when the entry is inserted or updated. Removal credits back
/// exactly this amount.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    pub(crate) size_bytes: i64,
}

#[derive(Debug)]
struct Node<V> {
    entry: Entry<V>,
    prev: usize,
    next: usize,
}

/// Sentinel slot index marking the end of the list.
const NIL: usize = usize::MAX;

// == Recency List ==
/// Ordered sequence of entries with O(1) push, reposition, and removal.
///
/// Freed slots are recycled through a free list so long-lived caches do
/// not grow the slab beyond their peak entry count.
#[derive(Debug)]
pub(crate) struct RecencyList<V> {
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyList<V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the least recently used entry, if any.
    pub(crate) fn front(&self) -> Option<usize> {
        if self.head == NIL {
            None
        } else {
            Some(self.head)
        }
    }

    pub(crate) fn entry(&self, idx: usize) -> &Entry<V> {
        &self.node(idx).entry
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut Entry<V> {
        &mut self.node_mut(idx).entry
    }

    /// Appends an entry at the most-recently-used end and returns its handle.
    pub(crate) fn push_back(&mut self, entry: Entry<V>) -> usize {
        let node = Node {
            entry,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.attach_tail(idx);
        self.len += 1;
        idx
    }

    /// Repositions an entry at the most-recently-used end.
    pub(crate) fn move_to_back(&mut self, idx: usize) {
        if idx == self.tail {
            return;
        }
        self.detach(idx);
        self.attach_tail(idx);
    }

    /// Unlinks an entry and releases its slot.
    pub(crate) fn remove(&mut self, idx: usize) -> Entry<V> {
        self.detach(idx);
        let node = self.nodes[idx].take().expect("detached recency slot");
        self.free.push(idx);
        self.len -= 1;
        node.entry
    }

    /// Empties the list, yielding every live entry in slot order.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Entry<V>> + '_ {
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
        self.free.clear();
        self.nodes.drain(..).flatten().map(|node| node.entry)
    }

    fn node(&self, idx: usize) -> &Node<V> {
        self.nodes[idx].as_ref().expect("detached recency slot")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<V> {
        self.nodes[idx].as_mut().expect("detached recency slot")
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.node_mut(prev).next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.node_mut(next).prev = prev;
        }
    }

    fn attach_tail(&mut self, idx: usize) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(idx);
            node.prev = old_tail;
            node.next = NIL;
        }
        if old_tail == NIL {
            self.head = idx;
        } else {
            self.node_mut(old_tail).next = idx;
        }
        self.tail = idx;
    }
}
