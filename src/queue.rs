/// Position in a ring buffer. The phase flips each time the index wraps back to 0,
/// which tells a full buffer (head == tail, phases differ) apart from an empty one
/// (head == tail, phases equal).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pub idx: usize,
    pub phase: bool,
}

impl Cursor {
    pub fn new(idx: usize, phase: bool) -> Self {
        Self { idx, phase }
    }

    fn advance(&mut self, capacity: usize) {
        self.idx = (self.idx + 1) % capacity;
        if self.idx == 0 {
            self.phase = !self.phase;
        }
    }
}

/// Fixed-capacity ring buffer. Slots keep their contents after a pop, so callers
/// that reuse a slot must overwrite it in full.
#[derive(Debug, Clone)]
pub struct Queue<T: Clone> {
    data: Vec<T>,
    head: Cursor,
    tail: Cursor,
}

impl<T: Clone> Queue<T> {
    /// An empty queue whose slots are filled with `fill`.
    pub fn new(capacity: usize, fill: T) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");

        Self {
            data: vec![fill; capacity],
            head: Cursor::default(),
            tail: Cursor::default(),
        }
    }

    /// A queue that starts out full with `items`, oldest first.
    pub fn new_full(items: Vec<T>) -> Self {
        assert!(!items.is_empty(), "queue capacity must be non-zero");

        Self {
            data: items,
            head: Cursor::new(0, false),
            tail: Cursor::new(0, true),
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        if self.head.phase == self.tail.phase {
            self.tail.idx - self.head.idx
        } else {
            self.capacity() - (self.head.idx - self.tail.idx)
        }
    }

    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.head.idx == self.tail.idx && self.head.phase != self.tail.phase
    }

    /// Appends at the tail and returns the slot index used.
    pub fn push(&mut self, item: T) -> usize {
        assert!(!self.is_full(), "pushed onto a full queue");

        let slot = self.tail.idx;
        self.data[slot] = item;
        self.tail.advance(self.capacity());
        slot
    }

    /// Removes the head item. The slot keeps a copy until it is pushed over.
    pub fn pop(&mut self) -> T {
        assert!(!self.is_empty(), "popped from an empty queue");

        let item = self.data[self.head.idx].clone();
        self.head.advance(self.capacity());
        item
    }

    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            Some(&self.data[self.head.idx])
        }
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            None
        } else {
            Some(&mut self.data[self.head.idx])
        }
    }

    /// Raw slot access, regardless of whether the slot is live.
    pub fn slot(&self, idx: usize) -> &T {
        &self.data[idx]
    }

    pub fn slot_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }

    pub fn head(&self) -> Cursor {
        self.head
    }

    pub fn tail(&self) -> Cursor {
        self.tail
    }

    pub fn set_head(&mut self, head: Cursor) {
        debug_assert!(head.idx < self.capacity());
        self.head = head;
    }

    /// Drops everything younger than the live slot `idx`, leaving it as the youngest entry.
    pub fn truncate_after(&mut self, idx: usize) {
        let tail = (idx + 1) % self.capacity();
        // The kept range is non-empty, so tail == head means the queue is full.
        let phase = if tail > self.head.idx {
            self.head.phase
        } else {
            !self.head.phase
        };

        self.tail = Cursor::new(tail, phase);
    }

    /// Marks every slot as occupied, keeping the tail where it is.
    pub fn fill(&mut self) {
        self.head = Cursor::new(self.tail.idx, !self.tail.phase);
    }

    pub fn clear(&mut self) {
        self.tail = self.head;
    }

    /// Live items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let cap = self.capacity();
        (0..self.len()).map(move |i| &self.data[(self.head.idx + i) % cap])
    }
}
