use crate::{
    inst::{AlIndex, Dest, InstKind, Outcome, OutcomeFlags},
    queue::Queue,
};

#[derive(Debug, Copy, Clone, Default)]
pub struct ActiveEntry {
    pub dest: Option<Dest>,
    pub kind: InstKind,
    pub pc: u64,
    pub outcome: OutcomeFlags,
}

/// Snapshot of the active-list head handed to the commit logic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetireInfo {
    pub outcome: OutcomeFlags,
    pub kind: InstKind,
    pub pc: u64,
}

/// Program-order list of in-flight instructions (reorder buffer).
#[derive(Debug, Clone)]
pub struct ActiveList {
    entries: Queue<ActiveEntry>,
}

impl ActiveList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Queue::new(capacity, ActiveEntry::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `n` more dispatches would overflow the list.
    pub fn stall(&self, n: usize) -> bool {
        n > self.entries.free_slots()
    }

    pub fn dispatch(&mut self, dest: Option<Dest>, kind: InstKind, pc: u64) -> AlIndex {
        assert!(!self.stall(1), "dispatched into a full active list");

        // A fresh entry, so nothing from the slot's previous occupant survives.
        AlIndex(self.entries.push(ActiveEntry {
            dest,
            kind,
            pc,
            outcome: OutcomeFlags::default(),
        }))
    }

    pub fn mark(&mut self, idx: AlIndex, outcome: Outcome) {
        self.entries.slot_mut(usize::from(idx)).outcome.set(outcome);
    }

    pub fn get(&self, idx: AlIndex) -> &ActiveEntry {
        self.entries.slot(usize::from(idx))
    }

    pub fn peek_head(&self) -> Option<RetireInfo> {
        self.entries.front().map(|ent| RetireInfo {
            outcome: ent.outcome,
            kind: ent.kind,
            pc: ent.pc,
        })
    }

    /// Removes the head entry, which must be complete and free of exceptions
    /// and load violations.
    pub fn retire(&mut self) -> ActiveEntry {
        let head = self
            .entries
            .front_mut()
            .expect("committed from an empty active list");

        let outcome = head.outcome;
        if !outcome.can_commit() {
            assert!(outcome.complete, "committed an incomplete instruction");
            assert!(!outcome.exception, "committed an instruction with a pending exception");
            panic!("committed an instruction with a load violation");
        }

        let ent = *head;
        head.outcome.complete = false;
        self.entries.pop();
        ent
    }

    /// Discards every instruction younger than `idx`.
    pub fn kill_after(&mut self, idx: AlIndex) {
        self.entries.truncate_after(usize::from(idx));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEntry> + '_ {
        self.entries.iter()
    }
}
