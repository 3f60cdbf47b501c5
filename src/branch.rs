use std::fmt;

use crate::{inst::CheckpointId, queue::Cursor, rat::MapTable};

/// One bit per checkpoint slot. A set bit means the slot belongs to an unresolved branch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct BranchMask(pub u64);

impl BranchMask {
    pub const MAX_WIDTH: usize = u64::BITS as usize;

    fn bit(id: CheckpointId) -> u64 {
        1 << usize::from(id)
    }

    pub fn contains(&self, id: CheckpointId) -> bool {
        self.0 & Self::bit(id) != 0
    }

    pub fn insert(&mut self, id: CheckpointId) {
        self.0 |= Self::bit(id);
    }

    pub fn remove(&mut self, id: CheckpointId) {
        self.0 &= !Self::bit(id);
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Lowest clear bit below `width`.
    pub fn first_clear(&self, width: usize) -> Option<CheckpointId> {
        (0..width).map(CheckpointId).find(|&id| !self.contains(id))
    }

    pub fn count_clear(&self, width: usize) -> usize {
        (0..width)
            .filter(|&i| !self.contains(CheckpointId(i)))
            .count()
    }
}

impl fmt::Binary for BranchMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

/// State captured when a branch is checkpointed.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub rmt: MapTable,
    pub free_head: Cursor,
    /// The global mask right after this checkpoint's own bit was set.
    pub mask: BranchMask,
}

#[derive(Debug, Clone)]
pub struct CheckpointTable {
    slots: Vec<Option<Checkpoint>>,
    gbm: BranchMask,
}

impl CheckpointTable {
    pub fn new(n_branches: usize) -> Self {
        assert!(n_branches > 0 && n_branches <= BranchMask::MAX_WIDTH);

        Self {
            slots: vec![None; n_branches],
            gbm: BranchMask::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn mask(&self) -> BranchMask {
        self.gbm
    }

    pub fn num_free(&self) -> usize {
        self.gbm.count_clear(self.capacity())
    }

    /// Whether fewer than `n` slots are free.
    pub fn stall(&self, n: usize) -> bool {
        self.num_free() < n
    }

    /// Claims the lowest free slot and records the snapshot in it.
    pub fn take(&mut self, rmt: &MapTable, free_head: Cursor) -> CheckpointId {
        let id = self
            .gbm
            .first_clear(self.capacity())
            .expect("checkpointed with no free branch slot");

        self.gbm.insert(id);
        self.slots[usize::from(id)] = Some(Checkpoint {
            rmt: rmt.clone(),
            free_head,
            mask: self.gbm,
        });

        id
    }

    fn used(&self, id: CheckpointId) -> &Checkpoint {
        assert!(
            usize::from(id) < self.capacity(),
            "resolved checkpoint {} out of range",
            id.0
        );
        self.slots[usize::from(id)]
            .as_ref()
            .unwrap_or_else(|| panic!("resolved checkpoint {} that was never taken", id.0))
    }

    /// Releases `id` after its branch resolved correctly. The bit is cleared
    /// from the live mask and from every stored snapshot's mask.
    pub fn release(&mut self, id: CheckpointId) {
        let _ = self.used(id);

        self.gbm.remove(id);
        for cp in self.slots.iter_mut().flatten() {
            cp.mask.remove(id);
        }
    }

    /// Rolls the mask back to `id`'s snapshot with `id` itself freed, and
    /// returns the snapshot for the caller to restore the rest of the state from.
    pub fn restore(&mut self, id: CheckpointId) -> &Checkpoint {
        let mut mask = self.used(id).mask;
        mask.remove(id);
        self.gbm = mask;

        self.used(id)
    }

    /// Abandons every checkpoint.
    pub fn clear(&mut self) {
        self.gbm = BranchMask::default();
    }

    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.slots.get(usize::from(id)).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_bits() {
        let mut m = BranchMask::default();
        m.insert(CheckpointId(0));
        m.insert(CheckpointId(2));
        assert_eq!(m.first_clear(4), Some(CheckpointId(1)));
        assert_eq!(m.count_clear(4), 2);
        assert_eq!(format!("{m:b}"), "101");

        m.insert(CheckpointId(1));
        assert_eq!(m.first_clear(3), None);
        m.remove(CheckpointId(0));
        assert_eq!(m.first_clear(3), Some(CheckpointId(0)));

        let mut wide = BranchMask::default();
        wide.insert(CheckpointId(63));
        assert!(wide.contains(CheckpointId(63)));
        assert_eq!(wide.count_clear(64), 63);
    }

    #[test]
    fn test_lowest_first() {
        let rmt = MapTable::identity(2);
        let mut table = CheckpointTable::new(3);

        assert_eq!(table.take(&rmt, Cursor::default()), CheckpointId(0));
        assert_eq!(table.take(&rmt, Cursor::default()), CheckpointId(1));
        table.release(CheckpointId(0));
        assert_eq!(table.take(&rmt, Cursor::default()), CheckpointId(0));
        assert_eq!(table.take(&rmt, Cursor::default()), CheckpointId(2));
        assert!(table.stall(1));
        assert!(!table.stall(0));
    }

    #[test]
    fn test_release_clears_every_snapshot() {
        let rmt = MapTable::identity(2);
        let mut table = CheckpointTable::new(4);

        let a = table.take(&rmt, Cursor::default());
        let b = table.take(&rmt, Cursor::default());
        let c = table.take(&rmt, Cursor::default());
        assert_eq!(table.get(c).unwrap().mask, BranchMask(0b111));

        table.release(b);
        assert_eq!(table.mask(), BranchMask(0b101));
        assert_eq!(table.get(a).unwrap().mask, BranchMask(0b001));
        assert_eq!(table.get(b).unwrap().mask, BranchMask(0b001));
        assert_eq!(table.get(c).unwrap().mask, BranchMask(0b101));

        // c's snapshot no longer drags b's bit back in.
        table.restore(c);
        assert_eq!(table.mask(), BranchMask(0b001));
    }

    #[test]
    fn test_restore_frees_own_slot() {
        let mut rmt = MapTable::identity(2);
        let mut table = CheckpointTable::new(2);

        let a = table.take(&rmt, Cursor::new(1, false));
        rmt.set(crate::inst::ArchReg(0), crate::inst::PhysReg(5));
        table.take(&rmt, Cursor::new(2, false));

        let cp = table.restore(a);
        assert_eq!(cp.free_head, Cursor::new(1, false));
        assert_eq!(cp.rmt, MapTable::identity(2));
        assert!(table.mask().is_empty());
    }

    #[test]
    #[should_panic(expected = "never taken")]
    fn test_resolve_unused() {
        CheckpointTable::new(2).release(CheckpointId(1));
    }
}
