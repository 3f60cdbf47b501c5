use crate::{
    inst::PhysReg,
    queue::{Cursor, Queue},
};

/// Physical registers not held by the committed map. Allocation pops the head,
/// release pushes the tail. Branch recovery rewinds the head, which hands every
/// register allocated since the checkpoint back to the pool at once.
#[derive(Debug, Clone)]
pub struct FreeList {
    regs: Queue<PhysReg>,
}

impl FreeList {
    /// Holds physical registers `n_log_regs..n_phys_regs`, all free.
    pub fn new(n_log_regs: usize, n_phys_regs: usize) -> Self {
        assert!(n_phys_regs > n_log_regs);

        Self {
            regs: Queue::new_full((n_log_regs..n_phys_regs).map(PhysReg).collect()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.regs.capacity()
    }

    pub fn num_free(&self) -> usize {
        self.regs.len()
    }

    /// Whether `n` more allocations would run the list dry.
    pub fn stall(&self, n: usize) -> bool {
        n > self.num_free()
    }

    pub fn allocate(&mut self) -> PhysReg {
        assert!(!self.stall(1), "allocated a physical register from an empty free list");
        self.regs.pop()
    }

    pub fn release(&mut self, reg: PhysReg) {
        assert!(!self.regs.is_full(), "released {reg} into a full free list");
        self.regs.push(reg);
    }

    pub fn head(&self) -> Cursor {
        self.regs.head()
    }

    pub fn restore_head(&mut self, head: Cursor) {
        self.regs.set_head(head);
    }

    /// Returns every register allocated since the last release to the pool.
    pub fn reclaim_all(&mut self) {
        self.regs.fill();
    }

    pub fn iter(&self) -> impl Iterator<Item = PhysReg> + '_ {
        self.regs.iter().copied()
    }
}
