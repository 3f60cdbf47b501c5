//! The register renaming unit.
//!
//! `Renamer` owns the committed and speculative map tables, the physical
//! register file, the free list, the active list and the branch checkpoints.
//! The pipeline driver calls into it once per event, and is expected to query
//! `stall_reg`, `stall_branch` and `stall_dispatch` before each cycle's batch
//! of allocations. Allocating past a reported stall, or committing a head that
//! isn't ready to commit, panics.

use hashbrown::HashSet;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    branch::{BranchMask, CheckpointTable},
    config::{ConfigError, RenamerConfig},
    free_list::FreeList,
    inst::{AlIndex, ArchReg, CheckpointId, Dest, InstKind, Outcome, PhysReg},
    rat::MapTable,
    regs::PhysRegFile,
    rob::{ActiveList, RetireInfo},
};

/// A broken structural invariant found by [`Renamer::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("{phys} is mapped by both {first} and {second} in the committed map")]
    SharedMapping {
        phys: PhysReg,
        first: ArchReg,
        second: ArchReg,
    },

    #[error("{0} is both committed and on the free list")]
    MappedAndFree(PhysReg),

    #[error("{0} appears on the free list more than once")]
    DuplicateFree(PhysReg),

    #[error("{0} is not a valid physical register")]
    OutOfRange(PhysReg),

    #[error("free list holds {held} registers but only {capacity} fit")]
    FreeListOverflow { held: usize, capacity: usize },

    #[error("{0} belongs to an in-flight instruction but is also committed or free")]
    InFlightConflict(PhysReg),

    #[error("active list holds {held} entries but only {capacity} fit")]
    ActiveListOverflow { held: usize, capacity: usize },

    #[error("branch mask {mask:#b} has bits beyond {width} checkpoint slots")]
    StrayMaskBits { mask: u64, width: usize },
}

#[derive(Debug, Clone)]
pub struct Renamer {
    config: RenamerConfig,
    amt: MapTable,
    rmt: MapTable,
    prf: PhysRegFile,
    free_list: FreeList,
    active_list: ActiveList,
    checkpoints: CheckpointTable,
}

impl Renamer {
    pub fn new(config: RenamerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(
            n_log_regs = config.n_log_regs,
            n_phys_regs = config.n_phys_regs,
            n_branches = config.n_branches,
            n_active = config.n_active,
            "building renamer"
        );

        let amt = MapTable::identity(config.n_log_regs);
        Ok(Self {
            rmt: amt.clone(),
            amt,
            prf: PhysRegFile::new(config.n_phys_regs),
            free_list: FreeList::new(config.n_log_regs, config.n_phys_regs),
            active_list: ActiveList::new(config.n_active),
            checkpoints: CheckpointTable::new(config.n_branches),
            config,
        })
    }

    pub fn config(&self) -> &RenamerConfig {
        &self.config
    }

    // Stall queries. Each answers whether `n` more allocations this cycle
    // would overrun the structure, against the state before the cycle's updates.

    pub fn stall_reg(&self, n: usize) -> bool {
        self.free_list.stall(n)
    }

    pub fn stall_branch(&self, n: usize) -> bool {
        self.checkpoints.stall(n)
    }

    pub fn stall_dispatch(&self, n: usize) -> bool {
        self.active_list.stall(n)
    }

    pub fn get_branch_mask(&self) -> BranchMask {
        self.checkpoints.mask()
    }

    pub fn rename_rsrc(&self, reg: ArchReg) -> PhysReg {
        self.rmt.get(reg)
    }

    /// Allocates a fresh physical register for `reg` and maps it in the RMT.
    pub fn rename_rdst(&mut self, reg: ArchReg) -> PhysReg {
        let phys = self.free_list.allocate();
        self.prf.clear_ready(phys);
        self.rmt.set(reg, phys);

        trace!(arch = %reg, phys = %phys, "renamed destination");
        phys
    }

    /// Snapshots the RMT, free-list head and branch mask into the lowest free
    /// checkpoint slot.
    pub fn checkpoint(&mut self) -> CheckpointId {
        assert!(!self.stall_branch(1), "checkpointed with no free branch slot");

        let id = self.checkpoints.take(&self.rmt, self.free_list.head());
        trace!(id = id.0, mask = self.checkpoints.mask().0, "checkpoint");
        id
    }

    pub fn dispatch_inst(&mut self, dest: Option<Dest>, kind: InstKind, pc: u64) -> AlIndex {
        let idx = self.active_list.dispatch(dest, kind, pc);
        trace!(idx = idx.0, pc, "dispatched");
        idx
    }

    pub fn is_ready(&self, reg: PhysReg) -> bool {
        self.prf.is_ready(reg)
    }

    pub fn clear_ready(&mut self, reg: PhysReg) {
        self.prf.clear_ready(reg);
    }

    pub fn set_ready(&mut self, reg: PhysReg) {
        self.prf.set_ready(reg);
    }

    pub fn read(&self, reg: PhysReg) -> u64 {
        self.prf.read(reg)
    }

    /// Stores a value without touching readiness; pair with `set_ready`.
    pub fn write(&mut self, reg: PhysReg, val: u64) {
        self.prf.write(reg, val);
    }

    pub fn set_outcome(&mut self, idx: AlIndex, outcome: Outcome) {
        self.active_list.mark(idx, outcome);
    }

    pub fn set_complete(&mut self, idx: AlIndex) {
        self.set_outcome(idx, Outcome::Complete);
    }

    pub fn set_exception(&mut self, idx: AlIndex) {
        self.set_outcome(idx, Outcome::Exception);
    }

    pub fn set_load_violation(&mut self, idx: AlIndex) {
        self.set_outcome(idx, Outcome::LoadViolation);
    }

    pub fn set_branch_misprediction(&mut self, idx: AlIndex) {
        self.set_outcome(idx, Outcome::BranchMisprediction);
    }

    pub fn set_value_misprediction(&mut self, idx: AlIndex) {
        self.set_outcome(idx, Outcome::ValueMisprediction);
    }

    pub fn get_exception(&self, idx: AlIndex) -> bool {
        self.active_list.get(idx).outcome.exception
    }

    /// Resolves the branch at `idx` that owns checkpoint `id`.
    ///
    /// A correct prediction only frees the checkpoint. A misprediction restores
    /// the RMT, free-list head and branch mask from the checkpoint, and drops
    /// every instruction dispatched after the branch.
    pub fn resolve(&mut self, idx: AlIndex, id: CheckpointId, correct: bool) {
        if correct {
            self.checkpoints.release(id);
            trace!(id = id.0, "branch resolved correct");
            return;
        }

        let cp = self.checkpoints.restore(id);
        self.rmt.copy_from(&cp.rmt);
        self.free_list.restore_head(cp.free_head);
        self.active_list.kill_after(idx);

        debug!(
            id = id.0,
            idx = idx.0,
            mask = self.checkpoints.mask().0,
            in_flight = self.active_list.len(),
            "branch mispredicted, rolled back"
        );
    }

    /// The head of the active list, or `None` if nothing is in flight.
    pub fn precommit(&self) -> Option<RetireInfo> {
        self.active_list.peek_head()
    }

    /// Retires the head instruction, advancing the committed map and freeing
    /// the physical register it overwrote.
    pub fn commit(&mut self) {
        let ent = self.active_list.retire();

        if let Some(Dest { arch, phys }) = ent.dest {
            let old = self.amt.set(arch, phys);
            self.free_list.release(old);
            self.prf.set_ready(old);

            trace!(arch = %arch, phys = %phys, freed = %old, "committed");
        } else {
            trace!(pc = ent.pc, "committed");
        }
    }

    /// Discards all speculative state, returning to the last committed state.
    pub fn squash(&mut self) {
        debug!(in_flight = self.active_list.len(), "squash");

        self.checkpoints.clear();
        self.free_list.reclaim_all();
        self.active_list.clear();
        self.rmt.copy_from(&self.amt);
    }

    pub fn amt(&self) -> &MapTable {
        &self.amt
    }

    pub fn rmt(&self) -> &MapTable {
        &self.rmt
    }

    pub fn num_free_regs(&self) -> usize {
        self.free_list.num_free()
    }

    pub fn active_len(&self) -> usize {
        self.active_list.len()
    }

    pub fn num_free_checkpoints(&self) -> usize {
        self.checkpoints.num_free()
    }

    /// Checks that every physical register has at most one owner (the committed
    /// map, the free list, or an in-flight instruction) and that no structure
    /// is over capacity.
    pub fn audit(&self) -> Result<(), AuditError> {
        let n_phys = self.config.n_phys_regs;

        let mut committed: HashSet<PhysReg> = HashSet::with_capacity(self.amt.len());
        for (arch, phys) in self.amt.iter() {
            if usize::from(phys) >= n_phys {
                return Err(AuditError::OutOfRange(phys));
            }
            if !committed.insert(phys) {
                let (first, _) = self
                    .amt
                    .iter()
                    .find(|&(_, p)| p == phys)
                    .expect("duplicate has a first occurrence");
                return Err(AuditError::SharedMapping {
                    phys,
                    first,
                    second: arch,
                });
            }
        }

        let held = self.free_list.num_free();
        if held > self.free_list.capacity() {
            return Err(AuditError::FreeListOverflow {
                held,
                capacity: self.free_list.capacity(),
            });
        }

        let mut free: HashSet<PhysReg> = HashSet::with_capacity(held);
        for phys in self.free_list.iter() {
            if usize::from(phys) >= n_phys {
                return Err(AuditError::OutOfRange(phys));
            }
            if committed.contains(&phys) {
                return Err(AuditError::MappedAndFree(phys));
            }
            if !free.insert(phys) {
                return Err(AuditError::DuplicateFree(phys));
            }
        }

        // Destinations still in flight were taken off the free list at rename
        // and only reach the committed map when they retire.
        let mut in_flight: HashSet<PhysReg> = HashSet::new();
        for phys in self.active_list.iter().filter_map(|ent| ent.dest).map(|d| d.phys) {
            if committed.contains(&phys) || free.contains(&phys) || !in_flight.insert(phys) {
                return Err(AuditError::InFlightConflict(phys));
            }
        }

        if self.active_list.len() > self.active_list.capacity() {
            return Err(AuditError::ActiveListOverflow {
                held: self.active_list.len(),
                capacity: self.active_list.capacity(),
            });
        }

        let mask = self.checkpoints.mask().0;
        let width = self.checkpoints.capacity();
        if width < BranchMask::MAX_WIDTH && mask >> width != 0 {
            return Err(AuditError::StrayMaskBits { mask, width });
        }

        Ok(())
    }
}
