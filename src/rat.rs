use crate::inst::{ArchReg, PhysReg};

/// Logical to physical register map. Used both for the committed map (AMT)
/// and the speculative rename map (RMT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTable {
    map: Vec<PhysReg>,
}

impl MapTable {
    /// Maps logical register `i` to physical register `i`.
    pub fn identity(n_log_regs: usize) -> Self {
        Self {
            map: (0..n_log_regs).map(PhysReg).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, reg: ArchReg) -> PhysReg {
        *self
            .map
            .get(usize::from(reg))
            .expect("arch reg out of bounds")
    }

    /// Points `reg` at `phys`, returning the previous mapping.
    pub fn set(&mut self, reg: ArchReg, phys: PhysReg) -> PhysReg {
        std::mem::replace(&mut self.map[usize::from(reg)], phys)
    }

    /// Overwrites every entry from `other` without reallocating.
    pub fn copy_from(&mut self, other: &MapTable) {
        self.map.copy_from_slice(&other.map);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArchReg, PhysReg)> + '_ {
        self.map.iter().enumerate().map(|(i, &p)| (ArchReg(i), p))
    }

    pub fn as_slice(&self) -> &[PhysReg] {
        &self.map
    }
}
