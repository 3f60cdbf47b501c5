use crate::inst::PhysReg;

/// Physical register file: one value and one ready bit per physical register.
///
/// Value arrival and readiness are independent: `write` never touches the ready bit.
#[derive(Debug, Clone)]
pub struct PhysRegFile {
    values: Vec<u64>,
    ready: Vec<bool>,
}

impl PhysRegFile {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: vec![0; capacity],
            ready: vec![true; capacity],
        }
    }

    pub fn read(&self, reg: PhysReg) -> u64 {
        *self
            .values
            .get(usize::from(reg))
            .expect("phys reg out of bounds")
    }

    pub fn write(&mut self, reg: PhysReg, val: u64) {
        self.values[usize::from(reg)] = val;
    }

    pub fn is_ready(&self, reg: PhysReg) -> bool {
        *self
            .ready
            .get(usize::from(reg))
            .expect("phys reg out of bounds")
    }

    pub fn set_ready(&mut self, reg: PhysReg) {
        self.ready[usize::from(reg)] = true;
    }

    pub fn clear_ready(&mut self, reg: PhysReg) {
        self.ready[usize::from(reg)] = false;
    }
}
