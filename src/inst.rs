use std::fmt;

use strum::{Display, EnumIter};

/// Logical (architectural) register id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ArchReg(pub usize);

/// Physical register id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PhysReg(pub usize);

/// Slot index of an instruction in the active list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AlIndex(pub usize);

/// Slot index of a branch checkpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CheckpointId(pub usize);

macro_rules! index_conversions {
    ($($ty:ident),*) => {$(
        impl From<usize> for $ty {
            fn from(v: usize) -> Self {
                Self(v)
            }
        }

        impl From<$ty> for usize {
            fn from(v: $ty) -> Self {
                v.0
            }
        }
    )*};
}

index_conversions!(ArchReg, PhysReg, AlIndex, CheckpointId);

impl fmt::Display for ArchReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A renamed destination: the logical register and the physical register
/// that now holds its speculative value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Dest {
    pub arch: ArchReg,
    pub phys: PhysReg,
}

impl Dest {
    pub fn new(arch: ArchReg, phys: PhysReg) -> Self {
        Self { arch, phys }
    }
}

/// What kind of instruction occupies an active-list slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct InstKind {
    pub load: bool,
    pub store: bool,
    pub branch: bool,
    pub amo: bool,
    pub csr: bool,
}

impl InstKind {
    pub const ALU: InstKind = InstKind {
        load: false,
        store: false,
        branch: false,
        amo: false,
        csr: false,
    };

    pub fn load() -> Self {
        Self { load: true, ..Self::ALU }
    }

    pub fn store() -> Self {
        Self { store: true, ..Self::ALU }
    }

    pub fn branch() -> Self {
        Self { branch: true, ..Self::ALU }
    }

    pub fn amo() -> Self {
        Self { amo: true, ..Self::ALU }
    }

    pub fn csr() -> Self {
        Self { csr: true, ..Self::ALU }
    }
}

/// Events reported back against an in-flight instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Complete,
    Exception,
    LoadViolation,
    BranchMisprediction,
    ValueMisprediction,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OutcomeFlags {
    pub complete: bool,
    pub exception: bool,
    pub load_violation: bool,
    pub branch_misprediction: bool,
    pub value_misprediction: bool,
}

impl OutcomeFlags {
    pub fn get(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Complete => self.complete,
            Outcome::Exception => self.exception,
            Outcome::LoadViolation => self.load_violation,
            Outcome::BranchMisprediction => self.branch_misprediction,
            Outcome::ValueMisprediction => self.value_misprediction,
        }
    }

    pub fn set(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Complete => self.complete = true,
            Outcome::Exception => self.exception = true,
            Outcome::LoadViolation => self.load_violation = true,
            Outcome::BranchMisprediction => self.branch_misprediction = true,
            Outcome::ValueMisprediction => self.value_misprediction = true,
        }
    }

    /// Whether the instruction may leave the active list through a normal commit.
    pub fn can_commit(&self) -> bool {
        self.complete && !self.exception && !self.load_violation
    }
}
