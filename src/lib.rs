pub mod branch;
pub mod config;
pub mod free_list;
pub mod inst;
pub mod queue;
pub mod rat;
pub mod regs;
pub mod renamer;
pub mod rob;

pub use branch::BranchMask;
pub use config::{ConfigError, RenamerConfig};
pub use inst::{AlIndex, ArchReg, CheckpointId, Dest, InstKind, Outcome, OutcomeFlags, PhysReg};
pub use rat::MapTable;
pub use renamer::{AuditError, Renamer};
pub use rob::RetireInfo;
