//! Renamer geometry.
//!
//! A surrounding simulator usually embeds `RenamerConfig` in its own
//! configuration file, so it deserializes from any serde format. Missing
//! fields fall back to the defaults below.

use serde::Deserialize;
use thiserror::Error;

use crate::branch::BranchMask;

mod defaults {
    /// Logical registers (RV64 integer file).
    pub const N_LOG_REGS: usize = 32;

    pub const N_PHYS_REGS: usize = 128;

    /// Unresolved branches that can be in flight at once.
    pub const N_BRANCHES: usize = 16;

    /// Active list (reorder buffer) entries.
    pub const N_ACTIVE: usize = 64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenamerConfig {
    pub n_log_regs: usize,
    pub n_phys_regs: usize,
    pub n_branches: usize,
    pub n_active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no logical registers to rename")]
    NoLogicalRegs,

    #[error("{n_phys_regs} physical registers cannot back {n_log_regs} logical registers")]
    TooFewPhysRegs {
        n_log_regs: usize,
        n_phys_regs: usize,
    },

    #[error("branch checkpoint count {0} is outside 1..={max}", max = BranchMask::MAX_WIDTH)]
    BadBranchCount(usize),

    #[error("active list must have at least one entry")]
    EmptyActiveList,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            n_log_regs: defaults::N_LOG_REGS,
            n_phys_regs: defaults::N_PHYS_REGS,
            n_branches: defaults::N_BRANCHES,
            n_active: defaults::N_ACTIVE,
        }
    }
}

impl RenamerConfig {
    pub fn new(n_log_regs: usize, n_phys_regs: usize, n_branches: usize, n_active: usize) -> Self {
        Self {
            n_log_regs,
            n_phys_regs,
            n_branches,
            n_active,
        }
    }

    /// Checks the logical count, then physical, branch and active-list sizes,
    /// and reports the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_log_regs == 0 {
            return Err(ConfigError::NoLogicalRegs);
        }

        if self.n_phys_regs <= self.n_log_regs {
            return Err(ConfigError::TooFewPhysRegs {
                n_log_regs: self.n_log_regs,
                n_phys_regs: self.n_phys_regs,
            });
        }

        if self.n_branches == 0 || self.n_branches > BranchMask::MAX_WIDTH {
            return Err(ConfigError::BadBranchCount(self.n_branches));
        }

        if self.n_active == 0 {
            return Err(ConfigError::EmptyActiveList);
        }

        Ok(())
    }

    /// Capacity of the free list.
    pub fn n_free_regs(&self) -> usize {
        self.n_phys_regs - self.n_log_regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = RenamerConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.n_free_regs(), 96);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            RenamerConfig::new(0, 8, 2, 4).validate(),
            Err(ConfigError::NoLogicalRegs)
        );
        assert_eq!(
            RenamerConfig::new(4, 4, 2, 4).validate(),
            Err(ConfigError::TooFewPhysRegs {
                n_log_regs: 4,
                n_phys_regs: 4
            })
        );
        assert_eq!(
            RenamerConfig::new(4, 8, 0, 4).validate(),
            Err(ConfigError::BadBranchCount(0))
        );
        assert_eq!(
            RenamerConfig::new(4, 8, 65, 4).validate(),
            Err(ConfigError::BadBranchCount(65))
        );
        assert_eq!(
            RenamerConfig::new(4, 8, 64, 0).validate(),
            Err(ConfigError::EmptyActiveList)
        );
        assert_eq!(RenamerConfig::new(4, 5, 64, 1).validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_first_failure() {
        assert_eq!(
            RenamerConfig::new(0, 0, 0, 0).validate(),
            Err(ConfigError::NoLogicalRegs)
        );
        assert_eq!(
            RenamerConfig::new(4, 2, 0, 0).validate(),
            Err(ConfigError::TooFewPhysRegs {
                n_log_regs: 4,
                n_phys_regs: 2
            })
        );
        assert_eq!(
            RenamerConfig::new(4, 8, 0, 0).validate(),
            Err(ConfigError::BadBranchCount(0))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::BadBranchCount(70).to_string(),
            "branch checkpoint count 70 is outside 1..=64"
        );
        assert_eq!(
            ConfigError::TooFewPhysRegs {
                n_log_regs: 32,
                n_phys_regs: 16
            }
            .to_string(),
            "16 physical registers cannot back 32 logical registers"
        );
    }
}
